//! Missing-value placeholder selection for dense numeric buffers.
//!
//! Given a buffer and a parallel mask of conceptually-missing positions,
//! these routines pick a sentinel value absent from the observed (unmasked)
//! entries and overwrite every masked position with it. This is the single
//! place where missingness becomes an in-band sentinel instead of an
//! explicit mask, for output formats that cannot carry a side-channel mask.
//!
//! The search order is deterministic and prefers boundary values:
//!
//! - integers: type minimum, type maximum, zero, then an ascending scan for
//!   the first gap in the observed set;
//! - floats: NaN, positive infinity, negative infinity, `f64::MIN`,
//!   `f64::MAX`, zero, then midpoints of adjacent distinct observed finite
//!   values.
//!
//! Every function is pure over (buffer, mask) plus config and holds no
//! shared state; concurrent calls on disjoint buffers are safe. A `None`
//! return means no masked positions existed, the buffer is untouched, and no
//! placeholder is needed. [`FrameError::PlaceholderExhausted`] is reported
//! only when every representable value already appears among the observed
//! entries.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{FrameError, Result};

/// Bit pattern of the R runtime's `NA_real_`: a quiet NaN with payload 1954.
/// Reused only when [`FloatPlaceholderOptions::allow_legacy_nan`] is set.
const LEGACY_NA_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// Options for float placeholder selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatPlaceholderOptions {
    /// When the buffer already contains NaNs, permit the legacy NaN payload
    /// convention as the placeholder bit pattern, provided that exact
    /// pattern is not itself observed. Off by default: any observed NaN
    /// disqualifies all NaN candidates, since payloads cannot be told apart
    /// downstream.
    pub allow_legacy_nan: bool,
}

trait SentinelInt: Copy + Ord {
    const MIN: Self;
    const MAX: Self;
    const ZERO: Self;
    const DOMAIN: &'static str;

    /// Successor value; never called on `MAX`.
    fn succ(self) -> Self;
}

impl SentinelInt for i32 {
    const MIN: Self = i32::MIN;
    const MAX: Self = i32::MAX;
    const ZERO: Self = 0;
    const DOMAIN: &'static str = "32-bit integer";

    fn succ(self) -> Self {
        self + 1
    }
}

impl SentinelInt for i8 {
    const MIN: Self = i8::MIN;
    const MAX: Self = i8::MAX;
    const ZERO: Self = 0;
    const DOMAIN: &'static str = "8-bit integer";

    fn succ(self) -> Self {
        self + 1
    }
}

fn choose_int_placeholder<T: SentinelInt>(values: &mut [T], mask: &[bool]) -> Result<Option<T>> {
    assert_eq!(values.len(), mask.len(), "mask must parallel the buffer");

    let mut observed = BTreeSet::new();
    let mut any_missing = false;
    for (value, masked) in values.iter().zip(mask) {
        if *masked {
            any_missing = true;
        } else {
            observed.insert(*value);
        }
    }
    if !any_missing {
        return Ok(None);
    }

    let placeholder = select_int_sentinel(&observed)?;
    for (value, masked) in values.iter_mut().zip(mask) {
        if *masked {
            *value = placeholder;
        }
    }
    Ok(Some(placeholder))
}

fn select_int_sentinel<T: SentinelInt>(observed: &BTreeSet<T>) -> Result<T> {
    for candidate in [T::MIN, T::MAX, T::ZERO] {
        if !observed.contains(&candidate) {
            return Ok(candidate);
        }
    }

    // Boundary values are all taken; scan upward for the first gap.
    let mut candidate = T::MIN;
    for &value in observed {
        match value.cmp(&candidate) {
            Ordering::Greater => return Ok(candidate),
            Ordering::Equal => {
                if value == T::MAX {
                    return Err(FrameError::PlaceholderExhausted { domain: T::DOMAIN });
                }
                candidate = value.succ();
            }
            Ordering::Less => unreachable!("observed set iterates in ascending order"),
        }
    }
    Ok(candidate)
}

/// Chooses a sentinel for a 32-bit integer buffer and overwrites every
/// masked position with it.
pub fn choose_integer_placeholder(values: &mut [i32], mask: &[bool]) -> Result<Option<i32>> {
    choose_int_placeholder(values, mask)
}

/// Byte variant of [`choose_integer_placeholder`], for boolean-as-byte and
/// other 8-bit buffers.
pub fn choose_byte_placeholder(values: &mut [i8], mask: &[bool]) -> Result<Option<i8>> {
    choose_int_placeholder(values, mask)
}

/// Chooses a sentinel for a 64-bit float buffer and writes its bit pattern
/// exactly into every masked position.
pub fn choose_number_placeholder(
    values: &mut [f64],
    mask: &[bool],
    options: FloatPlaceholderOptions,
) -> Result<Option<f64>> {
    assert_eq!(values.len(), mask.len(), "mask must parallel the buffer");

    let mut observed = Vec::new();
    let mut any_missing = false;
    for (value, masked) in values.iter().zip(mask) {
        if *masked {
            any_missing = true;
        } else {
            observed.push(*value);
        }
    }
    if !any_missing {
        return Ok(None);
    }

    let placeholder = select_float_sentinel(&observed, options)?;
    let bits = placeholder.to_bits();
    for (value, masked) in values.iter_mut().zip(mask) {
        if *masked {
            *value = f64::from_bits(bits);
        }
    }
    Ok(Some(placeholder))
}

fn select_float_sentinel(observed: &[f64], options: FloatPlaceholderOptions) -> Result<f64> {
    let has_nan = observed.iter().any(|v| v.is_nan());
    if !has_nan {
        return Ok(f64::NAN);
    }
    if options.allow_legacy_nan && !observed.iter().any(|v| v.to_bits() == LEGACY_NA_BITS) {
        return Ok(f64::from_bits(LEGACY_NA_BITS));
    }

    for candidate in [f64::INFINITY, f64::NEG_INFINITY, f64::MIN, f64::MAX, 0.0] {
        if !observed.contains(&candidate) {
            return Ok(candidate);
        }
    }

    // All boundary candidates are taken; try midpoints of adjacent distinct
    // finite observed values. Halving both sides avoids overflow.
    let mut finite: Vec<f64> = observed.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(|a, b| a.total_cmp(b));
    finite.dedup();
    for pair in finite.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let mid = a / 2.0 + b / 2.0;
        if mid != a && mid != b {
            return Ok(mid);
        }
    }

    Err(FrameError::PlaceholderExhausted { domain: "double" })
}

/// Chooses a sentinel string absent from the observed values and fills every
/// missing slot with it: `"NA"`, with underscores appended until the token is
/// unobserved. Returns `None` when no slot was missing.
pub fn choose_string_placeholder(values: &mut [Option<String>]) -> Option<String> {
    if values.iter().all(|v| v.is_some()) {
        return None;
    }

    let observed: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
    let mut placeholder = String::from("NA");
    while observed.contains(placeholder.as_str()) {
        placeholder.push('_');
    }

    for value in values.iter_mut() {
        if value.is_none() {
            *value = Some(placeholder.clone());
        }
    }
    Some(placeholder)
}
