fn main() {
    if let Err(err) = framenode::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
