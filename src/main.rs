fn main() {
    if let Err(err) = attr_discovery::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
