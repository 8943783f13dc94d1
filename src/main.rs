fn main() {
    if let Err(err) = planr::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
