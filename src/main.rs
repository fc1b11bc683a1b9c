fn main() {
    if let Err(err) = depict::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
