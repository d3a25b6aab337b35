fn main() {
    if let Err(err) = sankey_rs::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
