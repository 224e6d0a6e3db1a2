fn main() {
    if let Err(e) = labwise_lib::run() {
        eprintln!("labwise: {e}");
        std::process::exit(1);
    }
}
