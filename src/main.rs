fn main() {
    if let Err(err) = cardscan_lib::run() {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}
