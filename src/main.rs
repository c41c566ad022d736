fn main() {
    if let Err(e) = duel_bracket::run() {
        eprintln!("duel-bracket: {e}");
        std::process::exit(1);
    }
}
