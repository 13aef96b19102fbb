fn main() {
    if let Err(err) = seocheck::cli::run() {
        seocheck::ui::eprintln_error(&err);
        std::process::exit(seocheck::exit::exit_code(&err));
    }
}
