#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = notepin::cli::run_from_env() {
        eprintln!("notepin: {error}");
        std::process::exit(error.exit_code());
    }
}
