//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = tastepin_cli::run() {
        eprintln!("tastepin: {err}");
        std::process::exit(1);
    }
}
