//! PHANTOM Mining CLI
//!
//! Mines the top-K expected-utility itemsets from an uncertain
//! transactional database with mixed (positive and negative) item
//! utilities.

fn main() {
    if let Err(err) = phantom_mine::cli::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
