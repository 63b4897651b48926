//! Logging initialization, mirroring the term+file `simplelog` setup this
//! crate's CLI binaries use, plus a once-only `env_logger` path for tests
//! and benchmarks where a full file logger would just litter the tree.

use std::sync::Once;

static TEST_LOGGER: Once = Once::new();

/// Initialize logging for the `phantom-mine` CLI: `Info` and up to the
/// terminal, `Debug` and up to a timestamped file under `logs/`.
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Lightweight logger for `#[test]`/`criterion` contexts: safe to call from
/// many test functions, only the first call takes effect.
pub fn init_test() {
    TEST_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
