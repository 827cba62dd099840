//! Logging utilities and structured logging support

use log::LevelFilter;

/// Initialize the logging system; `RUST_LOG` directives refine `level`
pub fn init(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Initialize logging for tests; safe to call repeatedly
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
