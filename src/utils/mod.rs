pub mod logging;

/// Initializes `env_logger` for binaries and integration tests. Safe to call
/// more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .is_test(cfg!(test))
        .try_init();
}
