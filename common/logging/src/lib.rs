use slog::Logger;
use sloggers::Build;

/// Return a logger suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via
/// the `test_logger` feature. This feature can be enabled for any
/// dependent crate by passing `--features logging/test_logger`, e.g.
/// ```bash
/// cargo test -p blob_resolver --features logging/test_logger
/// ```
pub fn test_logger() -> Logger {
    if cfg!(feature = "test_logger") {
        sloggers::terminal::TerminalLoggerBuilder::new()
            .level(sloggers::types::Severity::Debug)
            .build()
            .expect("Should build test_logger")
    } else {
        sloggers::null::NullLoggerBuilder
            .build()
            .expect("Should build null_logger")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_accepts_records() {
        let log = test_logger();
        slog::debug!(log, "hello"; "key" => 1);
    }
}
