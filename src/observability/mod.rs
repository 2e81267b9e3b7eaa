//! Structured logging setup.
//!
//! The report goes to stdout, so log lines are sent to stderr.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "cte_breakdown=warn",
        1 => "cte_breakdown=info",
        2 => "cte_breakdown=debug",
        _ => "cte_breakdown=trace",
    }
}

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// `RUST_LOG` wins when set; otherwise the level follows `verbosity`. Call
/// once at program startup. Subsequent calls are silently ignored by
/// `tracing_subscriber`.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "cte_breakdown=warn");
        assert_eq!(default_directive(2), "cte_breakdown=debug");
        assert_eq!(default_directive(9), "cte_breakdown=trace");
    }

    #[test]
    fn init_logging_twice_does_not_panic() {
        init_logging(0);
        init_logging(3);
    }
}
