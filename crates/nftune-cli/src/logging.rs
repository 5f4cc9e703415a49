//! Diagnostic logging setup.
//!
//! Service events go to stderr through `tracing-subscriber`. The filter comes
//! from `NFTUNE_LOG` (same syntax as `RUST_LOG`) and defaults to warnings only,
//! or to `info` with `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "NFTUNE_LOG";

/// Builds the filter used when `NFTUNE_LOG` is unset or invalid.
pub fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "info" } else { "warn" })
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(false).to_string(), "warn");
        assert_eq!(default_filter(true).to_string(), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
