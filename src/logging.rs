// Logging setup - one tracing subscriber per process

use std::sync::Once;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output
    Development,
    /// JSON lines
    Production,
}

static INIT_ONCE: Once = Once::new();

const DEFAULT_FILTER: &str = "category_seed=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// Later calls are ignored.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let result = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };

        if let Err(e) = result {
            eprintln!("⚠️  Logging already initialized: {}", e);
        }
    });
}
