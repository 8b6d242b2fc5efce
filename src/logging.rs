//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies. Browser
//! console output captured over CDP logs under the `browser` target.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// Returns `false` when a subscriber was already installed, which is normal
/// when several tests share one process.
pub fn init(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(level).to_string().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Parse a level name, falling back to `INFO`
pub fn parse_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("debug");
        assert!(!init("debug"));
    }
}
