//! Page-side helpers that do not need a browser.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test them
//! on the host.

use rplot::error::ConfigError;
use rplot::PlotConfig;
use tracing::Level;

/// Id of the optional `<script type="application/json">` block holding a [`PlotConfig`].
pub const CONFIG_ELEMENT_ID: &str = "rplot-config";

pub const ERROR_CLASS: &str = "error";

/// Resolves the page's config block. Missing or blank blocks give the
/// defaults; an invalid block gives the defaults plus the reason it was ignored.
pub fn config_from_block(text: Option<&str>) -> (PlotConfig, Option<ConfigError>) {
    match text.map(str::trim) {
        None | Some("") => (PlotConfig::default(), None),
        Some(text) => match PlotConfig::from_json(text) {
            Ok(cfg) => (cfg, None),
            Err(e) => (PlotConfig::default(), Some(e)),
        },
    }
}

pub fn parse_log_level(s: &str) -> Level {
    s.trim().parse::<Level>().unwrap_or(Level::INFO)
}

/// Text for the progress label, also used as the bar's CSS width.
pub fn percent_text(percent: u8) -> String {
    format!("{}%", percent.min(100))
}

/// Which `console` method a log line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Warn,
    Error,
}

impl ConsoleLevel {
    pub fn for_level(level: Level) -> Self {
        if level == Level::ERROR {
            ConsoleLevel::Error
        } else if level == Level::WARN {
            ConsoleLevel::Warn
        } else if level == Level::INFO {
            ConsoleLevel::Log
        } else {
            ConsoleLevel::Debug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_or_blank_block_uses_defaults() {
        for text in [None, Some(""), Some("  \n ")] {
            let (cfg, err) = config_from_block(text);
            assert_eq!(cfg, PlotConfig::default());
            assert!(err.is_none());
        }
    }

    #[test]
    fn valid_block_overrides_packages() {
        let (cfg, err) = config_from_block(Some(r#"{ "packages": ["lattice"], "log_level": "debug" }"#));
        assert!(err.is_none());
        assert_eq!(cfg.packages, vec!["lattice"]);
        assert_eq!(parse_log_level(&cfg.log_level), Level::DEBUG);
    }

    #[test]
    fn invalid_block_falls_back_with_reason() {
        let (cfg, err) = config_from_block(Some(r#"{ "packages": [] }"#));
        assert_eq!(cfg, PlotConfig::default());
        assert!(matches!(err, Some(ConfigError::NoPackages)));
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("warn"), Level::WARN);
        assert_eq!(parse_log_level(" TRACE "), Level::TRACE);
        assert_eq!(parse_log_level("loud"), Level::INFO);
        assert_eq!(ConsoleLevel::for_level(Level::ERROR), ConsoleLevel::Error);
        assert_eq!(ConsoleLevel::for_level(Level::INFO), ConsoleLevel::Log);
        assert_eq!(ConsoleLevel::for_level(Level::TRACE), ConsoleLevel::Debug);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent_text(33), "33%");
        assert_eq!(percent_text(250), "100%");
    }
}
