use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::runtime::CaptureOptions;

pub const DEFAULT_SNIPPET: &str = r#"# Average fuel economy by cylinder count
mtcars %>%
  group_by(cyl) %>%
  summarise(mpg = mean(mpg)) %>%
  ggplot(aes(x = factor(cyl), y = mpg)) +
  geom_col(fill = "steelblue") +
  labs(x = "Cylinders", y = "Mean MPG")
"#;

const USER_CODE_MARKER: &str = "# Run the user's code";

/// Ids of the page regions the app reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub loading: String,
    pub content: String,
    pub progress: String,
    pub progress_bar: String,
    pub run_button: String,
    pub plot_output: String,
    pub code_display: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            loading: "loading".to_string(),
            content: "content".to_string(),
            progress: "progress".to_string(),
            progress_bar: "progress-bar".to_string(),
            run_button: "run-button".to_string(),
            plot_output: "plot-output".to_string(),
            code_display: "code-display".to_string(),
        }
    }
}

impl ElementIds {
    fn named(&self) -> [(&'static str, &str); 7] {
        [
            ("loading", &self.loading),
            ("content", &self.content),
            ("progress", &self.progress),
            ("progress_bar", &self.progress_bar),
            ("run_button", &self.run_button),
            ("plot_output", &self.plot_output),
            ("code_display", &self.code_display),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Installed in this order at boot, and loaded in this order before every run.
    pub packages: Vec<String>,
    pub default_snippet: String,
    pub capture: CaptureOptions,
    pub elements: ElementIds,
    /// Max level for the console logger (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            packages: vec!["dplyr".to_string(), "ggplot2".to_string()],
            default_snippet: DEFAULT_SNIPPET.to_string(),
            capture: CaptureOptions::default(),
            elements: ElementIds::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PlotConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: PlotConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::NoPackages);
        }
        for (i, name) in self.packages.iter().enumerate() {
            if !is_valid_package_name(name) {
                return Err(ConfigError::InvalidPackage(name.clone()));
            }
            if self.packages[..i].contains(name) {
                return Err(ConfigError::DuplicatePackage(name.clone()));
            }
        }
        for (field, id) in self.elements.named() {
            if id.trim().is_empty() {
                return Err(ConfigError::EmptyElementId(field));
            }
        }
        Ok(())
    }

    /// `library()` calls for every installed package, in install order.
    pub fn preamble(&self) -> String {
        let mut out = String::new();
        for pkg in &self.packages {
            out.push_str("library(");
            out.push_str(pkg);
            out.push_str(")\n");
        }
        out
    }

    /// The full source submitted for one run: preamble, then the user's code verbatim.
    pub fn submission(&self, code: &str) -> String {
        format!("{}\n{}\n{}", self.preamble(), USER_CODE_MARKER, code)
    }
}

/// CRAN's rule: letters, digits and dots, starting with a letter, not ending
/// with a dot, at least two characters.
pub fn is_valid_package_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() || bytes[bytes.len() - 1] == b'.' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let cfg = PlotConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.packages, vec!["dplyr", "ggplot2"]);
        assert!(!cfg.default_snippet.is_empty());
    }

    #[test]
    fn preamble_follows_install_order() {
        let cfg = PlotConfig {
            packages: vec!["ggplot2".into(), "dplyr".into(), "tidyr".into()],
            ..PlotConfig::default()
        };
        assert_eq!(
            cfg.preamble(),
            "library(ggplot2)\nlibrary(dplyr)\nlibrary(tidyr)\n"
        );
    }

    #[test]
    fn submission_appends_code_after_preamble() {
        let cfg = PlotConfig::default();
        let sub = cfg.submission("plot(1:10)");
        assert!(sub.starts_with("library(dplyr)\nlibrary(ggplot2)\n"));
        assert!(sub.ends_with("\nplot(1:10)"));
        assert!(sub.find("library(ggplot2)").unwrap() < sub.find("plot(1:10)").unwrap());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let cfg = PlotConfig::from_json(r#"{ "packages": ["lattice"] }"#).unwrap();
        assert_eq!(cfg.packages, vec!["lattice"]);
        assert_eq!(cfg.elements, ElementIds::default());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.capture, CaptureOptions::default());
    }

    #[test]
    fn from_json_reads_element_overrides() {
        let cfg =
            PlotConfig::from_json(r#"{ "elements": { "plot_output": "plots" } }"#).unwrap();
        assert_eq!(cfg.elements.plot_output, "plots");
        assert_eq!(cfg.elements.run_button, "run-button");
    }

    #[test]
    fn rejects_bad_package_lists() {
        assert!(matches!(
            PlotConfig::from_json(r#"{ "packages": [] }"#),
            Err(ConfigError::NoPackages)
        ));
        assert!(matches!(
            PlotConfig::from_json(r#"{ "packages": ["dplyr); system('x'"] }"#),
            Err(ConfigError::InvalidPackage(_))
        ));
        assert!(matches!(
            PlotConfig::from_json(r#"{ "packages": ["dplyr", "dplyr"] }"#),
            Err(ConfigError::DuplicatePackage(p)) if p == "dplyr"
        ));
        assert!(matches!(
            PlotConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_element_id() {
        let err = PlotConfig::from_json(r#"{ "elements": { "content": " " } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyElementId("content")));
    }

    #[test]
    fn package_name_rules() {
        for ok in ["dplyr", "ggplot2", "data.table", "R6"] {
            assert!(is_valid_package_name(ok), "{ok}");
        }
        for bad in ["", "x", "2d", "pkg.", "my-pkg", ".hidden", "gg plot"] {
            assert!(!is_valid_package_name(bad), "{bad}");
        }
    }
}
