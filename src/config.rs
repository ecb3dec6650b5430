use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Id of the optional `<script type="application/json">` element carrying overrides.
pub const CONFIG_ELEMENT_ID: &str = "wizard-config";

/// Selectors and class names the page markup is expected to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub step_selector: String,
    pub next_selector: String,
    pub back_selector: String,
    pub option_selector: String,
    pub multi_class: String,
    pub selected_class: String,
    pub active_class: String,
    pub form_id: String,
    pub input_flow_id: String,
    pub movie_flow_id: String,
    pub result_selector: String,
    pub result_next_id: String,
    pub result_prev_id: String,
    pub name_attribute: String,
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            step_selector: ".card".into(),
            next_selector: ".next".into(),
            back_selector: ".back".into(),
            option_selector: ".options button".into(),
            multi_class: "multi".into(),
            selected_class: "selected".into(),
            active_class: "active".into(),
            form_id: "wizardForm".into(),
            input_flow_id: "inputFlow".into(),
            movie_flow_id: "movieFlow".into(),
            result_selector: ".movie-card".into(),
            result_next_id: "nextBtn".into(),
            result_prev_id: "prevBtn".into(),
            name_attribute: "data-name".into(),
            log_level: "info".into(),
        }
    }
}

impl PageConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses embedded overrides, falling back to defaults on absent or bad input.
    pub fn load(embedded: Option<&str>) -> Self {
        let Some(text) = embedded.map(str::trim).filter(|text| !text.is_empty()) else {
            return Self::default();
        };

        match Self::from_json(text) {
            Ok(config) => config,
            Err(err) => {
                warn!("Falling back to default page config: {}", err);
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_given_keys() {
        let config = PageConfig::load(Some(r#"{ "step_selector": ".step", "unknown": 1 }"#));
        assert_eq!(config.step_selector, ".step");
        assert_eq!(config.result_selector, ".movie-card");
        assert_eq!(config.form_id, "wizardForm");
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        assert_eq!(PageConfig::load(Some("{ not json")), PageConfig::default());
        assert!(PageConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn missing_or_blank_overrides_use_defaults() {
        assert_eq!(PageConfig::load(None), PageConfig::default());
        assert_eq!(PageConfig::load(Some("   \n")), PageConfig::default());
    }

    #[test]
    fn log_level_parses_or_defaults() {
        let mut config = PageConfig::default();
        assert_eq!(config.log_level(), log::Level::Info);
        config.log_level = "debug".into();
        assert_eq!(config.log_level(), log::Level::Debug);
        config.log_level = "chatty".into();
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
