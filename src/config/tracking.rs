use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ENDPOINT: &str = "http://51.250.21.126:8004";

/// Carriers eligible for automatic seaport tracking, including the legacy
/// transliterations seen in older exports.
const DEFAULT_RECOGNIZED_CARRIERS: &[&str] = &[
    "MSC",
    "ARKAS",
    "SINOKOR",
    "SINAKOR",
    "SKR",
    "СИНОКОР РУС ООО",
    "HEUNG-A LINE CO., LTD",
    "HUENG-A LINE",
    "HEUNG",
];

/// The Sinokor and Heung-A families skip tracking for repositioned empties.
const DEFAULT_EXCLUDED_CARRIERS: &[&str] = &[
    "SINOKOR",
    "SINAKOR",
    "SKR",
    "СИНОКОР РУС ООО",
    "HEUNG-A LINE CO., LTD",
    "HUENG-A LINE",
    "HEUNG",
];

/// Connection settings and carrier policy for the seaport tracking service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub endpoint: String,
    pub recognized_carriers: Vec<String>,
    pub excluded_carriers: Vec<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            recognized_carriers: DEFAULT_RECOGNIZED_CARRIERS
                .iter()
                .map(|carrier| carrier.to_string())
                .collect(),
            excluded_carriers: DEFAULT_EXCLUDED_CARRIERS
                .iter()
                .map(|carrier| carrier.to_string())
                .collect(),
            timeout_seconds: Some(30),
        }
    }
}

impl TrackingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::InvalidConfigValueError {
            field: "tracking_config".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }
}

/// Replaces `${VAR_NAME}` placeholders with environment values; unknown
/// variables are left as-is.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl Validate for TrackingConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_non_empty_list("recognized_carriers", &self.recognized_carriers)?;
        if let Some(seconds) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", seconds, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrackingConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.recognized_carriers.iter().any(|c| c == "MSC"));
        assert!(config.excluded_carriers.iter().any(|c| c == "SINOKOR"));
        assert!(!config.excluded_carriers.iter().any(|c| c == "MSC"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_overrides() {
        let toml_content = r#"
endpoint = "https://tracking.example.com"
recognized_carriers = ["MSC", "MAERSK"]
excluded_carriers = []
timeout_seconds = 10
"#;

        let config = TrackingConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.endpoint, "https://tracking.example.com");
        assert_eq!(config.recognized_carriers, vec!["MSC", "MAERSK"]);
        assert!(config.excluded_carriers.is_empty());
        assert_eq!(config.timeout_seconds, Some(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrackingConfig::from_toml_str(r#"endpoint = "http://localhost:8004""#).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8004");
        assert!(config.recognized_carriers.iter().any(|c| c == "ARKAS"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_TRACKING_ENDPOINT", "https://tracking.test.com");

        let config = TrackingConfig::from_toml_str(r#"endpoint = "${TEST_TRACKING_ENDPOINT}""#)
            .unwrap();
        assert_eq!(config.endpoint, "https://tracking.test.com");

        std::env::remove_var("TEST_TRACKING_ENDPOINT");
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        let config = TrackingConfig {
            endpoint: "not-a-url".to_string(),
            ..TrackingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_carrier_list() {
        let config = TrackingConfig {
            recognized_carriers: vec![],
            ..TrackingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"endpoint = "https://tracking.example.com""#)
            .unwrap();

        let config = TrackingConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoint, "https://tracking.example.com");
    }
}
