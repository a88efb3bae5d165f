use crate::core::client::{DEFAULT_API_URL, DEFAULT_EN_CATALOG_URL, DEFAULT_RU_CATALOG_URL};
use crate::utils::error::{Result, SocProofError};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_ru_url")]
    pub ru_url: String,
    #[serde(default = "default_en_url")]
    pub en_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_descriptions_ttl")]
    pub descriptions_ttl_seconds: u64,
    #[serde(default = "default_services_ttl")]
    pub services_ttl_seconds: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ru_url() -> String {
    DEFAULT_RU_CATALOG_URL.to_string()
}

fn default_en_url() -> String {
    DEFAULT_EN_CATALOG_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("soc-proof/{}", env!("CARGO_PKG_VERSION"))
}

fn default_enabled() -> bool {
    true
}

fn default_descriptions_ttl() -> u64 {
    24 * 60 * 60
}

fn default_services_ttl() -> u64 {
    5 * 60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            url: default_api_url(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ru_url: default_ru_url(),
            en_url: default_en_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            descriptions_ttl_seconds: default_descriptions_ttl(),
            services_ttl_seconds: default_services_ttl(),
        }
    }
}

impl ClientConfig {
    /// Defaults with the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.token = token.into();
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SocProofError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api.token", &self.api.token)?;
        if self.api.token.contains("${") {
            return Err(SocProofError::invalid_argument(
                "api.token",
                &self.api.token,
                "Environment variable is not set",
            ));
        }
        validate_url("api.url", &self.api.url)?;
        validate_url("catalog.ru_url", &self.catalog.ru_url)?;
        validate_url("catalog.en_url", &self.catalog.en_url)?;
        validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;
        validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        if self.cache.enabled {
            validate_positive_number("cache.descriptions_ttl_seconds", self.cache.descriptions_ttl_seconds, 1)?;
            validate_positive_number("cache.services_ttl_seconds", self.cache.services_ttl_seconds, 1)?;
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
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
token = "abc123"
url = "https://soc-proof.su/api/v2"

[catalog]
ru_url = "https://soc-proof.su/services"
en_url = "https://soc-proof.su/en/services"

[http]
timeout_seconds = 10
user_agent = "test-agent"

[cache]
enabled = false
descriptions_ttl_seconds = 600
services_ttl_seconds = 60
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.token, "abc123");
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.user_agent, "test-agent");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.services_ttl_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = ClientConfig::from_toml_str("[api]\ntoken = \"t\"\n").unwrap();

        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.catalog.en_url, DEFAULT_EN_CATALOG_URL);
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.descriptions_ttl_seconds, 86_400);
        assert_eq!(config.cache.services_ttl_seconds, 300);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SOC_PROOF_TEST_TOKEN", "from-env");

        let config = ClientConfig::from_toml_str("[api]\ntoken = \"${SOC_PROOF_TEST_TOKEN}\"\n").unwrap();
        assert_eq!(config.api.token, "from-env");

        std::env::remove_var("SOC_PROOF_TEST_TOKEN");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config =
            ClientConfig::from_toml_str("[api]\ntoken = \"${SOC_PROOF_SURELY_UNSET_VAR}\"\n").unwrap();

        assert_eq!(config.api.token, "${SOC_PROOF_SURELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::with_token("t");
        assert!(config.validate().is_ok());

        config.api.url = "invalid-url".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_token("t");
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());

        assert!(ClientConfig::default().validate().is_err(), "token is required");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ClientConfig::from_toml_str("[api\ntoken = 1").unwrap_err();
        assert!(matches!(err, SocProofError::Config { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\ntoken = \"file-token\"\n[http]\ntimeout_seconds = 5\n")
            .unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api.token, "file-token");
        assert_eq!(config.http.timeout_seconds, 5);
    }
}
