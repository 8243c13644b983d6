use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

/// Connection settings for one remote panel instance.
///
/// The base URL is normalized on construction: request URLs are always
/// built as `{base_url}{path}`, so a trailing slash is stripped here.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub base_url: String,
    pub username: String,
    pub password: Secret<String>,
}

// Custom Serialize implementation - never expose the password in serialization
impl Serialize for PanelConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("PanelConfig", 3)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("password", "[REDACTED]")?;
        state.end()
    }
}

// Custom Deserialize implementation
impl<'de> Deserialize<'de> for PanelConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct PanelConfigHelper {
            base_url: String,
            username: String,
            password: String,
        }

        let helper = PanelConfigHelper::deserialize(deserializer)?;
        Ok(Self::new(helper.base_url, helper.username, helper.password))
    }
}

impl PanelConfig {
    /// Create a new configuration, normalizing the base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, password: String) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            username: username.into(),
            password: Secret::new(password),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PANEL}_URL` (e.g., `MARZBAN_URL`)
    /// - `{PANEL}_USERNAME` (e.g., `MARZBAN_USERNAME`)
    /// - `{PANEL}_PASSWORD` (e.g., `MARZBAN_PASSWORD`)
    pub fn from_env(panel_prefix: &str) -> Result<Self, ConfigError> {
        let url_var = format!("{}_URL", panel_prefix.to_uppercase());
        let username_var = format!("{}_USERNAME", panel_prefix.to_uppercase());
        let password_var = format!("{}_PASSWORD", panel_prefix.to_uppercase());

        let base_url =
            env::var(&url_var).map_err(|_| ConfigError::MissingEnvironmentVariable(url_var))?;

        let username = env::var(&username_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(username_var))?;

        let password = env::var(&password_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(password_var))?;

        Ok(Self::new(base_url, username, password))
    }

    /// Create configuration from .env file and environment variables
    ///
    /// This method first loads environment variables from a .env file (if it
    /// exists), then reads the configuration using the standard environment
    /// variable names.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    /// Add .env to your .gitignore file.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(panel_prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(panel_prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(
        panel_prefix: &str,
        env_file_path: &str,
    ) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file doesn't exist, that's okay - continue with system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(panel_prefix)
    }

    /// Check if this configuration carries credentials at all.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }

    /// Get the password (use carefully - exposes the secret)
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Strip trailing slashes so `{base}{path}` never produces `//`.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown panel kind: {0}")]
    UnknownPanelKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let config = PanelConfig::new("https://h.example:2053/", "admin", "pw".to_string());
        assert_eq!(config.base_url, "https://h.example:2053");

        let config = PanelConfig::new("https://h.example:443/p///", "admin", "pw".to_string());
        assert_eq!(config.base_url, "https://h.example:443/p");
    }

    #[test]
    fn serialization_redacts_password() {
        let config = PanelConfig::new("https://h.example", "admin", "hunter2".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("[REDACTED]"));
    }
}
