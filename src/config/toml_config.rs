use crate::core::agent_client::DEFAULT_AGENT_SERVER_URL;
use crate::core::catalog::default_internal_actions;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, TutorError};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_TEMPLATE_PATH: &str = "template.yml";

/// `runbook-tutor.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub desktop: DesktopSettings,
    #[serde(default)]
    pub deploy: DeploySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesktopSettings {
    /// Desktop installation directory; defaults to `$ROBOCORP_HOME/sema4ai-desktop`.
    pub home: Option<String>,
    pub internal_actions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySettings {
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_server_url() -> String {
    DEFAULT_AGENT_SERVER_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_template() -> String {
    DEFAULT_TEMPLATE_PATH.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

/// Resolved settings the tutor runs with.
#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub agent_server_url: String,
    pub desktop_home: Option<String>,
    pub template_path: String,
    pub timeout_seconds: u64,
    pub internal_actions: Vec<String>,
}

impl TutorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TutorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TutorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROBOCORP_HOME})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// Desktop home from the file, else derived from `ROBOCORP_HOME`.
    pub fn resolve_desktop_home(&self) -> Option<String> {
        self.desktop.home.clone().or_else(|| {
            std::env::var("ROBOCORP_HOME")
                .ok()
                .map(|home| format!("{}/sema4ai-desktop", home))
        })
    }

    pub fn settings(&self) -> TutorSettings {
        TutorSettings {
            agent_server_url: self.server.url.clone(),
            desktop_home: self.resolve_desktop_home(),
            template_path: self.deploy.template.clone(),
            timeout_seconds: self.server.timeout_seconds,
            internal_actions: self
                .desktop
                .internal_actions
                .clone()
                .unwrap_or_else(default_internal_actions),
        }
    }
}

impl Validate for TutorConfig {
    fn validate(&self) -> Result<()> {
        self.settings().validate()
    }
}

impl Validate for TutorSettings {
    fn validate(&self) -> Result<()> {
        validate_url("server.url", &self.agent_server_url)?;
        validate_positive_number("server.timeout_seconds", self.timeout_seconds, 1)?;
        validate_path("deploy.template", &self.template_path)?;
        if let Some(home) = &self.desktop_home {
            validate_path("desktop.home", home)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TutorSettings {
    fn agent_server_url(&self) -> &str {
        &self.agent_server_url
    }

    fn desktop_home(&self) -> Option<&str> {
        self.desktop_home.as_deref()
    }

    fn template_path(&self) -> &str {
        &self.template_path
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn internal_actions(&self) -> &[String] {
        &self.internal_actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TutorConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.url, "http://127.0.0.1:8100");
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.deploy.template, "template.yml");
        assert_eq!(config.settings().internal_actions.len(), 4);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
url = "http://localhost:9000"
timeout_seconds = 5

[desktop]
home = "/opt/desktop"
internal_actions = ["Agent Deployer"]

[deploy]
template = "devdata/template.yml"
"#;

        let config = TutorConfig::from_toml_str(toml_content).unwrap();
        let settings = config.settings();
        assert_eq!(settings.agent_server_url(), "http://localhost:9000");
        assert_eq!(settings.desktop_home(), Some("/opt/desktop"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.internal_actions(), ["Agent Deployer".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TUTOR_TEST_SERVER", "http://agents.internal:8100");

        let config = TutorConfig::from_toml_str(
            r#"
[server]
url = "${TUTOR_TEST_SERVER}"
"#,
        )
        .unwrap();
        assert_eq!(config.server.url, "http://agents.internal:8100");

        std::env::remove_var("TUTOR_TEST_SERVER");
    }

    #[test]
    fn test_config_validation() {
        let config = TutorConfig::from_toml_str(
            r#"
[server]
url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TutorConfig::from_toml_str("[server]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[deploy]\ntemplate = \"bundle.yml\"\n")
            .unwrap();

        let config = TutorConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.deploy.template, "bundle.yml");
    }
}
