use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub help: HelpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the cloud service API.
    pub url: String,
    /// Environment variable holding the bearer token. Credentials are never
    /// stored in the config file itself.
    pub auth_token_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpConfig {
    /// Root URL for documentation links embedded in validation messages.
    pub root: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                url: "https://app.cartosync.dev".to_string(),
                auth_token_env: "CARTOSYNC_TOKEN".to_string(),
                timeout_secs: 30,
                connect_timeout_secs: 10,
            },
            help: HelpConfig {
                root: crate::help::DEFAULT_HELP_ROOT.to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Resolve the bearer token from the configured environment variable.
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(&self.auth_token_env).ok().filter(|t| !t.is_empty())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

/// Default config file location: `<user config dir>/cartosync/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cartosync").join("config.toml"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::CartosyncError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::CartosyncError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::CartosyncError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::CartosyncError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
