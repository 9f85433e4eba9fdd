use sekret::Secret;
use std::env;
use thiserror::Error;

pub const ENV_GH_TOKEN: &str = "GH_TOKEN";
pub const ENV_GH_USERNAME: &str = "GH_USERNAME";
pub const ENV_NOTION_TABLE_URL: &str = "NOTION_TABLE_URL";
pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";

#[derive(Error, PartialEq, Clone, Debug)]
pub enum ConfigError {
    #[error("Missing or empty required environment variable `{0}`.")]
    MissingVar(&'static str),
}

/// Run configuration, read once at startup.
///
/// Tokens are wrapped in [`Secret`] so they stay out of Debug output.
#[derive(Debug)]
pub struct Config {
    pub github_username: String,
    pub github_token: Secret<String>,
    pub notion_table_url: String,
    pub notion_token: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name).filter(|x| !x.is_empty()).ok_or(ConfigError::MissingVar(name))
        };
        let s = Self {
            github_username: require(ENV_GH_USERNAME)?,
            github_token: Secret(require(ENV_GH_TOKEN)?),
            notion_table_url: require(ENV_NOTION_TABLE_URL)?,
            notion_token: Secret(require(ENV_NOTION_TOKEN)?),
        };
        Ok(s)
    }
}
