use crate::error::ImportError;
use crate::model::ImportMethod;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Connection settings for the Mealie server plus learned per-domain methods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Base URL of the Mealie instance, without trailing slash
    #[serde(default)]
    pub server_url: String,
    /// Long-lived API token created in the Mealie user profile
    #[serde(default)]
    pub api_token: String,
    /// Group used when building recipe links
    #[serde(default = "default_group_slug")]
    pub group_slug: String,
    /// Whether URL imports ask the server to keep the page's tags
    #[serde(default)]
    pub include_tags_default: bool,
    /// Domain (lower-cased, no `www.`) to the method that last worked there
    #[serde(default)]
    pub domain_preferences: HashMap<String, ImportMethod>,
    /// Where learned domain preferences are persisted
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

fn default_group_slug() -> String {
    "home".to_string()
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("mealie-preferences.json")
}

impl ImportSettings {
    pub fn new(server_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let mut settings = ImportSettings {
            server_url: server_url.into(),
            api_token: api_token.into(),
            group_slug: default_group_slug(),
            preferences_path: default_preferences_path(),
            ..Default::default()
        };
        settings.normalize();
        settings
    }

    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with MEALIE__ prefix
    /// 2. mealie.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: MEALIE__API_TOKEN
    pub fn load() -> Result<Self, ConfigError> {
        load_settings(None)
    }

    /// Same as [`ImportSettings::load`] but reads the given file instead of `mealie.toml`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        load_settings(Some(path))
    }

    /// Trim values, drop the trailing slash and fall back to the `home` group
    pub fn normalize(&mut self) {
        self.server_url = normalize_server_url(&self.server_url);
        self.api_token = self.api_token.trim().to_string();
        let group = self.group_slug.trim();
        self.group_slug = if group.is_empty() {
            default_group_slug()
        } else {
            group.to_string()
        };
    }

    pub fn is_configured(&self) -> bool {
        !self.server_url.is_empty() && !self.api_token.is_empty()
    }

    /// Fails with `NotConfigured` before any network call is attempted
    pub fn ensure_configured(&self) -> Result<(), ImportError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ImportError::NotConfigured)
        }
    }

    /// Link to a recipe in the Mealie web UI
    pub fn recipe_url(&self, slug: &str) -> String {
        format!("{}/g/{}/r/{}", self.server_url, self.group_slug, slug)
    }
}

/// Strip surrounding whitespace and trailing slashes
pub fn normalize_server_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn load_settings(path: Option<&Path>) -> Result<ImportSettings, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        // Optional config file (can be missing)
        None => File::with_name("mealie").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore as separator: MEALIE__SERVER_URL
        .add_source(
            Environment::with_prefix("MEALIE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut settings: ImportSettings = settings.try_deserialize()?;
    settings.normalize();
    Ok(settings)
}
