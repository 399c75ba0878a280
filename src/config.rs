//! Configuration loading and validation.
//!
//! Settings come from a JSON file (`BOT_CONFIG` or `config/default.json`),
//! with credentials overridable through environment variables so the file
//! can be committed without secrets.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::dialog::{ExhaustedPolicy, QuestionCatalog};
use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config/default.json";

/// Top-level bot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Messenger app secret, used to verify webhook signatures.
    #[serde(default = "empty_secret")]
    pub app_secret: SecretString,
    /// Token echoed back during the webhook subscription handshake.
    #[serde(default)]
    pub validation_token: String,
    /// Page access token for the Send API.
    #[serde(default = "empty_secret")]
    pub page_access_token: SecretString,
    /// Public base URL this server is reachable at. Its port (if any)
    /// doubles as the listen port.
    #[serde(rename = "serverURL", default)]
    pub server_url: String,
    /// Graph API base, ending in `/me/`.
    #[serde(rename = "facebookGraphURL", default = "default_graph_url")]
    pub facebook_graph_url: String,
    /// People-search service endpoint.
    #[serde(rename = "searchURL", default)]
    pub search_url: String,
    /// Seconds of inactivity before a dialog is swept.
    pub dialog_lifetime: i64,
    /// Outbound HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Affiliate tag appended to outbound project links.
    #[serde(default)]
    pub afid: Option<String>,
    /// Domains to whitelist on the Messenger profile during setup.
    #[serde(default)]
    pub whitelist_domains: Vec<String>,
    pub dialog: DialogConfig,
}

/// Questionnaire and messaging texts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogConfig {
    /// Landing page linked from profile cards and menus.
    pub project_landing: String,
    /// Whether setup installs a Get Started button for new threads.
    #[serde(default)]
    pub get_started_button: bool,
    /// What to do when a user asks for the next profile past the last one.
    #[serde(default)]
    pub exhausted_policy: ExhaustedPolicy,
    pub questions: QuestionCatalog,
    pub texts: Texts,
}

/// User-facing copy. Everything the bot says comes from here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texts {
    /// Static greeting shown on the Messenger profile, `{{user_first_name}}`
    /// placeholders allowed. `None` removes any previously set greeting.
    #[serde(default)]
    pub greeting_message: Option<String>,
    /// Greeting prepended to the first question of a new dialog.
    #[serde(default)]
    pub greeting_dialog_message: Option<String>,
    pub default_message: String,
    pub support: String,
    pub no_people_found: String,
    pub view_profile: String,
    pub next_profile: String,
    pub follow_project: String,
    pub need_help: String,
    pub change_settings: String,
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

fn default_graph_url() -> String {
    "https://graph.facebook.com/v2.6/me/".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl BotConfig {
    /// Load from `BOT_CONFIG` if set, otherwise `config/default.json`,
    /// then apply environment overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("BOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::ParseError(format!("{path}: {e}")))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over file values so deployments can
    /// keep secrets out of the config file.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("MESSENGER_APP_SECRET") {
            self.app_secret = SecretString::from(v);
        }
        if let Ok(v) = std::env::var("MESSENGER_VALIDATION_TOKEN") {
            self.validation_token = v;
        }
        if let Ok(v) = std::env::var("MESSENGER_PAGE_ACCESS_TOKEN") {
            self.page_access_token = SecretString::from(v);
        }
        if let Ok(v) = std::env::var("SERVER_URL") {
            self.server_url = v;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "appSecret".to_string(),
                hint: "set MESSENGER_APP_SECRET or fill it in the config file".to_string(),
            });
        }
        if self.validation_token.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "validationToken".to_string(),
                hint: "set MESSENGER_VALIDATION_TOKEN or fill it in the config file".to_string(),
            });
        }
        if self.page_access_token.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "pageAccessToken".to_string(),
                hint: "set MESSENGER_PAGE_ACCESS_TOKEN or fill it in the config file".to_string(),
            });
        }
        if self.search_url.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "searchURL".to_string(),
                hint: "point it at the people-search service".to_string(),
            });
        }
        if self.dialog_lifetime <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "dialogLifetime".to_string(),
                message: "must be a positive number of seconds".to_string(),
            });
        }
        if self.dialog.questions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "dialog.questions".to_string(),
                message: "at least one question is required".to_string(),
            });
        }
        for (index, question) in self.dialog.questions.iter() {
            if question.answers.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("dialog.questions[{index}].answers"),
                    message: "every question needs at least one answer".to_string(),
                });
            }
            if let Some(answer) = out_of_range_key(&question.search_params, question.answers.len())
            {
                return Err(ConfigError::InvalidValue {
                    key: format!("dialog.questions[{index}].searchParams"),
                    message: format!(
                        "references answer {answer} but only {} answers exist",
                        question.answers.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Listen port, taken from the server URL when it carries one.
    pub fn port(&self) -> u16 {
        reqwest::Url::parse(&self.server_url)
            .ok()
            .and_then(|url| url.port())
            .unwrap_or(8080)
    }

    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.dialog_lifetime)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout)
    }
}

fn out_of_range_key<V>(params: &BTreeMap<usize, V>, answers: usize) -> Option<usize> {
    params.keys().copied().find(|key| *key >= answers)
}
