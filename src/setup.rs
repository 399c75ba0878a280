//! One-time Messenger profile setup: app subscription, greeting text,
//! Get Started button, persistent menu, domain whitelist.
//!
//! `plan` computes the Graph API calls for a configuration; the
//! `configure` binary applies them.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::SendError;
use crate::messenger::message::campaign_url;
use crate::webhook::event::Sentinel;

/// One Graph API configuration call.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupCall {
    pub endpoint: &'static str,
    pub method: Method,
    pub body: Value,
}

/// The full setup sequence for a configuration. Settings absent from
/// the config are deleted from the profile rather than left stale.
pub fn plan(config: &BotConfig) -> Vec<SetupCall> {
    let mut calls = Vec::new();

    if !config.whitelist_domains.is_empty() {
        calls.push(SetupCall {
            endpoint: "thread_settings",
            method: Method::POST,
            body: json!({
                "setting_type": "domain_whitelisting",
                "whitelisted_domains": config.whitelist_domains,
                "domain_action_type": "add"
            }),
        });
    }

    calls.push(SetupCall {
        endpoint: "subscribed_apps",
        method: Method::POST,
        body: json!({}),
    });

    match &config.dialog.texts.greeting_message {
        Some(text) => calls.push(SetupCall {
            endpoint: "thread_settings",
            method: Method::POST,
            body: json!({
                "setting_type": "greeting",
                "greeting": {"text": text}
            }),
        }),
        None => calls.push(SetupCall {
            endpoint: "thread_settings",
            method: Method::DELETE,
            body: json!({"setting_type": "greeting"}),
        }),
    }

    if config.dialog.get_started_button {
        calls.push(SetupCall {
            endpoint: "thread_settings",
            method: Method::POST,
            body: json!({
                "setting_type": "call_to_actions",
                "thread_state": "new_thread",
                "call_to_actions": [{"payload": Sentinel::NewThread.as_str()}]
            }),
        });
    } else {
        calls.push(SetupCall {
            endpoint: "thread_settings",
            method: Method::DELETE,
            body: json!({
                "setting_type": "call_to_actions",
                "thread_state": "new_thread"
            }),
        });
    }

    calls.push(SetupCall {
        endpoint: "thread_settings",
        method: Method::POST,
        body: json!({
            "setting_type": "call_to_actions",
            "thread_state": "existing_thread",
            "call_to_actions": [
                {
                    "type": "web_url",
                    "url": campaign_url(&config.dialog.project_landing, config.afid.as_deref()),
                    "title": config.dialog.texts.follow_project
                },
                {
                    "type": "postback",
                    "title": config.dialog.texts.change_settings,
                    "payload": Sentinel::Restart.as_str()
                }
            ]
        }),
    });

    calls
}

/// Applies setup calls against the Graph API.
pub struct SetupClient {
    client: reqwest::Client,
    graph_url: String,
    access_token: SecretString,
}

impl SetupClient {
    pub fn new(client: reqwest::Client, graph_url: String, access_token: SecretString) -> Self {
        Self {
            client,
            graph_url,
            access_token,
        }
    }

    async fn call(&self, call: &SetupCall) -> Result<(), SendError> {
        let url = format!("{}{}", self.graph_url, call.endpoint);
        let resp = self
            .client
            .request(call.method.clone(), &url)
            .query(&[("access_token", self.access_token.expose_secret())])
            .json(&call.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::RequestFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Run the whole plan, logging each step. Failed steps are counted
    /// and the remaining steps still run.
    pub async fn apply(&self, config: &BotConfig) -> usize {
        let mut failed = 0;
        for call in plan(config) {
            let setting = call.body["setting_type"].as_str().unwrap_or(call.endpoint);
            match self.call(&call).await {
                Ok(()) => {
                    info!(endpoint = call.endpoint, setting = setting, "Applied platform setting");
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        endpoint = call.endpoint,
                        setting = setting,
                        error = %e,
                        "Platform setting failed"
                    );
                }
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(value: Value) -> BotConfig {
        serde_json::from_value(value).unwrap()
    }

    fn minimal_json() -> Value {
        json!({
            "appSecret": "s",
            "validationToken": "v",
            "pageAccessToken": "p",
            "serverURL": "https://bot.test/",
            "searchURL": "https://search.test/api",
            "dialogLifetime": 600,
            "dialog": {
                "projectLanding": "https://example.com/",
                "questions": [{
                    "type": "button",
                    "question": "Which region?",
                    "answers": ["North"]
                }],
                "texts": {
                    "defaultMessage": "d",
                    "support": "s",
                    "noPeopleFound": "n",
                    "viewProfile": "v",
                    "nextProfile": "n",
                    "followProject": "Visit us",
                    "needHelp": "h",
                    "changeSettings": "Change answers"
                }
            }
        })
    }

    #[test]
    fn minimal_config_clears_optional_settings() {
        let calls = plan(&config(minimal_json()));

        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].endpoint, "subscribed_apps");
        assert_eq!(calls[0].method, Method::POST);

        assert_eq!(calls[1].method, Method::DELETE);
        assert_eq!(calls[1].body["setting_type"], json!("greeting"));

        assert_eq!(calls[2].method, Method::DELETE);
        assert_eq!(calls[2].body["thread_state"], json!("new_thread"));

        assert_eq!(calls[3].method, Method::POST);
        assert_eq!(calls[3].body["thread_state"], json!("existing_thread"));
        assert_eq!(
            calls[3].body["call_to_actions"],
            json!([
                {"type": "web_url", "url": "https://example.com/", "title": "Visit us"},
                {"type": "postback", "title": "Change answers", "payload": "restart"}
            ])
        );
    }

    #[test]
    fn full_config_installs_every_setting() {
        let mut value = minimal_json();
        value["afid"] = json!("aff-7");
        value["whitelistDomains"] = json!(["https://example.com"]);
        value["dialog"]["getStartedButton"] = json!(true);
        value["dialog"]["texts"]["greetingMessage"] = json!("Hi {{user_first_name}}!");

        let calls = plan(&config(value));

        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls[0].body,
            json!({
                "setting_type": "domain_whitelisting",
                "whitelisted_domains": ["https://example.com"],
                "domain_action_type": "add"
            })
        );
        assert_eq!(calls[1].endpoint, "subscribed_apps");

        assert_eq!(calls[2].method, Method::POST);
        assert_eq!(
            calls[2].body["greeting"]["text"],
            json!("Hi {{user_first_name}}!")
        );

        assert_eq!(calls[3].method, Method::POST);
        assert_eq!(
            calls[3].body["call_to_actions"],
            json!([{"payload": "NEW_THREAD"}])
        );

        // The persistent-menu landing link carries the affiliate tag.
        assert_eq!(
            calls[4].body["call_to_actions"][0]["url"],
            json!("https://example.com/?afid=aff-7")
        );
    }
}
