//! Typed Send API message shapes and a factory that builds every
//! message the bot sends from the configured texts.

use serde::Serialize;

use crate::config::Texts;
use crate::dialog::{Question, QuestionKind};
use crate::search::Profile;
use crate::webhook::event::{Postback, Sentinel};

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub id: String,
}

impl Recipient {
    fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// One Send API request body: either a message or a sender action.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Message {
        recipient: Recipient,
        message: MessageBody,
    },
    Action {
        recipient: Recipient,
        sender_action: SenderAction,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Template { payload: TemplatePayload },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum TemplatePayload {
    Button {
        text: String,
        buttons: Vec<Button>,
    },
    Generic {
        elements: Vec<GenericElement>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    WebUrl { url: String, title: String },
    Postback { title: String, payload: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct GenericElement {
    pub title: String,
    pub image_url: String,
    pub subtitle: String,
    pub default_action: DefaultAction,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DefaultAction {
    WebUrl { url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickReply {
    content_type: &'static str,
    title: String,
    payload: String,
}

impl QuickReply {
    fn text(title: &str, payload: String) -> Self {
        Self {
            content_type: "text",
            title: title.to_string(),
            payload,
        }
    }
}

/// Append the affiliate tag to an outbound link. Unparseable URLs pass
/// through untouched.
pub fn campaign_url(url: &str, afid: Option<&str>) -> String {
    let Some(tag) = afid else {
        return url.to_string();
    };
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("afid", tag);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

// ── Factory ─────────────────────────────────────────────────────────

/// Builds outbound messages from the configured texts. The landing
/// link is decorated with the affiliate tag once, up front.
pub struct MessageFactory {
    texts: Texts,
    landing_url: String,
}

impl MessageFactory {
    pub fn new(texts: Texts, project_landing: &str, afid: Option<&str>) -> Self {
        Self {
            texts,
            landing_url: campaign_url(project_landing, afid),
        }
    }

    /// A question, rendered per its kind: button questions become a
    /// button template, quick-reply questions a text message with
    /// quick replies. A greeting, when present, is prepended to the
    /// question text.
    pub fn question(
        &self,
        recipient: &str,
        index: usize,
        question: &Question,
        greeting: Option<&str>,
    ) -> OutboundMessage {
        let text = match greeting {
            Some(greeting) => format!("{greeting}\r\n\r\n{}", question.prompt),
            None => question.prompt.clone(),
        };

        let message = match question.kind {
            QuestionKind::Button => {
                let buttons = question
                    .answers
                    .iter()
                    .enumerate()
                    .map(|(answer, title)| Button::Postback {
                        title: title.clone(),
                        payload: Postback::answer_payload(index, answer),
                    })
                    .collect();
                MessageBody {
                    attachment: Some(Attachment::Template {
                        payload: TemplatePayload::Button { text, buttons },
                    }),
                    ..Default::default()
                }
            }
            QuestionKind::QuickReply => {
                let quick_replies = question
                    .answers
                    .iter()
                    .enumerate()
                    .map(|(answer, title)| {
                        QuickReply::text(title, Postback::answer_payload(index, answer))
                    })
                    .collect();
                MessageBody {
                    text: Some(text),
                    quick_replies: Some(quick_replies),
                    ..Default::default()
                }
            }
        };

        OutboundMessage::Message {
            recipient: Recipient::new(recipient),
            message,
        }
    }

    /// A generic-template card for one found profile. The final card
    /// swaps the next-profile button for the landing link and help.
    pub fn profile_card(&self, recipient: &str, profile: &Profile, is_last: bool) -> OutboundMessage {
        let mut buttons = vec![Button::WebUrl {
            url: profile.profile_url.clone(),
            title: self.texts.view_profile.clone(),
        }];
        if is_last {
            buttons.push(Button::WebUrl {
                url: self.landing_url.clone(),
                title: self.texts.follow_project.clone(),
            });
            buttons.push(Button::Postback {
                title: self.texts.need_help.clone(),
                payload: Sentinel::NeedHelp.as_str().to_string(),
            });
        } else {
            buttons.push(Button::Postback {
                title: self.texts.next_profile.clone(),
                payload: Sentinel::Next.as_str().to_string(),
            });
        }

        let element = GenericElement {
            title: profile.title.clone(),
            image_url: profile.image_url.clone(),
            subtitle: profile.details.clone(),
            default_action: DefaultAction::WebUrl {
                url: profile.profile_url.clone(),
            },
            buttons,
        };

        OutboundMessage::Message {
            recipient: Recipient::new(recipient),
            message: MessageBody {
                attachment: Some(Attachment::Template {
                    payload: TemplatePayload::Generic {
                        elements: vec![element],
                    },
                }),
                ..Default::default()
            },
        }
    }

    /// Fallback menu for input the bot has no answer for.
    pub fn default_menu(&self, recipient: &str) -> OutboundMessage {
        self.menu(
            recipient,
            self.texts.default_message.clone(),
            Button::Postback {
                title: self.texts.need_help.clone(),
                payload: Sentinel::NeedHelp.as_str().to_string(),
            },
        )
    }

    /// Menu shown when the search matched nobody, offering a restart.
    pub fn no_results_menu(&self, recipient: &str) -> OutboundMessage {
        self.menu(
            recipient,
            self.texts.no_people_found.clone(),
            Button::Postback {
                title: self.texts.change_settings.clone(),
                payload: Sentinel::Restart.as_str().to_string(),
            },
        )
    }

    pub fn support(&self, recipient: &str) -> OutboundMessage {
        self.text(recipient, self.texts.support.clone())
    }

    pub fn text(&self, recipient: &str, text: impl Into<String>) -> OutboundMessage {
        OutboundMessage::Message {
            recipient: Recipient::new(recipient),
            message: MessageBody {
                text: Some(text.into()),
                ..Default::default()
            },
        }
    }

    pub fn typing_on(&self, recipient: &str) -> OutboundMessage {
        OutboundMessage::Action {
            recipient: Recipient::new(recipient),
            sender_action: SenderAction::TypingOn,
        }
    }

    fn menu(&self, recipient: &str, text: String, action: Button) -> OutboundMessage {
        let buttons = vec![
            Button::WebUrl {
                url: self.landing_url.clone(),
                title: self.texts.follow_project.clone(),
            },
            action,
        ];
        OutboundMessage::Message {
            recipient: Recipient::new(recipient),
            message: MessageBody {
                attachment: Some(Attachment::Template {
                    payload: TemplatePayload::Button { text, buttons },
                }),
                ..Default::default()
            },
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
