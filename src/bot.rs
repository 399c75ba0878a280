//! Event dispatch: connects classified webhook events to the dialog
//! state machine and the Send API.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::dialog::{
    sequencer, Advance, DialogSession, ProfilePaginator, QuestionCatalog, SessionStore,
};
use crate::messenger::{MessageFactory, OutboundMessage, SendApi};
use crate::search::PeopleSearch;
use crate::webhook::event::{EventKind, Postback, Sentinel, WebhookEvent, WebhookPayload};

pub struct Bot {
    catalog: QuestionCatalog,
    store: SessionStore,
    paginator: ProfilePaginator,
    factory: MessageFactory,
    send_api: Arc<dyn SendApi>,
    greeting: Option<String>,
}

impl Bot {
    pub fn new(
        config: &BotConfig,
        send_api: Arc<dyn SendApi>,
        search: Arc<dyn PeopleSearch>,
    ) -> Self {
        Self {
            catalog: config.dialog.questions.clone(),
            store: SessionStore::new(config.lifetime()),
            paginator: ProfilePaginator::new(search, config.dialog.exhausted_policy),
            factory: MessageFactory::new(
                config.dialog.texts.clone(),
                &config.dialog.project_landing,
                config.afid.as_deref(),
            ),
            send_api,
            greeting: config.dialog.texts.greeting_dialog_message.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }

    /// Process one webhook delivery: every messaging event in every
    /// entry, then the expiry sweep.
    pub async fn handle_payload(&self, payload: WebhookPayload) {
        if payload.object != "page" {
            debug!(object = %payload.object, "Ignoring non-page webhook object");
            return;
        }

        for entry in payload.entry {
            for messaging in entry.messaging {
                match messaging.classify() {
                    Ok(event) => self.handle_event(event).await,
                    Err(e) => warn!(error = %e, "Skipping undecodable messaging event"),
                }
            }
        }

        self.store.sweep_expired().await;
    }

    async fn handle_event(&self, event: WebhookEvent) {
        let WebhookEvent { sender_id, kind } = event;

        // Unknown events never create or touch a session.
        if matches!(kind, EventKind::Unknown) {
            warn!(sender_id = %sender_id, "Unknown messaging event");
            return;
        }

        let session = self.store.resolve(&sender_id).await;
        let mut session = session.lock().await;
        session.last_activity = Utc::now();

        match kind {
            EventKind::Text(text) => self.on_text(&sender_id, &mut session, &text).await,
            EventKind::Postback(postback) | EventKind::QuickReply(postback) => {
                self.on_postback(&sender_id, &mut session, postback).await
            }
            EventKind::Optin => {
                info!(sender_id = %sender_id, "Authentication opt-in received");
                self.deliver(self.factory.text(&sender_id, "Authentication successful"))
                    .await;
            }
            EventKind::Delivery(delivery) => {
                for mid in &delivery.mids {
                    debug!(mid = %mid, "Message delivery confirmed");
                }
            }
            EventKind::Read(read) => {
                debug!(
                    watermark = read.watermark.unwrap_or_default(),
                    "Messages read"
                );
            }
            EventKind::AccountLinking(linking) => {
                info!(
                    sender_id = %sender_id,
                    status = linking.status.as_deref().unwrap_or("unknown"),
                    "Account linking update"
                );
            }
            EventKind::Unknown => {}
        }
    }

    /// Free text. With nothing answered the questionnaire starts; with
    /// everything answered it starts over. Mid-questionnaire the fallback
    /// menu points back at the buttons.
    async fn on_text(&self, sender_id: &str, session: &mut DialogSession, text: &str) {
        debug!(sender_id = %sender_id, text = %text, "Received text message");

        if !session.has_answers() {
            self.send_next_question(sender_id, session).await;
        } else if sequencer::next_unanswered(&self.catalog, session).is_none() {
            *session = session.restarted(&self.catalog);
            self.send_next_question(sender_id, session).await;
        } else {
            self.deliver(self.factory.default_menu(sender_id)).await;
        }
    }

    async fn on_postback(&self, sender_id: &str, session: &mut DialogSession, postback: Postback) {
        match postback {
            Postback::Sentinel(Sentinel::NeedHelp) => {
                self.deliver(self.factory.support(sender_id)).await;
            }
            Postback::Sentinel(Sentinel::NewThread) => {
                *session = DialogSession::new();
                self.send_next_question(sender_id, session).await;
            }
            Postback::Sentinel(Sentinel::Restart) => {
                *session = session.restarted(&self.catalog);
                self.send_next_question(sender_id, session).await;
            }
            Postback::Sentinel(Sentinel::Next) => {
                self.send_profile(sender_id, session).await;
            }
            Postback::Answer { question, answer } => {
                if let Err(e) = sequencer::record_answer(&self.catalog, session, question, answer)
                {
                    warn!(sender_id = %sender_id, error = %e, "Rejected answer");
                }
                self.send_next_question(sender_id, session).await;
            }
        }
    }

    /// Ask the lowest unanswered question, or page profiles once the
    /// questionnaire is complete. The greeting flag is consumed on the
    /// first prompt whether or not greeting text is configured.
    async fn send_next_question(&self, sender_id: &str, session: &mut DialogSession) {
        let Some(index) = sequencer::next_unanswered(&self.catalog, session) else {
            self.send_profile(sender_id, session).await;
            return;
        };

        let first_prompt = session.take_greeting();
        let greeting = if first_prompt {
            self.greeting.as_deref()
        } else {
            None
        };

        if let Some(question) = self.catalog.get(index) {
            self.deliver(self.factory.question(sender_id, index, question, greeting))
                .await;
        }
    }

    /// Deliver the next found profile, searching first when the cache
    /// is empty, with a typing indicator while the user waits.
    async fn send_profile(&self, sender_id: &str, session: &mut DialogSession) {
        if self.paginator.will_search(session) {
            self.deliver(self.factory.typing_on(sender_id)).await;
        }

        match self.paginator.advance(&self.catalog, session).await {
            Advance::Delivered { profile, is_last } => {
                self.deliver(self.factory.profile_card(sender_id, &profile, is_last))
                    .await;
            }
            Advance::NoResults => {
                self.deliver(self.factory.no_results_menu(sender_id)).await;
            }
            Advance::Exhausted => {
                self.deliver(self.factory.default_menu(sender_id)).await;
            }
        }
    }

    /// Send failures are logged, not retried.
    async fn deliver(&self, message: OutboundMessage) {
        if let Err(e) = self.send_api.send(&message).await {
            warn!(error = %e, "Send API call failed");
        }
    }
}
