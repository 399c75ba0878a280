//! Profile pagination over lazily fetched search results.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::search::{PeopleSearch, Profile};

use super::criteria;
use super::question::QuestionCatalog;
use super::session::{DialogSession, PaginationState};

/// What to do when the user asks for more after seeing every profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExhaustedPolicy {
    /// Re-run the search with the same criteria and page from the start.
    #[default]
    Refresh,
    /// Stop paging; the user has to restart the dialog.
    RequireRestart,
}

/// Outcome of one pagination step.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// A profile to show, with a flag marking the final cached one.
    Delivered { profile: Profile, is_last: bool },
    /// The search came back empty or failed; both read the same to the user.
    NoResults,
    /// Results are spent and the policy forbids refreshing.
    Exhausted,
}

/// Walks a session through search results one profile at a time. The
/// external search runs at most once per `advance` call.
pub struct ProfilePaginator {
    search: Arc<dyn PeopleSearch>,
    policy: ExhaustedPolicy,
}

impl ProfilePaginator {
    pub fn new(search: Arc<dyn PeopleSearch>, policy: ExhaustedPolicy) -> Self {
        Self { search, policy }
    }

    /// Whether the next `advance` call will consult the search backend.
    /// The dispatcher uses this to show a typing indicator first.
    pub fn will_search(&self, session: &DialogSession) -> bool {
        match session.pagination_state() {
            PaginationState::Empty => true,
            PaginationState::Paging => false,
            PaginationState::Exhausted => self.policy == ExhaustedPolicy::Refresh,
        }
    }

    pub async fn advance(&self, catalog: &QuestionCatalog, session: &mut DialogSession) -> Advance {
        match session.pagination_state() {
            PaginationState::Paging => deliver(session),
            PaginationState::Empty => self.search_and_deliver(catalog, session).await,
            PaginationState::Exhausted => match self.policy {
                ExhaustedPolicy::Refresh => {
                    session.clear_results();
                    self.search_and_deliver(catalog, session).await
                }
                ExhaustedPolicy::RequireRestart => Advance::Exhausted,
            },
        }
    }

    /// Search once, then deliver the first result. Failures resolve the
    /// same way an empty result does; the session keeps no cache either
    /// way, so a later user action may search again.
    async fn search_and_deliver(
        &self,
        catalog: &QuestionCatalog,
        session: &mut DialogSession,
    ) -> Advance {
        let criteria = criteria::build(catalog, session);

        match self.search.search(&criteria).await {
            Ok(profiles) if !profiles.is_empty() => {
                info!(count = profiles.len(), "Search returned profiles");
                session.store_results(profiles);
                deliver(session)
            }
            Ok(_) => {
                info!("Search returned no profiles");
                Advance::NoResults
            }
            Err(e) => {
                warn!(error = %e, "Search failed");
                Advance::NoResults
            }
        }
    }
}

fn deliver(session: &mut DialogSession) -> Advance {
    match session.next_profile() {
        Some((profile, is_last)) => Advance::Delivered { profile, is_last },
        None => Advance::NoResults,
    }
}
