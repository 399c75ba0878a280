//! Projection of collected answers into search criteria.

use crate::search::SearchCriteria;

use super::question::QuestionCatalog;
use super::session::DialogSession;

/// Merge the search parameters of every answered question, lowest index
/// first, so on key collisions the highest-index question wins. Pure:
/// reads the session, never writes it.
pub fn build(catalog: &QuestionCatalog, session: &DialogSession) -> SearchCriteria {
    let mut criteria = SearchCriteria::default();

    for (question, answer) in &session.answers {
        let Some(params) = catalog
            .get(*question)
            .and_then(|q| q.search_params.get(answer))
        else {
            continue;
        };

        for (key, value) in params {
            criteria.insert(key.clone(), value.clone());
        }
    }

    criteria
}
