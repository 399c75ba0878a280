//! Question sequencing over a dialog session.

use crate::error::DialogError;

use super::question::QuestionCatalog;
use super::session::DialogSession;

/// Lowest-index question the user has not answered yet. `None` means the
/// questionnaire is complete.
pub fn next_unanswered(catalog: &QuestionCatalog, session: &DialogSession) -> Option<usize> {
    (0..catalog.len()).find(|index| !session.answers.contains_key(index))
}

/// Record an answer after validating it against the catalog. The session
/// is untouched when validation fails.
pub fn record_answer(
    catalog: &QuestionCatalog,
    session: &mut DialogSession,
    question: usize,
    answer: usize,
) -> Result<(), DialogError> {
    let entry = catalog
        .get(question)
        .ok_or(DialogError::UnknownQuestion { index: question })?;

    if answer >= entry.answers.len() {
        return Err(DialogError::InvalidAnswer {
            question,
            answer,
            choices: entry.answers.len(),
        });
    }

    session.answers.insert(question, answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::question::{Question, QuestionKind};

    fn catalog(answer_counts: &[usize]) -> QuestionCatalog {
        QuestionCatalog::new(
            answer_counts
                .iter()
                .map(|&n| Question {
                    kind: QuestionKind::Button,
                    prompt: "?".into(),
                    answers: (0..n).map(|i| format!("answer {i}")).collect(),
                    search_params: Default::default(),
                    persistent: false,
                })
                .collect(),
        )
    }

    #[test]
    fn walks_questions_in_ascending_order() {
        let catalog = catalog(&[2, 2, 2]);
        let mut session = DialogSession::new();

        assert_eq!(next_unanswered(&catalog, &session), Some(0));

        record_answer(&catalog, &mut session, 0, 1).unwrap();
        assert_eq!(next_unanswered(&catalog, &session), Some(1));

        record_answer(&catalog, &mut session, 1, 0).unwrap();
        assert_eq!(next_unanswered(&catalog, &session), Some(2));

        record_answer(&catalog, &mut session, 2, 1).unwrap();
        assert_eq!(next_unanswered(&catalog, &session), None);
    }

    #[test]
    fn fills_gaps_before_moving_on() {
        let catalog = catalog(&[2, 2, 2]);
        let mut session = DialogSession::new();

        // Answers can come out of order; the lowest gap is always next.
        record_answer(&catalog, &mut session, 2, 0).unwrap();
        assert_eq!(next_unanswered(&catalog, &session), Some(0));

        record_answer(&catalog, &mut session, 0, 0).unwrap();
        assert_eq!(next_unanswered(&catalog, &session), Some(1));
    }

    #[test]
    fn rejects_out_of_range_answer_without_recording() {
        let catalog = catalog(&[2]);
        let mut session = DialogSession::new();

        let err = record_answer(&catalog, &mut session, 0, 2).unwrap_err();
        assert!(matches!(
            err,
            DialogError::InvalidAnswer {
                question: 0,
                answer: 2,
                choices: 2
            }
        ));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn rejects_unknown_question() {
        let catalog = catalog(&[2]);
        let mut session = DialogSession::new();

        let err = record_answer(&catalog, &mut session, 5, 0).unwrap_err();
        assert!(matches!(err, DialogError::UnknownQuestion { index: 5 }));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn re_answering_overwrites() {
        let catalog = catalog(&[3]);
        let mut session = DialogSession::new();

        record_answer(&catalog, &mut session, 0, 1).unwrap();
        record_answer(&catalog, &mut session, 0, 2).unwrap();
        assert_eq!(session.answers.get(&0), Some(&2));
    }
}
