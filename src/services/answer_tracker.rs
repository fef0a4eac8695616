use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        exam_session::{AnswerMap, FlagSet},
        AnswerValue, ExamSession, SessionUpdate,
    },
    repositories::ExamSessionRepository,
};

/// Working copy of one session's answers and flags.
///
/// The tracker does not look at question types; callers validate the answer
/// shape before recording it. State is pushed to the session store as a whole
/// on every `persist`. A failed push leaves the stored record as it was; the
/// client resends its full copy through a progress save.
#[derive(Debug, Clone)]
pub struct AnswerTracker {
    session: ExamSession,
}

impl AnswerTracker {
    pub fn new(session: ExamSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    fn ensure_open(&self) -> AppResult<()> {
        if !self.session.is_ongoing() {
            return Err(AppError::SessionCompleted(self.session.id.clone()));
        }
        Ok(())
    }

    fn ensure_member(&self, question_id: &str) -> AppResult<()> {
        if !self.session.contains_question(question_id) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is not part of session '{}'",
                question_id, self.session.id
            )));
        }
        Ok(())
    }

    pub fn record_answer(&mut self, question_id: &str, value: AnswerValue) -> AppResult<()> {
        self.ensure_open()?;
        self.ensure_member(question_id)?;
        self.session.answers.insert(question_id.to_string(), value);
        Ok(())
    }

    /// Flips the review marker; returns whether the question is now flagged.
    pub fn toggle_flag(&mut self, question_id: &str) -> AppResult<bool> {
        self.ensure_open()?;
        self.ensure_member(question_id)?;
        let flagged = if self.session.flagged.remove(question_id) {
            false
        } else {
            self.session.flagged.insert(question_id.to_string());
            true
        };
        Ok(flagged)
    }

    /// Replaces the whole answer map and flag set at once.
    pub fn replace_progress(&mut self, answers: AnswerMap, flagged: FlagSet) -> AppResult<()> {
        self.ensure_open()?;
        for question_id in answers.keys().chain(flagged.iter()) {
            self.ensure_member(question_id)?;
        }
        self.session.answers = answers;
        self.session.flagged = flagged;
        Ok(())
    }

    pub async fn persist(&self, sessions: &dyn ExamSessionRepository) -> AppResult<()> {
        self.ensure_open()?;

        let update = SessionUpdate::Progress {
            answers: self.session.answers.clone(),
            flagged: self.session.flagged.clone(),
        };

        match sessions
            .update(&self.session.id, &self.session.attempt_id, update)
            .await
        {
            Ok(true) => Ok(()),
            // The stored attempt was finalized or replaced underneath us.
            Ok(false) => Err(AppError::SessionCompleted(self.session.id.clone())),
            Err(err) => {
                log::warn!(
                    "Autosave of session {} failed: {}",
                    self.session.id,
                    err
                );
                Err(err)
            }
        }
    }
}
