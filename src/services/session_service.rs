use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{ExamResult, ExamSession, SessionKey, SessionUpdate, SubmitReason},
    repositories::{ExamResultRepository, ExamSessionRepository, QuestionRepository},
    services::{
        exam_timer::ExamTimer, scoring_service::ScoringService, shuffler::QuestionShuffler,
    },
};

/// A session ready to be worked on, and whether it was reattached.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionHandle {
    pub session: ExamSession,
    pub resumed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FinalizeOutcome {
    /// This call completed the session and appended its result.
    Finalized(ExamResult),
    /// The session had already been completed; nothing was written.
    AlreadyCompleted {
        score: Option<f64>,
        result: Option<ExamResult>,
    },
}

impl FinalizeOutcome {
    pub fn result(&self) -> Option<&ExamResult> {
        match self {
            FinalizeOutcome::Finalized(result) => Some(result),
            FinalizeOutcome::AlreadyCompleted { result, .. } => result.as_ref(),
        }
    }
}

/// Creates, resumes and finalizes exam sessions.
pub struct SessionService {
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn ExamSessionRepository>,
    results: Arc<dyn ExamResultRepository>,
    shuffler: Arc<dyn QuestionShuffler>,
    timer: ExamTimer,
    duration: chrono::Duration,
    question_limit: Option<usize>,
}

impl SessionService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn ExamSessionRepository>,
        results: Arc<dyn ExamResultRepository>,
        shuffler: Arc<dyn QuestionShuffler>,
        timer: ExamTimer,
        duration: chrono::Duration,
        question_limit: Option<usize>,
    ) -> Self {
        Self {
            questions,
            sessions,
            results,
            shuffler,
            timer,
            duration,
            question_limit,
        }
    }

    pub fn timer(&self) -> &ExamTimer {
        &self.timer
    }

    /// Reattaches to a live session for `key`, or starts a fresh attempt.
    ///
    /// A live session is one that is ongoing and before its deadline; its order,
    /// answers, flags and deadline come back untouched and nothing is written.
    /// Anything else is replaced by a new record with a new random order.
    pub async fn start_or_resume(
        &self,
        key: &SessionKey,
        display_name: &str,
    ) -> AppResult<SessionHandle> {
        let session_id = key.session_id();

        if let Some(existing) = self.sessions.find(&session_id).await? {
            if existing.is_ongoing() && !self.timer.is_expired(&existing) {
                log::info!(
                    "Resuming session {} for {} ({} / {})",
                    session_id,
                    key.student_id,
                    key.subject,
                    key.package
                );
                return Ok(SessionHandle {
                    session: existing,
                    resumed: true,
                });
            }
            if existing.is_ongoing() {
                log::warn!(
                    "Session {} expired without being submitted, scoring it before a new attempt",
                    session_id
                );
                self.record_expired(&existing).await?;
            }
        }

        let questions = self.questions.query(&key.subject, &key.package).await?;
        if questions.is_empty() {
            return Err(AppError::NoQuestionsAvailable {
                subject: key.subject.clone(),
                package: key.package.clone(),
            });
        }

        let mut order: Vec<String> = questions.into_iter().map(|q| q.id).collect();
        self.shuffler.shuffle(&mut order);
        if let Some(limit) = self.question_limit {
            order.truncate(limit);
        }

        let session = ExamSession::start(
            key,
            display_name,
            order,
            self.timer.clock().now(),
            self.duration,
        );
        let session = self.sessions.set(session).await?;

        log::info!(
            "Started session {} (attempt {}) with {} questions, deadline {}",
            session.id,
            session.attempt_id,
            session.question_order.len(),
            session.deadline
        );

        Ok(SessionHandle {
            session,
            resumed: false,
        })
    }

    /// Appends the result of an expired attempt that is about to be replaced.
    ///
    /// The session record itself is left alone since the new attempt overwrites
    /// it; an already stored result for the attempt counts as recorded.
    async fn record_expired(&self, session: &ExamSession) -> AppResult<()> {
        let questions = self.questions.find_by_ids(&session.question_order).await?;
        let report = ScoringService::score(session, &questions);
        let result = ExamResult::for_session(
            session,
            report,
            SubmitReason::Expired,
            self.timer.clock().now(),
        );

        match self.results.append(result).await {
            Ok(result) => {
                log::info!(
                    "Recorded expired attempt {} of session {}: score {}",
                    session.attempt_id,
                    session.id,
                    result.score
                );
                Ok(())
            }
            Err(AppError::AlreadyExists(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Scores the session, marks it completed and appends its result.
    ///
    /// Calling this on a completed session, or losing a race with another
    /// finalize of the same attempt, writes nothing.
    pub async fn finalize(
        &self,
        session: &ExamSession,
        reason: SubmitReason,
    ) -> AppResult<FinalizeOutcome> {
        if !session.is_ongoing() {
            return self.already_completed(session).await;
        }

        let questions = self.questions.find_by_ids(&session.question_order).await?;
        let report = ScoringService::score(session, &questions);
        let completed_at = self.timer.clock().now();

        let transitioned = self
            .sessions
            .update(
                &session.id,
                &session.attempt_id,
                SessionUpdate::Complete {
                    score: report.final_score,
                    completed_at,
                },
            )
            .await?;

        if !transitioned {
            log::info!("Session {} was already finalized", session.id);
            return self.already_completed(session).await;
        }

        let result = ExamResult::for_session(session, report, reason, completed_at);
        match self.results.append(result).await {
            Ok(result) => {
                log::info!(
                    "Finalized session {} ({:?}): {} of {} correct, score {}",
                    session.id,
                    reason,
                    result.correct_count,
                    result.scored_count,
                    result.score
                );
                Ok(FinalizeOutcome::Finalized(result))
            }
            Err(AppError::AlreadyExists(_)) => self.already_completed(session).await,
            Err(err) => {
                log::error!(
                    "Session {} is completed but its result was not stored: {}",
                    session.id,
                    err
                );
                Err(err)
            }
        }
    }

    async fn already_completed(&self, session: &ExamSession) -> AppResult<FinalizeOutcome> {
        let result = self.results.find_by_attempt(&session.attempt_id).await?;
        if result.is_none() {
            log::warn!(
                "Completed session {} (attempt {}) has no stored result",
                session.id,
                session.attempt_id
            );
        }

        let score = match (&result, session.score) {
            (Some(result), _) => Some(result.score),
            (None, Some(score)) => Some(score),
            (None, None) => self
                .sessions
                .find(&session.id)
                .await?
                .filter(|stored| stored.attempt_id == session.attempt_id)
                .and_then(|stored| stored.score),
        };

        Ok(FinalizeOutcome::AlreadyCompleted { score, result })
    }
}
