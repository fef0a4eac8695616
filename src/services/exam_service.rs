use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{ExamSession, Question, SessionKey, SessionStatus, SubmitReason},
        dto::{
            request::{RecordAnswerRequest, SaveProgressRequest, StartExamRequest},
            response::{AutosaveAck, SessionView, SubmissionResponse},
        },
    },
    repositories::{ExamSessionRepository, QuestionRepository},
    services::{
        answer_tracker::AnswerTracker,
        session_service::{FinalizeOutcome, SessionService},
    },
};

/// Entry point for everything a student does during an exam.
///
/// Every call that touches an ongoing session checks its deadline first. An
/// expired session is finalized with [`SubmitReason::Expired`] before the call
/// is answered, so the forced submission happens on whichever request notices
/// the deadline first.
pub struct ExamService {
    session_service: Arc<SessionService>,
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn ExamSessionRepository>,
}

impl ExamService {
    pub fn new(
        session_service: Arc<SessionService>,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn ExamSessionRepository>,
    ) -> Self {
        Self {
            session_service,
            questions,
            sessions,
        }
    }

    pub async fn start_exam(&self, request: StartExamRequest) -> AppResult<SessionView> {
        request.validate()?;

        let key = SessionKey::new(&request.student_id, &request.subject, &request.package);
        let handle = self
            .session_service
            .start_or_resume(&key, request.display_name())
            .await?;

        self.view(&handle.session, handle.resumed).await
    }

    /// Current state of a session. Doubles as the client heartbeat.
    pub async fn get_session(&self, session_id: &str) -> AppResult<SessionView> {
        let mut session = self.find(session_id).await?;

        if session.is_ongoing() && self.session_service.timer().is_expired(&session) {
            let outcome = self
                .session_service
                .finalize(&session, SubmitReason::Expired)
                .await?;
            mark_completed(&mut session, &outcome);
        }

        self.view(&session, true).await
    }

    pub async fn record_answer(
        &self,
        session_id: &str,
        question_id: &str,
        request: RecordAnswerRequest,
    ) -> AppResult<AutosaveAck> {
        let session = self.load_open(session_id).await?;
        if !session.contains_question(question_id) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is not part of session '{}'",
                question_id, session_id
            )));
        }

        let question = self
            .questions
            .find_by_id(question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", question_id))
            })?;
        request
            .value
            .check_for(&question)
            .map_err(AppError::ValidationError)?;

        let mut tracker = AnswerTracker::new(session);
        tracker.record_answer(question_id, request.value)?;
        tracker.persist(self.sessions.as_ref()).await?;

        Ok(self.ack(tracker.session(), None))
    }

    pub async fn toggle_flag(&self, session_id: &str, question_id: &str) -> AppResult<AutosaveAck> {
        let session = self.load_open(session_id).await?;

        let mut tracker = AnswerTracker::new(session);
        let flagged = tracker.toggle_flag(question_id)?;
        tracker.persist(self.sessions.as_ref()).await?;

        Ok(self.ack(tracker.session(), Some(flagged)))
    }

    /// Replaces the stored answers and flags with a full client snapshot.
    pub async fn save_progress(
        &self,
        session_id: &str,
        request: SaveProgressRequest,
    ) -> AppResult<AutosaveAck> {
        let session = self.load_open(session_id).await?;

        let answered: Vec<String> = request.answers.keys().cloned().collect();
        let questions: HashMap<String, Question> = self
            .questions
            .find_by_ids(&answered)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        for (question_id, value) in &request.answers {
            if !session.contains_question(question_id) {
                continue;
            }
            let question = questions.get(question_id).ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", question_id))
            })?;
            value.check_for(question).map_err(AppError::ValidationError)?;
        }

        let mut tracker = AnswerTracker::new(session);
        tracker.replace_progress(request.answers, request.flagged)?;
        tracker.persist(self.sessions.as_ref()).await?;

        Ok(self.ack(tracker.session(), None))
    }

    /// Finalizes the session. Submitting twice returns the first outcome.
    pub async fn submit(&self, session_id: &str) -> AppResult<SubmissionResponse> {
        let session = self.find(session_id).await?;

        let reason = if session.is_ongoing() && self.session_service.timer().is_expired(&session)
        {
            SubmitReason::Expired
        } else {
            SubmitReason::Manual
        };

        let outcome = self.session_service.finalize(&session, reason).await?;
        Ok(submission(session_id, outcome))
    }

    async fn find(&self, session_id: &str) -> AppResult<ExamSession> {
        self.sessions
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session '{}' not found", session_id)))
    }

    /// Loads a session that may still be changed, finalizing it if the deadline
    /// has passed.
    async fn load_open(&self, session_id: &str) -> AppResult<ExamSession> {
        let session = self.find(session_id).await?;

        if !session.is_ongoing() {
            return Err(AppError::SessionCompleted(session_id.to_string()));
        }

        if self.session_service.timer().is_expired(&session) {
            log::info!("Session {} ran out of time, submitting it", session_id);
            self.session_service
                .finalize(&session, SubmitReason::Expired)
                .await?;
            return Err(AppError::SessionExpired(session_id.to_string()));
        }

        Ok(session)
    }

    /// Questions of the session in presentation order. Deleted questions are skipped.
    async fn ordered_questions(&self, session: &ExamSession) -> AppResult<Vec<Question>> {
        let mut by_id: HashMap<String, Question> = self
            .questions
            .find_by_ids(&session.question_order)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        Ok(session
            .question_order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    async fn view(&self, session: &ExamSession, resumed: bool) -> AppResult<SessionView> {
        let questions = self.ordered_questions(session).await?;
        let remaining = match session.status {
            SessionStatus::Ongoing => self.session_service.timer().remaining_seconds(session),
            SessionStatus::Completed => 0,
        };
        Ok(SessionView::new(session, &questions, resumed, remaining))
    }

    fn ack(&self, session: &ExamSession, flagged: Option<bool>) -> AutosaveAck {
        AutosaveAck {
            session_id: session.id.clone(),
            answered_count: session.answers.len() as i32,
            flagged_count: session.flagged.len() as i32,
            flagged,
            remaining_seconds: self.session_service.timer().remaining_seconds(session),
        }
    }
}

fn mark_completed(session: &mut ExamSession, outcome: &FinalizeOutcome) {
    session.status = SessionStatus::Completed;
    session.score = match outcome {
        FinalizeOutcome::Finalized(result) => Some(result.score),
        FinalizeOutcome::AlreadyCompleted { score, .. } => *score,
    };
    if let Some(result) = outcome.result() {
        session.completed_at = Some(result.submitted_at);
    }
}

fn submission(session_id: &str, outcome: FinalizeOutcome) -> SubmissionResponse {
    match outcome {
        FinalizeOutcome::Finalized(result) => SubmissionResponse {
            session_id: session_id.to_string(),
            already_submitted: false,
            score: Some(result.score),
            result: Some(result.into()),
        },
        FinalizeOutcome::AlreadyCompleted { score, result } => SubmissionResponse {
            session_id: session_id.to_string(),
            already_submitted: true,
            score,
            result: result.map(Into::into),
        },
    }
}
