use async_graphql::{Json, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    exam_session::AnswerMap, question::PackageSummary, AnswerKey, AnswerValue, ExamResult,
    ExamSession, Question, QuestionDetail, QuestionType, SessionStatus, SubmitReason,
};

/// A question as shown to the student: no answer key.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionView {
    pub id: String,
    pub number: i32,
    pub topic: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub question_type: QuestionType,
    pub options: Vec<String>,
}

impl QuestionView {
    pub fn new(number: usize, question: &Question) -> Self {
        QuestionView {
            id: question.id.clone(),
            number: number as i32,
            topic: question.topic_label().to_string(),
            text: question.text.clone(),
            image: question.image.clone(),
            question_type: question.question_type(),
            options: question.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SessionView {
    pub session_id: String,
    pub attempt_id: String,
    pub student_id: String,
    pub display_name: String,
    pub subject: String,
    pub package: String,
    pub status: SessionStatus,
    pub resumed: bool,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub questions: Vec<QuestionView>,
    pub answers: Json<AnswerMap>,
    pub flagged: Vec<String>,
    pub score: Option<f64>,
}

impl SessionView {
    /// `questions` must already be in presentation order.
    pub fn new(
        session: &ExamSession,
        questions: &[Question],
        resumed: bool,
        remaining_seconds: i64,
    ) -> Self {
        SessionView {
            session_id: session.id.clone(),
            attempt_id: session.attempt_id.clone(),
            student_id: session.student_id.clone(),
            display_name: session.display_name.clone(),
            subject: session.subject.clone(),
            package: session.package.clone(),
            status: session.status,
            resumed,
            started_at: session.created_at,
            deadline: session.deadline,
            remaining_seconds,
            questions: questions
                .iter()
                .enumerate()
                .map(|(i, q)| QuestionView::new(i + 1, q))
                .collect(),
            answers: Json(session.answers.clone()),
            flagged: session.flagged.iter().cloned().collect(),
            score: session.score,
        }
    }
}

/// Acknowledges an autosaved change.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AutosaveAck {
    pub session_id: String,
    pub answered_count: i32,
    pub flagged_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
    pub remaining_seconds: i64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct TopicStatDto {
    pub topic: String,
    pub correct: i32,
    pub total: i32,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionDetailDto {
    pub question_id: String,
    pub question_text: String,
    pub topic: String,
    pub question_type: QuestionType,
    pub submitted: Option<Json<AnswerValue>>,
    pub correct_answer: Json<AnswerKey>,
    pub is_correct: bool,
}

impl From<QuestionDetail> for QuestionDetailDto {
    fn from(detail: QuestionDetail) -> Self {
        QuestionDetailDto {
            question_id: detail.question_id,
            question_text: detail.question_text,
            topic: detail.topic,
            question_type: detail.question_type,
            submitted: detail.submitted.map(Json),
            correct_answer: Json(detail.correct_answer),
            is_correct: detail.is_correct,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ExamResultDto {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub display_name: String,
    pub subject: String,
    pub package: String,
    pub score: f64,
    pub correct_count: i32,
    pub scored_count: i32,
    pub reason: SubmitReason,
    pub submitted_at: DateTime<Utc>,
    pub details: Vec<QuestionDetailDto>,
    pub topic_stats: Vec<TopicStatDto>,
    pub missing_question_ids: Vec<String>,
}

impl From<ExamResult> for ExamResultDto {
    fn from(result: ExamResult) -> Self {
        ExamResultDto {
            id: result.id,
            session_id: result.session_id,
            student_id: result.student_id,
            display_name: result.display_name,
            subject: result.subject,
            package: result.package,
            score: result.score,
            correct_count: result.correct_count as i32,
            scored_count: result.scored_count as i32,
            reason: result.reason,
            submitted_at: result.submitted_at,
            details: result.details.into_iter().map(Into::into).collect(),
            topic_stats: result
                .topic_stats
                .into_iter()
                .map(|(topic, stat)| TopicStatDto {
                    topic,
                    correct: stat.correct as i32,
                    total: stat.total as i32,
                })
                .collect(),
            missing_question_ids: result.missing_question_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SubmissionResponse {
    pub session_id: String,
    /// True when the session had been finalized before this call.
    pub already_submitted: bool,
    pub score: Option<f64>,
    pub result: Option<ExamResultDto>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ResultsPage {
    pub items: Vec<ExamResultDto>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PackageDto {
    pub subject: String,
    pub package: String,
    pub question_count: i64,
}

impl From<PackageSummary> for PackageDto {
    fn from(summary: PackageSummary) -> Self {
        PackageDto {
            subject: summary.subject,
            package: summary.package,
            question_count: summary.question_count as i64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
