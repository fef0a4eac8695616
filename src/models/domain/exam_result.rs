use std::collections::BTreeMap;

use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{
    exam_session::ExamSession,
    question::{AnswerKey, AnswerValue, QuestionType},
};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SubmitReason {
    Manual,  // Student pressed "finish"
    Expired, // Deadline passed
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopicStat {
    pub correct: u32,
    pub total: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionDetail {
    pub question_id: String,
    pub question_text: String,
    pub topic: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub submitted: Option<AnswerValue>,
    pub correct_answer: AnswerKey,
    pub is_correct: bool,
}

/// Immutable record of one finalized attempt.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamResult {
    pub id: String,
    pub attempt_id: String,
    pub session_id: String,
    pub student_id: String,
    pub display_name: String,
    pub subject: String,
    pub package: String,
    pub score: f64,
    pub correct_count: u32,
    pub scored_count: u32,
    pub reason: SubmitReason,
    pub details: Vec<QuestionDetail>,
    pub topic_stats: BTreeMap<String, TopicStat>,
    #[serde(default)]
    pub missing_question_ids: Vec<String>,
    /// Stored as epoch milliseconds so the store orders it numerically.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub submitted_at: DateTime<Utc>,
}

impl ExamResult {
    pub fn for_session(
        session: &ExamSession,
        report: crate::services::scoring_service::ScoreReport,
        reason: SubmitReason,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        ExamResult {
            id: Uuid::new_v4().to_string(),
            attempt_id: session.attempt_id.clone(),
            session_id: session.id.clone(),
            student_id: session.student_id.clone(),
            display_name: session.display_name.clone(),
            subject: session.subject.clone(),
            package: session.package.clone(),
            score: report.final_score,
            correct_count: report.correct,
            scored_count: report.scored,
            reason,
            details: report.details,
            topic_stats: report.topic_stats,
            missing_question_ids: report.missing,
            submitted_at,
        }
    }
}
