use std::collections::{BTreeMap, BTreeSet};

use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::AnswerValue;

pub type AnswerMap = BTreeMap<String, AnswerValue>;
pub type FlagSet = BTreeSet<String>;

/// Composite identity of a session: one student, one subject, one package.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub student_id: String,
    pub subject: String,
    pub package: String,
}

impl SessionKey {
    pub fn new(student_id: &str, subject: &str, package: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            subject: subject.to_string(),
            package: package.to_string(),
        }
    }

    /// Deterministic session id. Parts are NUL-separated so that no choice of
    /// names can make two different keys collide.
    pub fn session_id(&self) -> String {
        let raw = format!("{}\0{}\0{}", self.student_id, self.subject, self.package);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()).to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Ongoing,
    Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExamSession {
    pub id: String,
    pub attempt_id: String,
    pub student_id: String,
    pub display_name: String,
    pub subject: String,
    pub package: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub question_order: Vec<String>,
    pub answers: AnswerMap,
    pub flagged: FlagSet,
    pub status: SessionStatus,
    pub score: Option<f64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExamSession {
    pub fn start(
        key: &SessionKey,
        display_name: &str,
        question_order: Vec<String>,
        created_at: DateTime<Utc>,
        duration: chrono::Duration,
    ) -> Self {
        ExamSession {
            id: key.session_id(),
            attempt_id: Uuid::new_v4().to_string(),
            student_id: key.student_id.clone(),
            display_name: display_name.to_string(),
            subject: key.subject.clone(),
            package: key.package.clone(),
            created_at,
            deadline: created_at + duration,
            question_order,
            answers: AnswerMap::new(),
            flagged: FlagSet::new(),
            status: SessionStatus::Ongoing,
            score: None,
            completed_at: None,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == SessionStatus::Ongoing
    }

    pub fn contains_question(&self, question_id: &str) -> bool {
        self.question_order.iter().any(|id| id == question_id)
    }
}

/// Partial write applied to a stored session of a given attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    Progress { answers: AnswerMap, flagged: FlagSet },
    Complete { score: f64, completed_at: DateTime<Utc> },
}

/// Stored shape of a session. Answers and flags are kept as JSON text inside
/// an otherwise flat document.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExamSessionDocument {
    pub id: String,
    pub attempt_id: String,
    pub student_id: String,
    pub display_name: String,
    pub subject: String,
    pub package: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub question_order: Vec<String>,
    pub answers: String,
    pub flagged: String,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

pub fn encode_answers(answers: &AnswerMap) -> String {
    serde_json::to_string(answers).unwrap_or_else(|_| "{}".to_string())
}

pub fn encode_flags(flagged: &FlagSet) -> String {
    serde_json::to_string(flagged).unwrap_or_else(|_| "[]".to_string())
}

/// Undecodable answer text yields an empty map rather than an error.
pub fn decode_answers(session_id: &str, raw: &str) -> AnswerMap {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("Discarding undecodable answers of session {}: {}", session_id, e);
        AnswerMap::new()
    })
}

/// Undecodable flag text yields an empty set rather than an error.
pub fn decode_flags(session_id: &str, raw: &str) -> FlagSet {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("Discarding undecodable flags of session {}: {}", session_id, e);
        FlagSet::new()
    })
}

impl From<&ExamSession> for ExamSessionDocument {
    fn from(session: &ExamSession) -> Self {
        ExamSessionDocument {
            id: session.id.clone(),
            attempt_id: session.attempt_id.clone(),
            student_id: session.student_id.clone(),
            display_name: session.display_name.clone(),
            subject: session.subject.clone(),
            package: session.package.clone(),
            created_at: session.created_at,
            deadline: session.deadline,
            question_order: session.question_order.clone(),
            answers: encode_answers(&session.answers),
            flagged: encode_flags(&session.flagged),
            status: session.status,
            score: session.score,
            completed_at: session.completed_at,
        }
    }
}

impl From<ExamSessionDocument> for ExamSession {
    fn from(doc: ExamSessionDocument) -> Self {
        let answers = decode_answers(&doc.id, &doc.answers);
        let flagged = decode_flags(&doc.id, &doc.flagged);
        ExamSession {
            id: doc.id,
            attempt_id: doc.attempt_id,
            student_id: doc.student_id,
            display_name: doc.display_name,
            subject: doc.subject,
            package: doc.package,
            created_at: doc.created_at,
            deadline: doc.deadline,
            question_order: doc.question_order,
            answers,
            flagged,
            status: doc.status,
            score: doc.score,
            completed_at: doc.completed_at,
        }
    }
}
