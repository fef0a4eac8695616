use async_graphql::InputObject;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        exam_session::{AnswerMap, FlagSet},
        question::DEFAULT_TOPIC,
        AnswerKey, AnswerValue, Question, QuestionType,
    },
};

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct StartExamRequest {
    #[validate(length(min = 1, max = 64))]
    pub student_id: String,

    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 100))]
    pub package: String,
}

impl StartExamRequest {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.student_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordAnswerRequest {
    pub value: AnswerValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveProgressRequest {
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub flagged: FlagSet,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Clamps the requested window to `[0, max_limit]`.
    pub fn window(&self, max_limit: i64) -> (i64, i64) {
        let offset = self.offset.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(max_limit).clamp(1, max_limit);
        (offset, limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageQuery {
    pub subject: String,
    pub package: String,
}

/// Admin input for creating or replacing a question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 100))]
    pub package: String,

    #[validate(length(max = 100))]
    pub topic: Option<String>,

    #[validate(length(min = 1))]
    pub text: String,

    pub image: Option<String>,

    pub question_type: QuestionType,

    #[validate(length(min = 1, max = 20))]
    pub options: Vec<String>,

    pub answer_key: serde_json::Value,
}

impl QuestionRequest {
    /// Validates the request and turns it into a question with the given id.
    pub fn into_question(self, id: Option<String>, now: DateTime<Utc>) -> AppResult<Question> {
        self.validate()?;

        let answer_key = AnswerKey::from_parts(self.question_type, self.answer_key)
            .map_err(AppError::ValidationError)?;
        answer_key
            .check_against(&self.options)
            .map_err(AppError::ValidationError)?;

        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        Ok(Question {
            id: id
                .or(self.id)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            subject: self.subject,
            package: self.package,
            topic,
            text: self.text,
            image: self.image,
            options: self.options,
            answer_key,
            created_at: Some(now),
            modified_at: Some(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(question_type: QuestionType, key: serde_json::Value) -> QuestionRequest {
        QuestionRequest {
            id: None,
            subject: "Matematika".to_string(),
            package: "Paket 1".to_string(),
            topic: None,
            text: "Pilih bilangan genap".to_string(),
            image: None,
            question_type,
            options: vec!["2".into(), "3".into(), "4".into()],
            answer_key: key,
        }
    }

    #[test]
    fn start_request_validation() {
        let valid = StartExamRequest {
            student_id: "siswa01".to_string(),
            display_name: None,
            subject: "Matematika".to_string(),
            package: "Paket 1".to_string(),
        };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.display_name(), "siswa01");

        let invalid = StartExamRequest {
            student_id: String::new(),
            ..valid
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn question_request_builds_typed_key_and_default_topic() {
        let question = request(QuestionType::Complex, json!(["2", "4"]))
            .into_question(None, Utc::now())
            .expect("request should convert");

        assert_eq!(question.question_type(), QuestionType::Complex);
        assert_eq!(question.topic, "General");
        assert!(!question.id.is_empty());
    }

    #[test]
    fn path_id_wins_over_body_id() {
        let mut req = request(QuestionType::Single, json!("2"));
        req.id = Some("from-body".to_string());

        let question = req
            .into_question(Some("from-path".to_string()), Utc::now())
            .unwrap();
        assert_eq!(question.id, "from-path");
    }

    #[test]
    fn question_request_rejects_key_outside_options() {
        let err = request(QuestionType::Single, json!("7")).into_question(None, Utc::now());
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn question_request_rejects_key_of_wrong_shape() {
        let err = request(QuestionType::Category, json!(["2"])).into_question(None, Utc::now());
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn page_window_is_clamped() {
        let query = PageQuery {
            offset: Some(-5),
            limit: Some(10_000),
        };
        assert_eq!(query.window(100), (0, 100));
        assert_eq!(PageQuery::default().window(50), (0, 50));
    }
}
