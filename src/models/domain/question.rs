use std::collections::{BTreeMap, BTreeSet};

use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC: &str = "General";

/// The two judgments a category sub-statement can receive.
pub const CATEGORY_LABELS: [&str; 2] = ["Benar", "Salah"];

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub package: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub options: Vec<String>,
    pub answer_key: AnswerKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.answer_key.question_type()
    }

    /// Topic label used for analytics; blank labels fall back to "General".
    pub fn topic_label(&self) -> &str {
        let topic = self.topic.trim();
        if topic.is_empty() {
            DEFAULT_TOPIC
        } else {
            topic
        }
    }
}

/// One (subject, package) partition of the question bank.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageSummary {
    pub subject: String,
    pub package: String,
    pub question_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Single,   // One option string
    Complex,  // Several option strings, compared as a set
    Category, // Every option judged Benar/Salah
}

/// Correct answer of a question, shaped by its type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "key", rename_all = "lowercase")]
pub enum AnswerKey {
    Single(String),
    Complex(BTreeSet<String>),
    Category(BTreeMap<String, String>),
}

impl AnswerKey {
    pub fn question_type(&self) -> QuestionType {
        match self {
            AnswerKey::Single(_) => QuestionType::Single,
            AnswerKey::Complex(_) => QuestionType::Complex,
            AnswerKey::Category(_) => QuestionType::Category,
        }
    }

    /// Builds a key from a type tag and the raw JSON key the admin supplied.
    pub fn from_parts(question_type: QuestionType, raw: serde_json::Value) -> Result<Self, String> {
        let parsed = match question_type {
            QuestionType::Single => serde_json::from_value(raw).map(AnswerKey::Single),
            QuestionType::Complex => serde_json::from_value(raw).map(AnswerKey::Complex),
            QuestionType::Category => serde_json::from_value(raw).map(AnswerKey::Category),
        };
        parsed.map_err(|e| format!("answer key does not fit a {:?} question: {}", question_type, e))
    }

    /// Checks the key against the option list it is supposed to select from.
    pub fn check_against(&self, options: &[String]) -> Result<(), String> {
        match self {
            AnswerKey::Single(choice) => {
                if !options.contains(choice) {
                    return Err(format!("key '{}' is not one of the options", choice));
                }
            }
            AnswerKey::Complex(choices) => {
                if choices.is_empty() {
                    return Err("complex key must select at least one option".to_string());
                }
                if let Some(unknown) = choices.iter().find(|c| !options.contains(c)) {
                    return Err(format!("key '{}' is not one of the options", unknown));
                }
            }
            AnswerKey::Category(labels) => {
                let statements: BTreeSet<&String> = options.iter().collect();
                let judged: BTreeSet<&String> = labels.keys().collect();
                if statements != judged {
                    return Err("category key must judge every option exactly once".to_string());
                }
                if let Some((statement, label)) = labels
                    .iter()
                    .find(|(_, label)| !CATEGORY_LABELS.contains(&label.as_str()))
                {
                    return Err(format!("label '{}' for '{}' is not Benar/Salah", label, statement));
                }
            }
        }
        Ok(())
    }
}

/// What a student submitted for one question.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(String),
    Choices(Vec<String>),
    Labels(BTreeMap<String, String>),
}

impl AnswerValue {
    pub fn fits(&self, question_type: QuestionType) -> bool {
        matches!(
            (self, question_type),
            (AnswerValue::Choice(_), QuestionType::Single)
                | (AnswerValue::Choices(_), QuestionType::Complex)
                | (AnswerValue::Labels(_), QuestionType::Category)
        )
    }

    /// Shape and vocabulary check of a submission against its question.
    pub fn check_for(&self, question: &Question) -> Result<(), String> {
        let question_type = question.question_type();
        if !self.fits(question_type) {
            return Err(format!(
                "answer shape does not match {:?} question '{}'",
                question_type, question.id
            ));
        }
        let known = |choice: &String| question.options.contains(choice);
        match self {
            AnswerValue::Choice(choice) if !known(choice) => {
                Err(format!("'{}' is not an option of '{}'", choice, question.id))
            }
            AnswerValue::Choices(choices) => match choices.iter().find(|c| !known(c)) {
                Some(unknown) => Err(format!("'{}' is not an option of '{}'", unknown, question.id)),
                None => Ok(()),
            },
            AnswerValue::Labels(labels) => {
                for (statement, label) in labels {
                    if !known(statement) {
                        return Err(format!(
                            "'{}' is not a statement of '{}'",
                            statement, question.id
                        ));
                    }
                    if !CATEGORY_LABELS.contains(&label.as_str()) {
                        return Err(format!("label '{}' is not Benar/Salah", label));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
