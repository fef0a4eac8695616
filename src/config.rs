use std::env;

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub questions_collection: String,
    pub sessions_collection: String,
    pub results_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub exam_duration_minutes: i64,
    /// Maximum number of questions served per exam, `None` for the whole package.
    pub exam_question_limit: Option<usize>,
    pub results_page_limit: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "tryout-local".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "questions".to_string()),
            sessions_collection: env::var("SESSIONS_COLLECTION")
                .unwrap_or_else(|_| "exam_sessions".to_string()),
            results_collection: env::var("RESULTS_COLLECTION")
                .unwrap_or_else(|_| "results".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            exam_duration_minutes: env::var("EXAM_DURATION_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(75),
            exam_question_limit: match env::var("EXAM_QUESTION_LIMIT")
                .ok()
                .and_then(|n| n.parse::<usize>().ok())
            {
                Some(0) => None,
                Some(n) => Some(n),
                None => Some(30),
            },
            results_page_limit: env::var("RESULTS_PAGE_LIMIT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(100),
        }
    }

    pub fn exam_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.exam_duration_minutes)
    }

    /// Rejects settings the exam engine cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.exam_duration_minutes <= 0 {
            return Err(AppError::ValidationError(format!(
                "EXAM_DURATION_MINUTES must be positive, got {}",
                self.exam_duration_minutes
            )));
        }
        if self.results_page_limit <= 0 {
            return Err(AppError::ValidationError(format!(
                "RESULTS_PAGE_LIMIT must be positive, got {}",
                self.results_page_limit
            )));
        }
        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
            mongo_db_name: "tryout-test".to_string(),
            questions_collection: "questions".to_string(),
            sessions_collection: "exam_sessions".to_string(),
            results_collection: "results".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            exam_duration_minutes: 75,
            exam_question_limit: Some(30),
            results_page_limit: 100,
        }
    }
}
