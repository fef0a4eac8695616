use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{question::PackageSummary, Question},
        dto::request::QuestionRequest,
    },
    repositories::QuestionRepository,
    services::clock::Clock,
};

/// Question bank administration.
pub struct QuestionService {
    repository: Arc<dyn QuestionRepository>,
    clock: Clock,
}

impl QuestionService {
    pub fn new(repository: Arc<dyn QuestionRepository>, clock: Clock) -> Self {
        Self { repository, clock }
    }

    pub async fn list_packages(&self) -> AppResult<Vec<PackageSummary>> {
        self.repository.list_packages().await
    }

    pub async fn query(&self, subject: &str, package: &str) -> AppResult<Vec<Question>> {
        self.repository.query(subject, package).await
    }

    pub async fn get_question(&self, id: &str) -> AppResult<Question> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    pub async fn create_question(&self, request: QuestionRequest) -> AppResult<Question> {
        let question = request.into_question(None, self.clock.now())?;

        if self.repository.find_by_id(&question.id).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already exists",
                question.id
            )));
        }

        let question = self.repository.create(question).await?;
        log::info!(
            "Created question {} in {} / {}",
            question.id,
            question.subject,
            question.package
        );
        Ok(question)
    }

    /// Replaces a question. Ongoing sessions see the new key when they are scored.
    pub async fn update_question(&self, id: &str, request: QuestionRequest) -> AppResult<Question> {
        let existing = self.get_question(id).await?;

        let mut question = request.into_question(Some(id.to_string()), self.clock.now())?;
        question.created_at = existing.created_at;

        self.repository.update(question).await
    }

    pub async fn delete_question(&self, id: &str) -> AppResult<()> {
        self.repository.delete(id).await?;
        log::info!("Deleted question {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        models::domain::QuestionType,
        repositories::question_repository::MockQuestionRepository,
        test_utils::fixtures::{exam_morning, single_question},
    };

    fn request(key: serde_json::Value) -> QuestionRequest {
        QuestionRequest {
            id: Some("q-9".into()),
            subject: "Matematika".into(),
            package: "Paket 1".into(),
            topic: Some("Bilangan".into()),
            text: "3 + 3 = ?".into(),
            image: None,
            question_type: QuestionType::Single,
            options: vec!["5".into(), "6".into()],
            answer_key: key,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_ids() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(single_question(id, "Bilangan"))));
        repo.expect_create().never();

        let service = QuestionService::new(Arc::new(repo), Clock::manual(exam_morning()));
        let err = service.create_question(request(json!("6"))).await;

        assert!(matches!(err, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn create_rejects_invalid_key_before_touching_the_store() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_id().never();
        repo.expect_create().never();

        let service = QuestionService::new(Arc::new(repo), Clock::manual(exam_morning()));
        let err = service.create_question(request(json!("7"))).await;

        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn update_keeps_creation_time() {
        let mut repo = MockQuestionRepository::new();
        repo.expect_find_by_id().returning(|id| {
            let mut question = single_question(id, "Bilangan");
            question.created_at = Some(exam_morning() - chrono::Duration::days(3));
            Ok(Some(question))
        });
        repo.expect_update().times(1).returning(|q| Ok(q));

        let service = QuestionService::new(Arc::new(repo), Clock::manual(exam_morning()));
        let updated = service
            .update_question("q-1", request(json!("6")))
            .await
            .unwrap();

        assert_eq!(updated.id, "q-1");
        assert_eq!(
            updated.created_at,
            Some(exam_morning() - chrono::Duration::days(3))
        );
        assert_eq!(updated.modified_at, Some(exam_morning()));
    }
}
