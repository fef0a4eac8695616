use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::ExamResult,
};

const DUPLICATE_KEY: i32 = 11000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    /// Appends a result. A second result for the same attempt is rejected with
    /// `AlreadyExists`.
    async fn append(&self, result: ExamResult) -> AppResult<ExamResult>;
    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<ExamResult>>;
    async fn find_by_attempt(&self, attempt_id: &str) -> AppResult<Option<ExamResult>>;
    /// Newest first, with the total number of stored results.
    async fn list_recent(&self, offset: i64, limit: i64) -> AppResult<(Vec<ExamResult>, i64)>;
}

pub struct MongoExamResultRepository {
    collection: Collection<ExamResult>,
}

impl MongoExamResultRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for results collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let attempt_index = IndexModel::builder()
            .keys(doc! { "attempt_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_id_unique".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "submitted_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("student_submitted".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(attempt_index).await?;
        self.collection.create_index(student_index).await?;

        log::info!("Successfully created indexes for results collection");
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl ExamResultRepository for MongoExamResultRepository {
    async fn append(&self, result: ExamResult) -> AppResult<ExamResult> {
        match self.collection.insert_one(&result).await {
            Ok(_) => Ok(result),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Result for attempt '{}' already recorded",
                result.attempt_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<ExamResult>> {
        let results = self
            .collection
            .find(doc! { "student_id": student_id })
            .sort(doc! { "submitted_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(results)
    }

    async fn find_by_attempt(&self, attempt_id: &str) -> AppResult<Option<ExamResult>> {
        let result = self
            .collection
            .find_one(doc! { "attempt_id": attempt_id })
            .await?;
        Ok(result)
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> AppResult<(Vec<ExamResult>, i64)> {
        let total = self.collection.count_documents(doc! {}).await?;

        let results = self
            .collection
            .find(doc! {})
            .skip(offset.max(0) as u64)
            .limit(limit)
            .sort(doc! { "submitted_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((results, total as i64))
    }
}
