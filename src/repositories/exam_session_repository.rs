use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{
        exam_session::{encode_answers, encode_flags},
        ExamSession, ExamSessionDocument, SessionUpdate,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamSessionRepository: Send + Sync {
    async fn find(&self, session_id: &str) -> AppResult<Option<ExamSession>>;

    /// Full overwrite of the record stored under the session's id.
    async fn set(&self, session: ExamSession) -> AppResult<ExamSession>;

    /// Applies `update` only if the stored record is the given attempt and still
    /// ongoing. Returns whether a record matched.
    async fn update(
        &self,
        session_id: &str,
        attempt_id: &str,
        update: SessionUpdate,
    ) -> AppResult<bool>;
}

pub struct MongoExamSessionRepository {
    collection: Collection<ExamSessionDocument>,
}

impl MongoExamSessionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exam_sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(student_index).await?;

        log::info!("Successfully created indexes for exam_sessions collection");
        Ok(())
    }
}

#[async_trait]
impl ExamSessionRepository for MongoExamSessionRepository {
    async fn find(&self, session_id: &str) -> AppResult<Option<ExamSession>> {
        let document = self.collection.find_one(doc! { "id": session_id }).await?;
        Ok(document.map(ExamSession::from))
    }

    async fn set(&self, session: ExamSession) -> AppResult<ExamSession> {
        let document = ExamSessionDocument::from(&session);
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "id": &session.id }, &document)
            .with_options(options)
            .await?;

        Ok(session)
    }

    async fn update(
        &self,
        session_id: &str,
        attempt_id: &str,
        update: SessionUpdate,
    ) -> AppResult<bool> {
        let filter = doc! {
            "id": session_id,
            "attempt_id": attempt_id,
            "status": "ongoing",
        };

        let changes = match update {
            SessionUpdate::Progress { answers, flagged } => doc! {
                "$set": {
                    "answers": encode_answers(&answers),
                    "flagged": encode_flags(&flagged),
                }
            },
            SessionUpdate::Complete {
                score,
                completed_at,
            } => doc! {
                "$set": {
                    "status": "completed",
                    "score": score,
                    "completed_at": to_bson(&completed_at)?,
                }
            },
        };

        let result = self.collection.update_one(filter, changes).await?;
        Ok(result.matched_count > 0)
    }
}
