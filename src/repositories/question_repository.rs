use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{document::ValueAccessError, doc, Bson, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{question::PackageSummary, Question},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn query(&self, subject: &str, package: &str) -> AppResult<Vec<Question>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>>;
    async fn list_packages(&self) -> AppResult<Vec<PackageSummary>>;
    async fn create(&self, question: Question) -> AppResult<Question>;
    async fn update(&self, question: Question) -> AppResult<Question>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let partition_index = IndexModel::builder()
            .keys(doc! { "subject": 1, "package": 1 })
            .options(
                IndexOptions::builder()
                    .name("subject_package".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(partition_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }
}

fn package_from_group(group: &Document) -> AppResult<PackageSummary> {
    let malformed =
        |e: ValueAccessError| AppError::InternalError(format!("Malformed package group: {}", e));
    let key = group.get_document("_id").map_err(malformed)?;
    let question_count = match group.get("count") {
        Some(Bson::Int32(n)) => *n as u64,
        Some(Bson::Int64(n)) => *n as u64,
        _ => 0,
    };
    Ok(PackageSummary {
        subject: key.get_str("subject").map_err(malformed)?.to_string(),
        package: key.get_str("package").map_err(malformed)?.to_string(),
        question_count,
    })
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn query(&self, subject: &str, package: &str) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "subject": subject, "package": package })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let questions = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn list_packages(&self) -> AppResult<Vec<PackageSummary>> {
        let pipeline = vec![
            doc! { "$group": {
                "_id": { "subject": "$subject", "package": "$package" },
                "count": { "$sum": 1 }
            } },
            doc! { "$sort": { "_id.subject": 1, "_id.package": 1 } },
        ];

        let groups: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        groups.iter().map(package_from_group).collect()
    }

    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let result = self
            .collection
            .replace_one(doc! { "id": &question.id }, &question)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id
            )));
        }

        Ok(question)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
