use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::dto::{request::PageQuery, response::{ExamResultDto, ResultsPage}},
    repositories::ExamResultRepository,
};

/// Read side of the results log.
pub struct ResultService {
    repository: Arc<dyn ExamResultRepository>,
    page_limit: i64,
}

impl ResultService {
    pub fn new(repository: Arc<dyn ExamResultRepository>, page_limit: i64) -> Self {
        Self {
            repository,
            page_limit,
        }
    }

    /// Every finalized attempt of one student, newest first.
    pub async fn for_student(&self, student_id: &str) -> AppResult<Vec<ExamResultDto>> {
        let results = self.repository.find_by_student(student_id).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    pub async fn recent(&self, page: &PageQuery) -> AppResult<ResultsPage> {
        let (offset, limit) = page.window(self.page_limit);
        let (items, total) = self.repository.list_recent(offset, limit).await?;

        Ok(ResultsPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
            offset,
            limit,
        })
    }
}
