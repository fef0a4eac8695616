use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::{
    app_state::AppState,
    graphql::helpers::page_query,
    models::dto::response::{ExamResultDto, PackageDto, ResultsPage, SessionView},
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Current state of a session; finalizes it if its time has run out.
    async fn session(&self, ctx: &Context<'_>, session_id: String) -> Result<SessionView> {
        let state = ctx.data::<AppState>()?;
        state
            .exam_service
            .get_session(&session_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn student_results(
        &self,
        ctx: &Context<'_>,
        student_id: String,
    ) -> Result<Vec<ExamResultDto>> {
        let state = ctx.data::<AppState>()?;
        state
            .result_service
            .for_student(&student_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn results(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ResultsPage> {
        let state = ctx.data::<AppState>()?;
        state
            .result_service
            .recent(&page_query(offset, limit))
            .await
            .map_err(|e| e.extend())
    }

    async fn packages(&self, ctx: &Context<'_>) -> Result<Vec<PackageDto>> {
        let state = ctx.data::<AppState>()?;
        let packages = state
            .question_service
            .list_packages()
            .await
            .map_err(|e| e.extend())?;
        Ok(packages.into_iter().map(Into::into).collect())
    }
}
