use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError, models::dto::request::PageQuery};

/// Admin view of the results log, newest first.
#[get("/api/results")]
pub async fn list_results(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = state.result_service.recent(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/results/students/{student_id}")]
pub async fn student_results(
    state: web::Data<AppState>,
    student_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let results = state.result_service.for_student(&student_id).await?;
    Ok(HttpResponse::Ok().json(results))
}
