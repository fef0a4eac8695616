use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{PackageQuery, QuestionRequest},
        response::PackageDto,
    },
};

/// Exam packages students can pick from.
#[get("/api/exams")]
pub async fn list_packages(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let packages: Vec<PackageDto> = state
        .question_service
        .list_packages()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(packages))
}

#[get("/api/questions")]
pub async fn list_questions(
    state: web::Data<AppState>,
    query: web::Query<PackageQuery>,
) -> Result<HttpResponse, AppError> {
    let questions = state
        .question_service
        .query(&query.subject, &query.package)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[post("/api/questions")]
pub async fn create_question(
    state: web::Data<AppState>,
    request: web::Json<QuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let question = state
        .question_service
        .create_question(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(question))
}

#[put("/api/questions/{id}")]
pub async fn update_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<QuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let question = state
        .question_service
        .update_question(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/api/questions/{id}")]
pub async fn delete_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.question_service.delete_question(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
