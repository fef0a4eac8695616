use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{RecordAnswerRequest, SaveProgressRequest, StartExamRequest},
};

#[post("/api/exams/start")]
pub async fn start_exam(
    state: web::Data<AppState>,
    request: web::Json<StartExamRequest>,
) -> Result<HttpResponse, AppError> {
    let view = state.exam_service.start_exam(request.into_inner()).await?;
    if view.resumed {
        Ok(HttpResponse::Ok().json(view))
    } else {
        Ok(HttpResponse::Created().json(view))
    }
}

#[get("/api/sessions/{session_id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.exam_service.get_session(&session_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[put("/api/sessions/{session_id}/answers/{question_id}")]
pub async fn record_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<RecordAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let (session_id, question_id) = path.into_inner();
    let ack = state
        .exam_service
        .record_answer(&session_id, &question_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[post("/api/sessions/{session_id}/flags/{question_id}")]
pub async fn toggle_flag(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (session_id, question_id) = path.into_inner();
    let ack = state
        .exam_service
        .toggle_flag(&session_id, &question_id)
        .await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[put("/api/sessions/{session_id}/progress")]
pub async fn save_progress(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    request: web::Json<SaveProgressRequest>,
) -> Result<HttpResponse, AppError> {
    let ack = state
        .exam_service
        .save_progress(&session_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[post("/api/sessions/{session_id}/submit")]
pub async fn submit_exam(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let response = state.exam_service.submit(&session_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
