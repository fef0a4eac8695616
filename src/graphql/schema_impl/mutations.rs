use async_graphql::{Context, ErrorExtensions, Json, Object, Result};

use crate::{
    app_state::AppState,
    models::{
        domain::AnswerValue,
        dto::{
            request::{RecordAnswerRequest, StartExamRequest},
            response::{AutosaveAck, SessionView, SubmissionResponse},
        },
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Starts a new attempt or resumes the live one for the same student and package.
    async fn start_exam(
        &self,
        ctx: &Context<'_>,
        input: StartExamRequest,
    ) -> Result<SessionView> {
        let state = ctx.data::<AppState>()?;
        state
            .exam_service
            .start_exam(input)
            .await
            .map_err(|e| e.extend())
    }

    /// `value` is a string, a list of strings or a statement-to-label object.
    async fn record_answer(
        &self,
        ctx: &Context<'_>,
        session_id: String,
        question_id: String,
        value: Json<AnswerValue>,
    ) -> Result<AutosaveAck> {
        let state = ctx.data::<AppState>()?;
        state
            .exam_service
            .record_answer(
                &session_id,
                &question_id,
                RecordAnswerRequest { value: value.0 },
            )
            .await
            .map_err(|e| e.extend())
    }

    async fn toggle_flag(
        &self,
        ctx: &Context<'_>,
        session_id: String,
        question_id: String,
    ) -> Result<AutosaveAck> {
        let state = ctx.data::<AppState>()?;
        state
            .exam_service
            .toggle_flag(&session_id, &question_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn submit_exam(
        &self,
        ctx: &Context<'_>,
        session_id: String,
    ) -> Result<SubmissionResponse> {
        let state = ctx.data::<AppState>()?;
        state
            .exam_service
            .submit(&session_id)
            .await
            .map_err(|e| e.extend())
    }
}
