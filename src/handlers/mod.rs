pub mod exam_handler;
pub mod graphql_handler;
pub mod health_handler;
pub mod question_handler;
pub mod result_handler;

use actix_web::web;

pub use exam_handler::{
    get_session, record_answer, save_progress, start_exam, submit_exam, toggle_flag,
};
pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_ready};
pub use question_handler::{
    create_question, delete_question, list_packages, list_questions, update_question,
};
pub use result_handler::{list_results, student_results};

/// Registers every route of the exam API. The GraphQL routes expect the
/// schema to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(list_packages)
        .service(start_exam)
        .service(get_session)
        .service(record_answer)
        .service(toggle_flag)
        .service(save_progress)
        .service(submit_exam)
        .service(list_results)
        .service(student_results)
        .service(list_questions)
        .service(create_question)
        .service(update_question)
        .service(delete_question)
        .service(web::resource("/graphql").route(web::post().to(graphql)))
        .service(web::resource("/graphiql").route(web::get().to(graphiql)));
}
