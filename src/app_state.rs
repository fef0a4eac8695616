use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ExamResultRepository, ExamSessionRepository, MongoExamResultRepository,
        MongoExamSessionRepository, MongoQuestionRepository, QuestionRepository,
    },
    services::{
        clock::Clock,
        exam_service::ExamService,
        exam_timer::ExamTimer,
        question_service::QuestionService,
        result_service::ResultService,
        session_service::SessionService,
        shuffler::{QuestionShuffler, RandomShuffler},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub exam_service: Arc<ExamService>,
    pub question_service: Arc<QuestionService>,
    pub result_service: Arc<ResultService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let question_repository =
            Arc::new(MongoQuestionRepository::new(&db, &config.questions_collection));
        question_repository.ensure_indexes().await?;

        let session_repository =
            Arc::new(MongoExamSessionRepository::new(&db, &config.sessions_collection));
        session_repository.ensure_indexes().await?;

        let result_repository =
            Arc::new(MongoExamResultRepository::new(&db, &config.results_collection));
        result_repository.ensure_indexes().await?;

        let mut state = Self::with_repositories(
            config,
            question_repository,
            session_repository,
            result_repository,
            Arc::new(RandomShuffler),
            Clock::system(),
        );
        state.db = Some(db);
        Ok(state)
    }

    /// Wires the services over arbitrary stores. Used by `new` and by tests.
    pub fn with_repositories(
        config: Config,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn ExamSessionRepository>,
        results: Arc<dyn ExamResultRepository>,
        shuffler: Arc<dyn QuestionShuffler>,
        clock: Clock,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(
            questions.clone(),
            sessions.clone(),
            results.clone(),
            shuffler,
            ExamTimer::new(clock.clone()),
            config.exam_duration(),
            config.exam_question_limit,
        ));

        Self {
            exam_service: Arc::new(ExamService::new(session_service, questions.clone(), sessions)),
            question_service: Arc::new(QuestionService::new(questions, clock)),
            result_service: Arc::new(ResultService::new(results, config.results_page_limit)),
            db: None,
            config: Arc::new(config),
        }
    }
}
