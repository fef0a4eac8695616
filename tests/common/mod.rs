#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;

use tryout_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        question::PackageSummary, AnswerKey, ExamResult, ExamSession, ExamSessionDocument,
        Question, SessionStatus, SessionUpdate,
    },
    repositories::{ExamResultRepository, ExamSessionRepository, QuestionRepository},
    services::{clock::Clock, shuffler::SeededShuffler},
};

pub const SUBJECT: &str = "Matematika";
pub const PACKAGE: &str = "Paket 1";

pub fn exam_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<HashMap<String, Question>>,
}

impl InMemoryQuestionRepository {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: RwLock::new(questions.into_iter().map(|q| (q.id.clone(), q)).collect()),
        }
    }

    pub async fn remove(&self, id: &str) {
        self.questions.write().await.remove(id);
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn query(&self, subject: &str, package: &str) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions
            .values()
            .filter(|q| q.subject == subject && q.package == package)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        Ok(self.questions.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| questions.get(id).cloned()).collect())
    }

    async fn list_packages(&self) -> AppResult<Vec<PackageSummary>> {
        let questions = self.questions.read().await;
        let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        for question in questions.values() {
            *counts
                .entry((question.subject.clone(), question.package.clone()))
                .or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((subject, package), question_count)| PackageSummary {
                subject,
                package,
                question_count,
            })
            .collect())
    }

    async fn create(&self, question: Question) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        if questions.contains_key(&question.id) {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already exists",
                question.id
            )));
        }
        questions.insert(question.id.clone(), question.clone());
        Ok(question)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        if !questions.contains_key(&question.id) {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id
            )));
        }
        questions.insert(question.id.clone(), question.clone());
        Ok(question)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        match self.questions.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Question with id '{}' not found", id))),
        }
    }
}

/// Keeps sessions in their stored document form and counts writes.
#[derive(Default)]
pub struct InMemorySessionRepository {
    documents: RwLock<HashMap<String, ExamSessionDocument>>,
    writes: AtomicUsize,
    offline: AtomicBool,
}

impl InMemorySessionRepository {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every call fail as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn raw(&self, session_id: &str) -> Option<ExamSessionDocument> {
        self.documents.read().await.get(session_id).cloned()
    }

    pub async fn put_raw(&self, document: ExamSessionDocument) {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("session store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExamSessionRepository for InMemorySessionRepository {
    async fn find(&self, session_id: &str) -> AppResult<Option<ExamSession>> {
        self.check_online()?;
        let documents = self.documents.read().await;
        Ok(documents.get(session_id).cloned().map(ExamSession::from))
    }

    async fn set(&self, session: ExamSession) -> AppResult<ExamSession> {
        self.check_online()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.documents
            .write()
            .await
            .insert(session.id.clone(), ExamSessionDocument::from(&session));
        Ok(session)
    }

    async fn update(
        &self,
        session_id: &str,
        attempt_id: &str,
        update: SessionUpdate,
    ) -> AppResult<bool> {
        self.check_online()?;
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(session_id) else {
            return Ok(false);
        };
        if document.attempt_id != attempt_id || document.status != SessionStatus::Ongoing {
            return Ok(false);
        }

        let mut session = ExamSession::from(document.clone());
        match update {
            SessionUpdate::Progress { answers, flagged } => {
                session.answers = answers;
                session.flagged = flagged;
            }
            SessionUpdate::Complete {
                score,
                completed_at,
            } => {
                session.status = SessionStatus::Completed;
                session.score = Some(score);
                session.completed_at = Some(completed_at);
            }
        }
        *document = ExamSessionDocument::from(&session);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryResultRepository {
    results: RwLock<Vec<ExamResult>>,
}

impl InMemoryResultRepository {
    pub async fn all(&self) -> Vec<ExamResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl ExamResultRepository for InMemoryResultRepository {
    async fn append(&self, result: ExamResult) -> AppResult<ExamResult> {
        let mut results = self.results.write().await;
        if results.iter().any(|r| r.attempt_id == result.attempt_id) {
            return Err(AppError::AlreadyExists(format!(
                "Result for attempt '{}' already exists",
                result.attempt_id
            )));
        }
        results.push(result.clone());
        Ok(result)
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<ExamResult>> {
        let results = self.results.read().await;
        let mut items: Vec<ExamResult> = results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(items)
    }

    async fn find_by_attempt(&self, attempt_id: &str) -> AppResult<Option<ExamResult>> {
        let results = self.results.read().await;
        Ok(results.iter().find(|r| r.attempt_id == attempt_id).cloned())
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> AppResult<(Vec<ExamResult>, i64)> {
        let mut items = self.results.read().await.clone();
        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }
}

fn question(id: &str, topic: &str, text: &str, options: &[&str], key: AnswerKey) -> Question {
    Question {
        id: id.to_string(),
        subject: SUBJECT.to_string(),
        package: PACKAGE.to_string(),
        topic: topic.to_string(),
        text: text.to_string(),
        image: None,
        options: options.iter().map(|o| o.to_string()).collect(),
        answer_key: key,
        created_at: Some(exam_morning()),
        modified_at: None,
    }
}

/// Q1 single (key "4"), Q2 complex (key {"2","4"}), Q3 category (A Benar, B Salah).
pub fn mixed_bank() -> Vec<Question> {
    vec![
        question(
            "q-1",
            "Bilangan",
            "2 + 2 = ?",
            &["3", "4", "5", "6"],
            AnswerKey::Single("4".into()),
        ),
        question(
            "q-2",
            "Aljabar",
            "Pilih bilangan genap yang kurang dari 5",
            &["2", "4", "6", "8"],
            AnswerKey::Complex(BTreeSet::from(["2".to_string(), "4".to_string()])),
        ),
        question(
            "q-3",
            "Logika",
            "Tentukan benar atau salah",
            &["Statement A", "Statement B"],
            AnswerKey::Category(BTreeMap::from([
                ("Statement A".to_string(), "Benar".to_string()),
                ("Statement B".to_string(), "Salah".to_string()),
            ])),
        ),
    ]
}

/// `count` single-choice questions with key "4", ids `b-00`, `b-01`, ...
pub fn single_bank(count: usize) -> Vec<Question> {
    (0..count)
        .map(|i| {
            question(
                &format!("b-{:02}", i),
                "Bilangan",
                "2 + 2 = ?",
                &["3", "4", "5", "6"],
                AnswerKey::Single("4".into()),
            )
        })
        .collect()
}

/// An application wired to in-memory stores and a manual clock.
pub struct TestEngine {
    pub state: AppState,
    pub clock: Clock,
    pub questions: Arc<InMemoryQuestionRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub results: Arc<InMemoryResultRepository>,
}

impl TestEngine {
    pub fn new(bank: Vec<Question>) -> Self {
        Self::with_config(bank, Config::test_config())
    }

    pub fn with_config(bank: Vec<Question>, config: Config) -> Self {
        let clock = Clock::manual(exam_morning());
        let questions = Arc::new(InMemoryQuestionRepository::with_questions(bank));
        let sessions = Arc::new(InMemorySessionRepository::default());
        let results = Arc::new(InMemoryResultRepository::default());

        let state = AppState::with_repositories(
            config,
            questions.clone(),
            sessions.clone(),
            results.clone(),
            Arc::new(SeededShuffler::new(42)),
            clock.clone(),
        );

        Self {
            state,
            clock,
            questions,
            sessions,
            results,
        }
    }
}
