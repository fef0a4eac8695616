pub mod exam_result;
pub mod exam_session;
pub mod question;
pub use exam_result::{ExamResult, QuestionDetail, SubmitReason, TopicStat};
pub use exam_session::{ExamSession, ExamSessionDocument, SessionKey, SessionStatus, SessionUpdate};
pub use question::{AnswerKey, AnswerValue, Question, QuestionType};
