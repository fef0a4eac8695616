pub mod answer_tracker;
pub mod clock;
pub mod exam_service;
pub mod exam_timer;
pub mod question_service;
pub mod result_service;
pub mod scoring_service;
pub mod session_service;
pub mod shuffler;
