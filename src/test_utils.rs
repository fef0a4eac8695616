#[cfg(test)]
pub mod fixtures {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::{DateTime, TimeZone, Utc};

    use crate::models::domain::{AnswerKey, Question};

    pub const SUBJECT: &str = "Matematika";
    pub const PACKAGE: &str = "Paket 1";

    /// Fixed instant used as "now" across engine tests.
    pub fn exam_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
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

    /// "2 + 2 = ?" with key "4".
    pub fn single_question(id: &str, topic: &str) -> Question {
        question(
            id,
            topic,
            "2 + 2 = ?",
            &["3", "4", "5", "6"],
            AnswerKey::Single("4".to_string()),
        )
    }

    /// Even numbers below five, key {"2","4"}.
    pub fn complex_question(id: &str, topic: &str) -> Question {
        question(
            id,
            topic,
            "Pilih bilangan genap yang kurang dari 5",
            &["2", "4", "6", "8"],
            AnswerKey::Complex(BTreeSet::from(["2".to_string(), "4".to_string()])),
        )
    }

    /// Two statements, A is Benar and B is Salah.
    pub fn category_question(id: &str, topic: &str) -> Question {
        question(
            id,
            topic,
            "Tentukan benar atau salah",
            &["Statement A", "Statement B"],
            AnswerKey::Category(BTreeMap::from([
                ("Statement A".to_string(), "Benar".to_string()),
                ("Statement B".to_string(), "Salah".to_string()),
            ])),
        )
    }

    /// One question of each type, each under its own topic.
    pub fn mixed_question_bank() -> Vec<Question> {
        vec![
            single_question("q-1", "Bilangan"),
            complex_question("q-2", "Aljabar"),
            category_question("q-3", "Logika"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::QuestionType;

    #[test]
    fn test_fixtures_cover_every_question_type() {
        let bank = mixed_question_bank();
        let types: Vec<QuestionType> = bank.iter().map(|q| q.question_type()).collect();

        assert_eq!(
            types,
            vec![QuestionType::Single, QuestionType::Complex, QuestionType::Category]
        );
    }

    #[test]
    fn test_fixture_keys_are_consistent_with_options() {
        for question in mixed_question_bank() {
            assert!(question.answer_key.check_against(&question.options).is_ok());
        }
    }
}
