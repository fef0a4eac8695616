use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::domain::{
    AnswerKey, AnswerValue, ExamSession, Question, QuestionDetail, TopicStat,
};

/// Outcome of scoring one session.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreReport {
    /// correct / scored * 100, unrounded.
    pub final_score: f64,
    pub correct: u32,
    pub scored: u32,
    pub details: Vec<QuestionDetail>,
    pub topic_stats: BTreeMap<String, TopicStat>,
    /// Ids in the session order that no longer exist in the question bank.
    pub missing: Vec<String>,
}

pub struct ScoringService;

impl ScoringService {
    /// Scores every question of the session in presentation order.
    ///
    /// Questions that cannot be found in `questions` are left out of the
    /// denominator and reported in `missing`.
    pub fn score(session: &ExamSession, questions: &[Question]) -> ScoreReport {
        let question_map: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();

        let mut correct: u32 = 0;
        let mut details = Vec::with_capacity(session.question_order.len());
        let mut topic_stats: BTreeMap<String, TopicStat> = BTreeMap::new();
        let mut missing = Vec::new();

        for question_id in &session.question_order {
            let Some(question) = question_map.get(question_id.as_str()) else {
                log::warn!(
                    "Question {} of session {} is gone, leaving it out of the score",
                    question_id,
                    session.id
                );
                missing.push(question_id.clone());
                continue;
            };

            let submitted = session.answers.get(question_id);
            let is_correct = Self::is_correct(&question.answer_key, submitted);
            if is_correct {
                correct += 1;
            }

            let stat = topic_stats
                .entry(question.topic_label().to_string())
                .or_default();
            stat.total += 1;
            if is_correct {
                stat.correct += 1;
            }

            details.push(QuestionDetail {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                topic: question.topic_label().to_string(),
                question_type: question.question_type(),
                submitted: submitted.cloned(),
                correct_answer: question.answer_key.clone(),
                is_correct,
            });
        }

        let scored = details.len() as u32;

        ScoreReport {
            final_score: Self::percentage(correct, scored),
            correct,
            scored,
            details,
            topic_stats,
            missing,
        }
    }

    /// Whole-question correctness; there is no partial credit.
    pub fn is_correct(key: &AnswerKey, submitted: Option<&AnswerValue>) -> bool {
        let Some(submitted) = submitted else {
            return false;
        };

        match (key, submitted) {
            (AnswerKey::Single(expected), AnswerValue::Choice(choice)) => choice == expected,
            (AnswerKey::Complex(expected), AnswerValue::Choices(choices)) => {
                if choices.is_empty() {
                    return false;
                }
                let chosen: BTreeSet<&String> = choices.iter().collect();
                chosen == expected.iter().collect::<BTreeSet<&String>>()
            }
            (AnswerKey::Category(expected), AnswerValue::Labels(labels)) => labels == expected,
            // Shape does not match the question type.
            _ => false,
        }
    }

    pub fn percentage(correct: u32, scored: u32) -> f64 {
        if scored == 0 {
            return 0.0;
        }
        (correct as f64 / scored as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{QuestionType, SessionKey},
        test_utils::fixtures::{exam_morning, mixed_question_bank},
    };

    fn choices(values: &[&str]) -> AnswerValue {
        AnswerValue::Choices(values.iter().map(|v| v.to_string()).collect())
    }

    fn labels(pairs: &[(&str, &str)]) -> AnswerValue {
        AnswerValue::Labels(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn session_over(ids: &[&str]) -> ExamSession {
        ExamSession::start(
            &SessionKey::new("siswa01", "Matematika", "Paket 1"),
            "Siti",
            ids.iter().map(|id| id.to_string()).collect(),
            exam_morning(),
            chrono::Duration::minutes(75),
        )
    }

    #[test]
    fn single_requires_exact_case_sensitive_match() {
        let key = AnswerKey::Single("Jakarta".into());

        assert!(ScoringService::is_correct(
            &key,
            Some(&AnswerValue::Choice("Jakarta".into()))
        ));
        assert!(!ScoringService::is_correct(
            &key,
            Some(&AnswerValue::Choice("jakarta".into()))
        ));
        assert!(!ScoringService::is_correct(&key, None));
    }

    #[test]
    fn complex_requires_exact_set() {
        let key = AnswerKey::Complex(BTreeSet::from(["2".to_string(), "4".to_string()]));

        assert!(ScoringService::is_correct(&key, Some(&choices(&["2", "4"]))));
        assert!(ScoringService::is_correct(&key, Some(&choices(&["4", "2"]))));
        assert!(!ScoringService::is_correct(&key, Some(&choices(&["2", "4", "6"]))));
        assert!(!ScoringService::is_correct(&key, Some(&choices(&["2"]))));
        assert!(!ScoringService::is_correct(&key, Some(&choices(&[]))));
        assert!(!ScoringService::is_correct(&key, None));
    }

    #[test]
    fn category_requires_every_label_to_match() {
        let key = AnswerKey::Category(BTreeMap::from([
            ("Statement A".to_string(), "Benar".to_string()),
            ("Statement B".to_string(), "Salah".to_string()),
        ]));

        assert!(ScoringService::is_correct(
            &key,
            Some(&labels(&[("Statement A", "Benar"), ("Statement B", "Salah")]))
        ));
        assert!(!ScoringService::is_correct(
            &key,
            Some(&labels(&[("Statement A", "Benar"), ("Statement B", "Benar")]))
        ));
        assert!(!ScoringService::is_correct(
            &key,
            Some(&labels(&[("Statement A", "Benar")]))
        ));
    }

    #[test]
    fn mismatched_shape_is_wrong() {
        let key = AnswerKey::Single("4".into());
        assert!(!ScoringService::is_correct(&key, Some(&choices(&["4"]))));
    }

    #[test]
    fn score_is_unrounded_fraction_of_scored_questions() {
        let mut session = session_over(&["q-2", "q-3", "q-1"]);
        session
            .answers
            .insert("q-1".into(), AnswerValue::Choice("4".into()));
        session.answers.insert("q-2".into(), choices(&["2", "4", "6"]));

        let report = ScoringService::score(&session, &mixed_question_bank());

        assert_eq!(report.correct, 1);
        assert_eq!(report.scored, 3);
        assert_eq!(report.final_score, (1.0 / 3.0) * 100.0);
        assert_eq!(
            report.details.iter().map(|d| d.question_id.as_str()).collect::<Vec<_>>(),
            vec!["q-2", "q-3", "q-1"]
        );
    }

    #[test]
    fn topic_stats_count_every_scored_question() {
        let mut bank = mixed_question_bank();
        bank[1].topic = "Bilangan".into();
        bank[2].topic = String::new();

        let mut session = session_over(&["q-1", "q-2", "q-3"]);
        session
            .answers
            .insert("q-1".into(), AnswerValue::Choice("4".into()));

        let report = ScoringService::score(&session, &bank);

        assert_eq!(report.topic_stats["Bilangan"], TopicStat { correct: 1, total: 2 });
        assert_eq!(report.topic_stats["General"], TopicStat { correct: 0, total: 1 });
    }

    #[test]
    fn missing_questions_shrink_the_denominator() {
        let mut session = session_over(&["q-1", "q-gone", "q-2"]);
        session
            .answers
            .insert("q-1".into(), AnswerValue::Choice("4".into()));
        session.answers.insert("q-2".into(), choices(&["2", "4"]));

        let report = ScoringService::score(&session, &mixed_question_bank());

        assert_eq!(report.scored, 2);
        assert_eq!(report.final_score, 100.0);
        assert_eq!(report.missing, vec!["q-gone"]);
        assert!(report
            .details
            .iter()
            .all(|d| d.question_type != QuestionType::Category));
    }

    #[test]
    fn empty_bank_scores_zero() {
        let session = session_over(&["q-gone"]);
        let report = ScoringService::score(&session, &[]);

        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.scored, 0);
    }

    #[test]
    fn flags_do_not_change_the_score() {
        let mut session = session_over(&["q-1", "q-2", "q-3"]);
        session
            .answers
            .insert("q-1".into(), AnswerValue::Choice("4".into()));
        let unflagged = ScoringService::score(&session, &mixed_question_bank());

        session.flagged.insert("q-1".into());
        session.flagged.insert("q-2".into());
        let flagged = ScoringService::score(&session, &mixed_question_bank());

        assert_eq!(unflagged, flagged);
    }
}
