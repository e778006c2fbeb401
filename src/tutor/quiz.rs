//! Multi-turn multiple-choice quiz engine.
//!
//! One session per user at a time, owned exclusively by the engine's session
//! table. A session exists in the table iff it still has questions left;
//! answering the last question removes it and returns a score summary.
//! Starting a new session while one is active overwrites the old one.

use std::collections::HashSet;

use dashmap::DashMap;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::tutor::core::errors::{TutorError, TutorResult};
use crate::tutor::core::record::VocabRecord;

/// Options per question.
pub const OPTION_COUNT: usize = 4;

/// Minimum distinct candidate records needed to start a session: one correct
/// word plus three distractors, across a full question set.
pub const MIN_POOL: usize = 5;

/// Hard cap on questions per session.
const MAX_QUESTIONS: usize = 5;

/// One rendered question.
#[derive(Clone, Debug)]
pub struct QuizQuestion {
    /// Gloss shown to the learner as the prompt.
    pub prompt_zh: String,
    /// The word the gloss belongs to.
    pub correct_word: String,
    /// Exactly [`OPTION_COUNT`] distinct labels containing `correct_word`
    /// exactly once; the correct index is implied by position.
    pub options: Vec<String>,
}

/// A question paired with its position for display.
#[derive(Clone, Debug)]
pub struct NumberedQuestion {
    /// 1-based question number.
    pub number: usize,
    /// Total questions in the session.
    pub total: usize,
    /// The question itself.
    pub question: QuizQuestion,
}

/// Terminal score summary returned when a session completes.
#[derive(Clone, Copy, Debug)]
pub struct QuizSummary {
    /// Correct submissions.
    pub correct: usize,
    /// Total questions asked.
    pub total: usize,
}

impl QuizSummary {
    /// Score as a whole-number percentage.
    #[must_use]
    pub const fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.correct * 100 / self.total
        }
    }
}

/// What follows a valid submission: the next question or the final summary.
#[derive(Clone, Debug)]
pub enum QuizStep {
    /// More questions remain.
    Next(NumberedQuestion),
    /// The session just completed and was removed from the table.
    Finished(QuizSummary),
}

/// Grading detail for one submitted answer.
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
    /// Whether the chosen option was the correct word.
    pub correct: bool,
    /// The option label the user picked.
    pub chosen: String,
    /// The correct word for the question that was just graded.
    pub answer_word: String,
    /// The gloss that was asked.
    pub prompt_zh: String,
    /// All options that were shown, in display order.
    pub options: Vec<String>,
    /// What comes next.
    pub step: QuizStep,
}

struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    correct: usize,
}

/// Per-user quiz session engine.
///
/// The session table is the only state shared across concurrent message
/// handlers; `DashMap` serializes read-modify-write access per key.
pub struct QuizEngine {
    sessions: DashMap<String, QuizSession>,
    question_count: usize,
}

impl QuizEngine {
    /// Create an engine that asks `question_count` questions per session,
    /// capped at 5.
    #[must_use]
    pub fn new(question_count: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            question_count: question_count.clamp(1, MAX_QUESTIONS),
        }
    }

    /// Whether `user_key` has a session in the table.
    #[must_use]
    pub fn has_active_session(&self, user_key: &str) -> bool {
        self.sessions.contains_key(user_key)
    }

    /// Drop any active session for `user_key`. Returns whether one existed.
    pub fn abandon_session(&self, user_key: &str) -> bool {
        self.sessions.remove(user_key).is_some()
    }

    /// Build a question set from the candidate pool and start a session,
    /// overwriting any session the user already had.
    ///
    /// # Errors
    /// Returns [`TutorError::InsufficientPool`] when the pool holds fewer than
    /// [`MIN_POOL`] records with distinct words.
    pub fn start_session(
        &self,
        user_key: &str,
        candidate_pool: &[VocabRecord],
    ) -> TutorResult<NumberedQuestion> {
        let mut pool = dedupe_by_word(candidate_pool);
        if pool.len() < MIN_POOL {
            return Err(TutorError::InsufficientPool {
                have: pool.len(),
                need: MIN_POOL,
            });
        }

        let mut rng = thread_rng();
        pool.shuffle(&mut rng);

        let count = self.question_count.min(pool.len());
        let mut questions = Vec::with_capacity(count);
        for target in pool.iter().take(count) {
            let mut distractors: Vec<&VocabRecord> =
                pool.iter().filter(|r| r.word != target.word).collect();
            distractors.shuffle(&mut rng);

            let mut options: Vec<String> = distractors
                .iter()
                .take(OPTION_COUNT - 1)
                .map(|r| r.word.clone())
                .collect();
            options.push(target.word.clone());
            options.shuffle(&mut rng);

            questions.push(QuizQuestion {
                prompt_zh: target.zh.clone(),
                correct_word: target.word.clone(),
                options,
            });
        }

        let first = NumberedQuestion {
            number: 1,
            total: questions.len(),
            // Invariant: count >= 1, so questions is non-empty.
            question: questions[0].clone(),
        };

        // Last write wins; no merge or queuing semantics.
        self.sessions.insert(
            user_key.to_string(),
            QuizSession {
                questions,
                current: 0,
                correct: 0,
            },
        );

        Ok(first)
    }

    /// Grade an answer for the user's current question and advance the
    /// session.
    ///
    /// # Errors
    /// Returns [`TutorError::NoActiveSession`] when the user has no session,
    /// or [`TutorError::InvalidAnswer`] when the input does not map to one of
    /// the option positions; session state is unchanged in both cases.
    pub fn submit_answer(&self, user_key: &str, answer: &str) -> TutorResult<AnswerOutcome> {
        let Some(mut entry) = self.sessions.get_mut(user_key) else {
            return Err(TutorError::NoActiveSession);
        };

        let index = parse_answer(answer)?;

        let session = entry.value_mut();
        // A completed session can still be observed between its final guard
        // drop and the remove below; treat it the same as no session.
        let Some(question) = session.questions.get(session.current).cloned() else {
            drop(entry);
            self.sessions.remove(user_key);
            return Err(TutorError::NoActiveSession);
        };
        let chosen = question.options.get(index).cloned().unwrap_or_default();

        let correct = chosen == question.correct_word;
        if correct {
            session.correct += 1;
        }
        session.current += 1;

        let finished = session.current == session.questions.len();
        let step = if finished {
            QuizStep::Finished(QuizSummary {
                correct: session.correct,
                total: session.questions.len(),
            })
        } else {
            QuizStep::Next(NumberedQuestion {
                number: session.current + 1,
                total: session.questions.len(),
                question: session.questions[session.current].clone(),
            })
        };

        // Release the table entry before removing it to avoid re-entry on the
        // same shard.
        drop(entry);
        if finished {
            self.sessions.remove(user_key);
        }

        Ok(AnswerOutcome {
            correct,
            chosen,
            answer_word: question.correct_word,
            prompt_zh: question.prompt_zh,
            options: question.options,
            step,
        })
    }
}

/// Map `A`-`D` (case-insensitive) or `1`-`4` to an option index.
fn parse_answer(answer: &str) -> TutorResult<usize> {
    let trimmed = answer.trim();
    let mut chars = trimmed.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Err(TutorError::InvalidAnswer(answer.to_string()));
    };

    let index = match ch.to_ascii_lowercase() {
        'a' => 0,
        'b' => 1,
        'c' => 2,
        'd' => 3,
        '1'..='4' => (ch as usize) - ('1' as usize),
        _ => return Err(TutorError::InvalidAnswer(answer.to_string())),
    };
    Ok(index)
}

/// Keep the first record for each distinct word, case-insensitively, so a
/// question can never show two identical option labels.
fn dedupe_by_word(pool: &[VocabRecord]) -> Vec<VocabRecord> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|r| !r.word.trim().is_empty())
        .filter(|r| seen.insert(r.word.trim().to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    fn record(word: &str, zh: &str) -> VocabRecord {
        VocabRecord {
            theme: "travel".to_string(),
            word: word.to_string(),
            pos: "n.".to_string(),
            zh: zh.to_string(),
            example: String::new(),
            example_zh: String::new(),
            cefr: "B1".to_string(),
        }
    }

    fn pool(words: &[&str]) -> Vec<VocabRecord> {
        words.iter().map(|w| record(w, &format!("{w}-gloss"))).collect()
    }

    fn correct_position(question: &QuizQuestion) -> usize {
        question
            .options
            .iter()
            .position(|o| o == &question.correct_word)
            .unwrap_or(usize::MAX)
    }

    fn letter_for(index: usize) -> &'static str {
        ["a", "b", "c", "d"].get(index).copied().unwrap_or("a")
    }

    #[test]
    fn five_record_pool_builds_five_well_formed_questions() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "two", "three", "four", "five"]);
        let first = match engine.start_session("u1", &candidates) {
            Ok(q) => q,
            Err(err) => panic!("start failed: {err}"),
        };
        assert_eq!(first.total, 5);
        assert_eq!(first.number, 1);

        // Walk the whole session, checking every question on the way.
        let mut current = first.question;
        for turn in 0..5 {
            assert_eq!(current.options.len(), OPTION_COUNT);
            let distinct: HashSet<&String> = current.options.iter().collect();
            assert_eq!(distinct.len(), OPTION_COUNT);
            assert_eq!(
                current
                    .options
                    .iter()
                    .filter(|o| **o == current.correct_word)
                    .count(),
                1
            );

            let position = correct_position(&current);
            let outcome = match engine.submit_answer("u1", letter_for(position)) {
                Ok(o) => o,
                Err(err) => panic!("answer {turn} failed: {err}"),
            };
            assert!(outcome.correct);
            match outcome.step {
                QuizStep::Next(next) => current = next.question,
                QuizStep::Finished(summary) => {
                    assert_eq!(summary.correct, 5);
                    assert_eq!(summary.total, 5);
                    assert_eq!(summary.percent(), 100);
                    assert_eq!(turn, 4);
                    break;
                }
            }
        }

        assert!(!engine.has_active_session("u1"));
    }

    #[test]
    fn score_counts_only_correct_submissions() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["alpha", "beta", "gamma", "delta", "epsilon"]);
        let first = engine
            .start_session("u2", &candidates)
            .map(|q| q.question)
            .unwrap_or_else(|_| panic!("start failed"));

        // Answer the first question wrong on purpose, the rest right.
        let wrong = (correct_position(&first) + 1) % OPTION_COUNT;
        let mut outcome = match engine.submit_answer("u2", letter_for(wrong)) {
            Ok(o) => o,
            Err(err) => panic!("answer failed: {err}"),
        };
        assert!(!outcome.correct);
        assert_eq!(outcome.answer_word, first.correct_word);

        loop {
            match outcome.step {
                QuizStep::Next(next) => {
                    let position = correct_position(&next.question);
                    outcome = match engine.submit_answer("u2", letter_for(position)) {
                        Ok(o) => o,
                        Err(err) => panic!("answer failed: {err}"),
                    };
                }
                QuizStep::Finished(summary) => {
                    assert_eq!(summary.correct, 4);
                    assert_eq!(summary.total, 5);
                    assert_eq!(summary.percent(), 80);
                    break;
                }
            }
        }
    }

    #[test]
    fn digits_are_accepted_as_answers() {
        let engine = QuizEngine::new(1);
        let candidates = pool(&["a1", "a2", "a3", "a4", "a5"]);
        let first = engine
            .start_session("u3", &candidates)
            .map(|q| q.question)
            .unwrap_or_else(|_| panic!("start failed"));
        let digit = (correct_position(&first) + 1).to_string();
        let outcome = engine.submit_answer("u3", &digit);
        assert!(outcome.is_ok_and(|o| o.correct));
    }

    #[test]
    fn small_pool_is_rejected_without_creating_a_session() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "two", "three", "four"]);
        assert!(matches!(
            engine.start_session("u4", &candidates),
            Err(TutorError::InsufficientPool { have: 4, need: 5 })
        ));
        assert!(!engine.has_active_session("u4"));
    }

    #[test]
    fn duplicate_words_are_deduplicated_before_counting() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "ONE", "one ", "two", "three", "four"]);
        assert!(matches!(
            engine.start_session("u5", &candidates),
            Err(TutorError::InsufficientPool { have: 4, .. })
        ));
    }

    #[test]
    fn answer_without_session_is_an_error() {
        let engine = QuizEngine::new(5);
        assert!(matches!(
            engine.submit_answer("nobody", "a"),
            Err(TutorError::NoActiveSession)
        ));
    }

    #[test]
    fn malformed_answers_leave_the_session_untouched() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "two", "three", "four", "five"]);
        let first = engine
            .start_session("u6", &candidates)
            .unwrap_or_else(|_| panic!("start failed"));

        for bad in ["e", "5", "ab", "", "yes"] {
            assert!(matches!(
                engine.submit_answer("u6", bad),
                Err(TutorError::InvalidAnswer(_))
            ));
        }

        // Still on question 1 after all the bad input.
        let outcome = match engine.submit_answer("u6", "A") {
            Ok(o) => o,
            Err(err) => panic!("valid answer rejected: {err}"),
        };
        assert_eq!(outcome.answer_word, first.question.correct_word);
        assert!(matches!(outcome.step, QuizStep::Next(next) if next.number == 2));
    }

    #[test]
    fn exhausted_session_left_in_the_table_reads_as_no_session() {
        let engine = QuizEngine::new(5);
        // Plant a session that already answered its last question, as another
        // handler could observe it right before removal.
        engine.sessions.insert(
            "u9".to_string(),
            QuizSession {
                questions: vec![QuizQuestion {
                    prompt_zh: "one-gloss".to_string(),
                    correct_word: "one".to_string(),
                    options: vec![
                        "one".to_string(),
                        "two".to_string(),
                        "three".to_string(),
                        "four".to_string(),
                    ],
                }],
                current: 1,
                correct: 1,
            },
        );

        assert!(matches!(
            engine.submit_answer("u9", "a"),
            Err(TutorError::NoActiveSession)
        ));
        assert!(!engine.has_active_session("u9"));
    }

    #[test]
    fn restarting_overwrites_the_previous_session() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "two", "three", "four", "five", "six"]);
        assert!(engine.start_session("u7", &candidates).is_ok());
        assert!(engine.start_session("u7", &candidates).is_ok());
        assert!(engine.has_active_session("u7"));

        // The fresh session starts back at question 1 of 5.
        let outcome = engine.submit_answer("u7", "a");
        assert!(outcome.is_ok_and(
            |o| matches!(o.step, QuizStep::Next(next) if next.number == 2 && next.total == 5)
        ));
    }

    #[test]
    fn abandon_removes_the_session() {
        let engine = QuizEngine::new(5);
        let candidates = pool(&["one", "two", "three", "four", "five"]);
        assert!(engine.start_session("u8", &candidates).is_ok());
        assert!(engine.abandon_session("u8"));
        assert!(!engine.has_active_session("u8"));
        assert!(!engine.abandon_session("u8"));
    }
}
