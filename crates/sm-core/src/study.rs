//! Study-session state machines.
//!
//! A session wraps one round of flashcards or one quiz, records per-item
//! attempts while the user works through it, and emits a
//! [`PerformanceUpdate`] when finished. The update is what gets handed to
//! the session-update queue; nothing here talks to the network.

use std::time::Instant;

use sm_api_types::{
    ActivityType, CardResult, EvaluationResult, FlashcardSet, PerformanceUpdate, Quiz, SessionData,
};

#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error("no user id — log in or set [user] id before studying")]
    MissingUserId,
    #[error("unknown card `{0}`")]
    UnknownCard(String),
    #[error("unknown question `{0}`")]
    UnknownQuestion(String),
    #[error("question `{0}` has no answer choices to pick from")]
    NotMultipleChoice(String),
}

/// Per-item attempt counters. `correct` can never exceed `attempts`.
#[derive(Debug, Clone)]
struct ItemState {
    id: String,
    prompt: String,
    answer: String,
    attempts: u64,
    correct: u64,
}

impl ItemState {
    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }
}

fn build_update(
    user_id: String,
    tutor: Option<String>,
    topic: Option<String>,
    subtopic: Option<String>,
    activity_type: ActivityType,
    started: Instant,
    items: &[ItemState],
) -> PerformanceUpdate {
    let attempted: Vec<&ItemState> = items.iter().filter(|i| i.attempts > 0).collect();
    let cards_studied = attempted.len() as u64;
    let correct_answers = attempted.iter().filter(|i| i.correct > 0).count() as u64;

    PerformanceUpdate {
        user_id,
        tutor,
        topic,
        subtopic,
        activity_type,
        session_data: SessionData {
            cards_studied,
            correct_answers,
            time_spent: started.elapsed().as_secs_f64(),
        },
        sessions: None,
        cards: attempted
            .iter()
            .map(|i| CardResult {
                card_id: i.id.clone(),
                prompt: i.prompt.clone(),
                answer: i.answer.clone(),
                attempts: i.attempts,
                correct: i.correct,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// FlashcardSession
// ---------------------------------------------------------------------------

/// One pass through a set of flashcards.
pub struct FlashcardSession {
    user_id: String,
    topic: Option<String>,
    tutor: Option<String>,
    started: Instant,
    items: Vec<ItemState>,
}

impl FlashcardSession {
    /// Begin a session over `set` for `user_id`.
    pub fn start(user_id: impl Into<String>, set: &FlashcardSet) -> Result<Self, StudyError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(StudyError::MissingUserId);
        }
        Ok(Self {
            user_id,
            topic: (!set.topic.is_empty()).then(|| set.topic.clone()),
            tutor: (!set.subject.is_empty()).then(|| set.subject.clone()),
            started: Instant::now(),
            items: set
                .cards
                .iter()
                .map(|c| ItemState {
                    id: c.id.clone(),
                    prompt: c.front.clone(),
                    answer: c.back.clone(),
                    attempts: 0,
                    correct: 0,
                })
                .collect(),
        })
    }

    /// Record one self-graded attempt on a card.
    pub fn record(&mut self, card_id: &str, correct: bool) -> Result<(), StudyError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == card_id)
            .ok_or_else(|| StudyError::UnknownCard(card_id.to_string()))?;
        item.record(correct);
        Ok(())
    }

    /// Number of cards not yet attempted.
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| i.attempts == 0).count()
    }

    /// Finish the session and produce the performance update to persist.
    pub fn finish(self) -> PerformanceUpdate {
        build_update(
            self.user_id,
            self.tutor,
            self.topic,
            None,
            ActivityType::Flashcard,
            self.started,
            &self.items,
        )
    }
}

// ---------------------------------------------------------------------------
// QuizSession
// ---------------------------------------------------------------------------

/// One pass through a quiz. Multiple-choice questions are scored locally
/// against `correct_index`; free-text questions take the backend's
/// [`EvaluationResult`] verdict instead.
pub struct QuizSession {
    user_id: String,
    topic: Option<String>,
    tutor: Option<String>,
    started: Instant,
    items: Vec<ItemState>,
    correct_indices: Vec<Option<usize>>,
    choice_lists: Vec<Vec<String>>,
}

impl QuizSession {
    pub fn start(user_id: impl Into<String>, quiz: &Quiz) -> Result<Self, StudyError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(StudyError::MissingUserId);
        }
        Ok(Self {
            user_id,
            topic: (!quiz.topic.is_empty()).then(|| quiz.topic.clone()),
            tutor: (!quiz.subject.is_empty()).then(|| quiz.subject.clone()),
            started: Instant::now(),
            items: quiz
                .questions
                .iter()
                .map(|q| ItemState {
                    id: q.id.clone(),
                    prompt: q.question.clone(),
                    answer: q
                        .correct_index
                        .and_then(|i| q.choices.get(i).cloned())
                        .unwrap_or_default(),
                    attempts: 0,
                    correct: 0,
                })
                .collect(),
            correct_indices: quiz.questions.iter().map(|q| q.correct_index).collect(),
            choice_lists: quiz.questions.iter().map(|q| q.choices.clone()).collect(),
        })
    }

    fn position(&self, question_id: &str) -> Result<usize, StudyError> {
        self.items
            .iter()
            .position(|i| i.id == question_id)
            .ok_or_else(|| StudyError::UnknownQuestion(question_id.to_string()))
    }

    /// Answer a multiple-choice question; returns whether the choice was
    /// correct. Out-of-range choices count as incorrect attempts.
    pub fn answer_choice(&mut self, question_id: &str, choice: usize) -> Result<bool, StudyError> {
        let pos = self.position(question_id)?;
        let Some(expected) = self.correct_indices[pos] else {
            return Err(StudyError::NotMultipleChoice(question_id.to_string()));
        };
        let correct = choice == expected && choice < self.choice_lists[pos].len();
        self.items[pos].record(correct);
        Ok(correct)
    }

    /// Record the backend's verdict for a free-text answer.
    pub fn record_evaluation(
        &mut self,
        question_id: &str,
        result: &EvaluationResult,
    ) -> Result<(), StudyError> {
        let pos = self.position(question_id)?;
        self.items[pos].record(result.correct);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| i.attempts == 0).count()
    }

    pub fn finish(self) -> PerformanceUpdate {
        build_update(
            self.user_id,
            self.tutor,
            self.topic,
            None,
            ActivityType::Quiz,
            self.started,
            &self.items,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
