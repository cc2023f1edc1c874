//! Shared API types for the studymate tutoring backend.
//!
//! This crate provides the wire-format definitions used across the client,
//! core, and CLI crates so every crate serializes backend JSON the same way.
//! All response types tolerate missing fields (`#[serde(default)]`) because
//! the backend evolves independently of installed clients.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Lenient numeric deserialization
// ---------------------------------------------------------------------------
//
// Performance counters arrive from the UI layer as loosely-typed JSON: a
// count may be a number, a numeric string ("42"), or absent entirely.
// Anything that does not parse as a non-negative number coerces to zero so
// the payload sent to the backend always carries real numbers.

fn coerce_u64(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_f64(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n >= 0.0 {
        n
    } else {
        0.0
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(coerce_u64(&v))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(coerce_f64(&v))
}

// ---------------------------------------------------------------------------
// Performance update (the queue payload)
// ---------------------------------------------------------------------------

/// Which study mode produced a performance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Flashcard,
    Quiz,
}

/// Aggregate counters for one study session.
///
/// Counters deserialize leniently: numeric strings parse, anything invalid
/// or missing becomes zero. Serialization always emits plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cards_studied: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub correct_answers: u64,
    /// Time spent in seconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time_spent: f64,
}

/// Per-item result within a study session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardResult {
    #[serde(default)]
    pub card_id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub attempts: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub correct: u64,
}

/// A study-session outcome to be persisted server-side.
///
/// This is the exact JSON body POSTed to `/v1/progress/performance`.
/// `user_id` is required; the update queue rejects records without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceUpdate {
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    #[serde(default)]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub session_data: SessionData,
    /// Optional batch of additional session records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionData>>,
    #[serde(default)]
    pub cards: Vec<CardResult>,
}

impl PerformanceUpdate {
    /// Build an update from loosely-typed JSON, coercing all counters to
    /// numbers (missing or non-numeric values become zero).
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// True when the required user identifier is present.
    pub fn has_user_id(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Subjects and topics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Topic {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Subject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Tutor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn tutor(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tutor,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatReply {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tutor: Option<String>,
    #[serde(default)]
    pub suggested_topics: Vec<String>,
}

// ---------------------------------------------------------------------------
// Study material
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Flashcard {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlashcardSet {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Index into `choices`; absent for free-text questions.
    #[serde(default)]
    pub correct_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Quiz {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// Backend verdict on a submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationResult {
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicProgress {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub cards_studied: u64,
    #[serde(default)]
    pub correct_answers: u64,
    #[serde(default)]
    pub time_spent_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProgressReport {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_time_secs: f64,
    #[serde(default)]
    pub topics: Vec<TopicProgress>,
}

// ---------------------------------------------------------------------------
// Auth (interface contract only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_data_coerces_numeric_strings() {
        let update = PerformanceUpdate::from_json(json!({
            "userId": "u1",
            "sessionData": {"cardsStudied": 5, "correctAnswers": 3, "timeSpent": "42"},
        }))
        .unwrap();

        assert_eq!(update.session_data.cards_studied, 5);
        assert_eq!(update.session_data.correct_answers, 3);
        assert!((update.session_data.time_spent - 42.0).abs() < f64::EPSILON);

        // Transmitted payload carries a real number, not a string.
        let wire = serde_json::to_value(&update).unwrap();
        assert_eq!(wire["sessionData"]["timeSpent"], json!(42.0));
    }

    #[test]
    fn session_data_defaults_missing_and_invalid_to_zero() {
        let update = PerformanceUpdate::from_json(json!({
            "userId": "u1",
            "sessionData": {"cardsStudied": "not a number"},
        }))
        .unwrap();

        assert_eq!(update.session_data.cards_studied, 0);
        assert_eq!(update.session_data.correct_answers, 0);
        assert_eq!(update.session_data.time_spent, 0.0);
    }

    #[test]
    fn negative_counters_clamp_to_zero() {
        let update = PerformanceUpdate::from_json(json!({
            "userId": "u1",
            "sessionData": {"cardsStudied": -3, "timeSpent": -1.5},
        }))
        .unwrap();

        assert_eq!(update.session_data.cards_studied, 0);
        assert_eq!(update.session_data.time_spent, 0.0);
    }

    #[test]
    fn batched_sessions_coerce_each_entry() {
        let update = PerformanceUpdate::from_json(json!({
            "userId": "u1",
            "sessions": [
                {"cardsStudied": "7", "correctAnswers": 7, "timeSpent": 10},
                {"timeSpent": "bogus"},
            ],
        }))
        .unwrap();

        let sessions = update.sessions.unwrap();
        assert_eq!(sessions[0].cards_studied, 7);
        assert_eq!(sessions[1].time_spent, 0.0);
    }

    #[test]
    fn activity_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActivityType::Flashcard).unwrap(),
            "\"flashcard\""
        );
        assert_eq!(serde_json::to_string(&ActivityType::Quiz).unwrap(), "\"quiz\"");
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let update = PerformanceUpdate {
            user_id: "u1".into(),
            topic: Some("algebra".into()),
            activity_type: ActivityType::Quiz,
            ..Default::default()
        };
        let wire = serde_json::to_value(&update).unwrap();
        assert_eq!(wire["userId"], "u1");
        assert_eq!(wire["activityType"], "quiz");
        assert!(wire.get("sessionData").is_some());
        // Absent optional fields are omitted entirely.
        assert!(wire.get("subtopic").is_none());
    }

    #[test]
    fn has_user_id_rejects_blank() {
        let mut update = PerformanceUpdate::default();
        assert!(!update.has_user_id());
        update.user_id = "   ".into();
        assert!(!update.has_user_id());
        update.user_id = "u1".into();
        assert!(update.has_user_id());
    }
}
