//! Core domain logic for studymate.
//!
//! Holds everything that is not wire format or transport: configuration
//! loaded from a TOML file on disk, the static subject/topic catalog, and
//! the study-session state machines that accumulate per-card results and
//! emit a [`sm_api_types::PerformanceUpdate`] when a session finishes.

pub mod catalog;
pub mod config;
pub mod settings;
pub mod study;

pub use config::{Config, ConfigError};
pub use settings::SettingsManager;
pub use study::{FlashcardSession, QuizSession, StudyError};
