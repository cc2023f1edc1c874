//! HTTP client for the studymate tutoring backend.
//!
//! Two pieces live here:
//!
//! - [`TutorClient`]: a typed `reqwest` wrapper over the backend's REST API
//!   (auth, chat, study-material generation, answer evaluation, progress).
//! - [`SessionUpdateQueue`]: the delivery queue that serializes
//!   performance-update writes to the backend, one in flight at a time, in
//!   submission order, with best-effort retry semantics.

pub mod client;
pub mod queue;

pub use client::{TutorApiError, TutorClient};
pub use queue::{
    DeliveryError, InvalidUpdate, MockTransport, QueueConfig, SessionUpdateQueue, UpdateTransport,
};
