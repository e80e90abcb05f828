//! Session lifecycle and admission control
//!
//! This module provides:
//! - `SessionRecord`: rolling transcript and activity timestamps for one client
//! - `AdmissionController`: hard capacity ceiling with a FIFO waiting queue
//! - Lazy garbage collection of expired sessions and stale queue entries

mod admission;
mod config;
mod session;
mod stats;

pub use admission::{Admission, AdmissionController, AdmissionError};
pub use config::SessionConfig;
pub use session::{SessionRecord, TranscriptEntry};
pub use stats::{ControllerStats, SessionStats};
