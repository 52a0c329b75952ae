//! Core traits and types for transcript interrupt classification
//!
//! This crate provides foundational types used across all other crates:
//! - Decision and reason codes produced by the classifier
//! - Transcript events arriving from the speech recognizer
//! - Trace records describing each decision
//! - Frame processor traits for channel-based pipelines
//! - Error types

pub mod decision;
pub mod error;
pub mod trace;
pub mod transcript;
pub mod traits;

pub use decision::{Decision, ReasonCode};
pub use error::{Error, Result};
pub use trace::TraceRecord;
pub use transcript::{Metadata, TranscriptEvent};

// Trait re-exports
pub use traits::{ControlFrame, Frame, FrameProcessor, ProcessorContext};
