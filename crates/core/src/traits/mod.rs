//! Core traits for the interrupt classifier
//!
//! Pipeline:
//!   - FrameProcessor: Process frames flowing between the recognizer,
//!     the classifier and the playback controller

mod pipeline;

pub use pipeline::{ControlFrame, Frame, FrameProcessor, ProcessorContext};
