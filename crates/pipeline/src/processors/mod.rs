//! Frame processors for the pipeline
//!
//! - InterruptGate: classifies transcripts and tracks the speaking flag
//! - ProcessorChain: per-session ordered runner over shared stages

mod chain;
mod interrupt_gate;

pub use chain::{ProcessorChain, ProcessorChainBuilder, SessionStream};
pub use interrupt_gate::InterruptGate;
