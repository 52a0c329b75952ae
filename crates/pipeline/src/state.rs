//! Shared agent speaking flag

use parking_lot::Mutex;

/// Whether the agent is currently playing audio
///
/// Shared between the classifier and the playback side via `Arc`.
#[derive(Debug, Default)]
pub struct AgentSpeakingState {
    speaking: Mutex<bool>,
}

impl AgentSpeakingState {
    pub fn new(speaking: bool) -> Self {
        Self {
            speaking: Mutex::new(speaking),
        }
    }

    pub fn set_speaking(&self, speaking: bool) {
        *self.speaking.lock() = speaking;
    }

    pub fn is_speaking(&self) -> bool {
        *self.speaking.lock()
    }
}
