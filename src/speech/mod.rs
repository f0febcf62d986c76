//! Speech subsystem
//!
//! Host abstraction, voice discovery, and utterance sequencing.

pub mod backends;
pub mod host;
pub mod sequencer;
pub mod voices;

pub use host::{SpeechEvent, SpeechHost, Ticket, Utterance, Voice};
pub use sequencer::Sequencer;
pub use voices::{DiscoveryState, VoiceManager};
