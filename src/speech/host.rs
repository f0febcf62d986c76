//! Host speech capability
//!
//! Everything the drill needs from the platform's speech engine: enumerate
//! voices, submit an utterance, cancel playback, and observe completion.
//! The trait keeps the voice manager and sequencer independent of the
//! concrete engine, so tests drive them with a scripted host.

use crate::Result;

/// A synthesis voice reported by the host engine
///
/// Immutable once discovered; identified by name within a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. "en-US"
    pub language: String,
}

impl Voice {
    pub fn new(name: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
        }
    }
}

/// Handle for one submitted utterance
///
/// Completion and error events carry the ticket of the utterance they refer
/// to, so stale events from superseded utterances can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(pub u64);

/// One request to render text as speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,

    /// Voice to speak with, by catalog name. None leaves the choice to the
    /// host engine.
    pub voice: Option<String>,

    /// Language tag to aim for when no voice is named
    pub language: Option<String>,
}

impl Utterance {
    /// Build an utterance for `text` with the given resolved voice, or the
    /// host default constrained to `fallback_language` when none resolved.
    pub fn new(text: &str, voice: Option<&Voice>, fallback_language: &str) -> Self {
        match voice {
            Some(v) => Self {
                text: text.to_string(),
                voice: Some(v.name.clone()),
                language: Some(v.language.clone()),
            },
            None => Self {
                text: text.to_string(),
                voice: None,
                language: Some(fallback_language.to_string()),
            },
        }
    }

    /// Near-silent utterance submitted on the first user gesture.
    ///
    /// Some engines only unlock audio output once something has been spoken
    /// from within a gesture; a single space is inaudible but counts.
    pub fn priming() -> Self {
        Self {
            text: " ".to_string(),
            voice: None,
            language: None,
        }
    }
}

/// Asynchronous notifications from the host engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The utterance finished playing
    Finished(Ticket),
    /// The utterance failed mid-playback
    Errored(Ticket, String),
    /// The host's voice set changed
    VoicesChanged,
}

/// Host speech engine interface
///
/// Single-threaded callers: events raised on engine threads are buffered
/// inside the implementation and handed out through `drain_events`, once
/// per event-loop iteration.
pub trait SpeechHost: Send {
    /// Current voice set; may legitimately be empty while the engine is
    /// still warming up.
    fn voices(&mut self) -> Result<Vec<Voice>>;

    /// Submit an utterance for asynchronous playback
    fn speak(&mut self, utterance: &Utterance) -> Result<Ticket>;

    /// Abort in-flight playback
    fn cancel(&mut self) -> Result<()>;

    /// Whether the engine is currently producing audio
    fn is_speaking(&self) -> bool;

    /// Notifications delivered since the last call
    fn drain_events(&mut self) -> Vec<SpeechEvent>;

    /// Set speech rate (0-100, where 50 is the engine's normal rate)
    fn set_rate(&mut self, rate: u8) -> Result<()>;

    /// Set speech volume (0-100)
    fn set_volume(&mut self, volume: u8) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utterance_carries_resolved_voice() {
        let voice = Voice::new("Samantha", "en-US");
        let utterance = Utterance::new("pat", Some(&voice), "en-US");
        assert_eq!(utterance.voice.as_deref(), Some("Samantha"));
        assert_eq!(utterance.language.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_utterance_falls_back_to_language_tag() {
        let utterance = Utterance::new("bat", None, "en-US");
        assert_eq!(utterance.voice, None);
        assert_eq!(utterance.language.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_priming_utterance_is_near_silent() {
        let utterance = Utterance::priming();
        assert_eq!(utterance.text, " ");
        assert_eq!(utterance.voice, None);
    }
}
