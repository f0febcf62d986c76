//! Scripted speech host for tests
//!
//! Never touches a real engine: voice enumeration results are scripted in
//! advance and playback is recorded. Completion and error events are queued
//! explicitly, which makes the voice manager and sequencer state machines
//! fully deterministic under test.

use crate::speech::host::{SpeechEvent, SpeechHost, Ticket, Utterance, Voice};
use crate::{MinpairError, Result};
use std::collections::VecDeque;

/// Scripted speech host
pub struct FakeHost {
    /// Successive results for `voices()`; the last batch repeats once the
    /// script runs out
    batches: VecDeque<Vec<Voice>>,
    last_batch: Vec<Voice>,

    /// Every utterance submitted, in order
    pub submitted: Vec<Utterance>,

    /// Number of times `cancel` was called
    pub cancels: usize,

    /// Rate/volume applied through the trait
    pub rate: Option<u8>,
    pub volume: Option<u8>,

    /// When set, the next `speak` fails (consumed)
    pub fail_next_speak: bool,

    queued: VecDeque<SpeechEvent>,
    speaking: bool,
    next_ticket: u64,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::with_voice_batches(vec![Vec::new()])
    }

    /// Host whose `voices()` calls yield the given batches in order
    pub fn with_voice_batches(batches: Vec<Vec<Voice>>) -> Self {
        Self {
            batches: batches.into(),
            last_batch: Vec::new(),
            submitted: Vec::new(),
            cancels: 0,
            rate: None,
            volume: None,
            fail_next_speak: false,
            queued: VecDeque::new(),
            speaking: false,
            next_ticket: 0,
        }
    }

    /// Ticket of the most recent submission
    pub fn last_ticket(&self) -> Ticket {
        Ticket(self.next_ticket)
    }

    /// Queue a completion event for the given utterance
    pub fn finish(&mut self, ticket: Ticket) {
        self.speaking = false;
        self.queued.push_back(SpeechEvent::Finished(ticket));
    }

    /// Queue a playback error for the given utterance
    pub fn error(&mut self, ticket: Ticket, reason: &str) {
        self.speaking = false;
        self.queued
            .push_back(SpeechEvent::Errored(ticket, reason.to_string()));
    }

    /// Queue a host voices-changed notification
    pub fn voices_changed(&mut self) {
        self.queued.push_back(SpeechEvent::VoicesChanged);
    }

    /// Texts of the submitted utterances, for assertions
    pub fn spoken_texts(&self) -> Vec<&str> {
        self.submitted.iter().map(|u| u.text.as_str()).collect()
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechHost for FakeHost {
    fn voices(&mut self) -> Result<Vec<Voice>> {
        if let Some(batch) = self.batches.pop_front() {
            self.last_batch = batch;
        }
        Ok(self.last_batch.clone())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<Ticket> {
        if self.fail_next_speak {
            self.fail_next_speak = false;
            return Err(MinpairError::Speech("scripted speak failure".to_string()));
        }
        self.submitted.push(utterance.clone());
        self.speaking = true;
        self.next_ticket += 1;
        Ok(Ticket(self.next_ticket))
    }

    fn cancel(&mut self) -> Result<()> {
        self.cancels += 1;
        self.speaking = false;
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }

    fn drain_events(&mut self) -> Vec<SpeechEvent> {
        self.queued.drain(..).collect()
    }

    fn set_rate(&mut self, rate: u8) -> Result<()> {
        self.rate = Some(rate);
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.volume = Some(volume);
        Ok(())
    }
}
