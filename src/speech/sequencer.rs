//! Utterance sequencing
//!
//! Speaks a single word, or two words separated by a pause, with the
//! guarantee that at most one utterance/timer chain is ever in flight. Any
//! new request first tears down the previous chain (host cancel plus
//! deadline clear) before submitting new work, so cancellation is always
//! synchronous and total.
//!
//! The chain is an explicit state machine driven by discrete events: a
//! submit, a host completion, a deadline firing, or a preempting request.

use crate::speech::host::{SpeechEvent, SpeechHost, Ticket, Utterance, Voice};
use log::{debug, error};
use std::time::{Duration, Instant};

/// Chain progress
///
/// Tickets pin events to the utterance they belong to; an event carrying
/// any other ticket is stale and ignored.
enum Chain {
    Idle,
    SpeakingOne {
        ticket: Ticket,
    },
    SpeakingFirst {
        ticket: Ticket,
        second: String,
        voice: Option<Voice>,
    },
    Pausing {
        second: String,
        voice: Option<Voice>,
        fire_at: Instant,
    },
    SpeakingSecond {
        ticket: Ticket,
    },
}

/// Owns the one permitted utterance chain
pub struct Sequencer {
    chain: Chain,

    /// Language tag used when no voice resolved at all
    fallback_language: String,
}

impl Sequencer {
    pub fn new(fallback_language: &str) -> Self {
        Self {
            chain: Chain::Idle,
            fallback_language: fallback_language.to_string(),
        }
    }

    /// Speak one word, preempting whatever is playing or pending.
    ///
    /// The voice is the caller's resolved choice; `None` falls back to the
    /// host default constrained to the fallback language tag. Submit errors
    /// are logged, never raised.
    pub fn speak_one(&mut self, host: &mut dyn SpeechHost, word: &str, voice: Option<Voice>) {
        self.preempt(host);
        if let Some(ticket) = self.submit(host, word, voice.as_ref()) {
            self.chain = Chain::SpeakingOne { ticket };
        }
    }

    /// Speak two words with the configured pause in between.
    ///
    /// The voice is resolved once and reused for both words. The pause
    /// length is not read here; it is sampled when the first word's
    /// completion arrives, so adjusting the control mid-utterance takes
    /// effect.
    pub fn speak_pair(
        &mut self,
        host: &mut dyn SpeechHost,
        word1: &str,
        word2: &str,
        voice: Option<Voice>,
    ) {
        self.preempt(host);
        if let Some(ticket) = self.submit(host, word1, voice.as_ref()) {
            self.chain = Chain::SpeakingFirst {
                ticket,
                second: word2.to_string(),
                voice,
            };
        }
    }

    /// Cancel playback and drop the chain
    pub fn silence(&mut self, host: &mut dyn SpeechHost) {
        self.preempt(host);
    }

    /// Feed one host event through the chain.
    ///
    /// `pause` must be the control's current value; for a pair it becomes
    /// the gap between the words, measured from this completion.
    pub fn handle_event(&mut self, event: &SpeechEvent, pause: Duration, now: Instant) {
        match event {
            SpeechEvent::Finished(ticket) => {
                let chain = std::mem::replace(&mut self.chain, Chain::Idle);
                self.chain = match chain {
                    Chain::SpeakingOne { ticket: t } if t == *ticket => Chain::Idle,
                    Chain::SpeakingFirst {
                        ticket: t,
                        second,
                        voice,
                    } if t == *ticket => {
                        debug!("first word done, pausing {:?} before {:?}", pause, second);
                        Chain::Pausing {
                            second,
                            voice,
                            fire_at: now + pause,
                        }
                    }
                    Chain::SpeakingSecond { ticket: t } if t == *ticket => Chain::Idle,
                    // Stale completion from a superseded utterance
                    other => other,
                };
            }
            SpeechEvent::Errored(ticket, reason) => {
                let chain = std::mem::replace(&mut self.chain, Chain::Idle);
                self.chain = match chain {
                    Chain::SpeakingOne { ticket: t }
                    | Chain::SpeakingFirst { ticket: t, .. }
                    | Chain::SpeakingSecond { ticket: t }
                        if t == *ticket =>
                    {
                        // Terminal for the whole chain: a failed first word
                        // does not go on to the second, and nothing is left
                        // pending
                        error!("speech error: {}", reason);
                        Chain::Idle
                    }
                    other => other,
                };
            }
            SpeechEvent::VoicesChanged => {}
        }
    }

    /// Fire a due pause deadline: submit the second word exactly once
    pub fn poll(&mut self, host: &mut dyn SpeechHost, now: Instant) {
        let due = matches!(&self.chain, Chain::Pausing { fire_at, .. } if now >= *fire_at);
        if !due {
            return;
        }

        let chain = std::mem::replace(&mut self.chain, Chain::Idle);
        if let Chain::Pausing { second, voice, .. } = chain {
            if let Some(ticket) = self.submit(host, &second, voice.as_ref()) {
                self.chain = Chain::SpeakingSecond { ticket };
            }
        }
    }

    /// Time until the pause deadline, for the event loop's poll timeout
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        match &self.chain {
            Chain::Pausing { fire_at, .. } => Some(fire_at.saturating_duration_since(now)),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.chain, Chain::Idle)
    }

    /// Tear down the previous chain before any new work: abort host
    /// playback and drop the pending deadline
    fn preempt(&mut self, host: &mut dyn SpeechHost) {
        if host.is_speaking() {
            if let Err(e) = host.cancel() {
                error!("failed to cancel speech: {}", e);
            }
        }
        self.chain = Chain::Idle;
    }

    fn submit(
        &mut self,
        host: &mut dyn SpeechHost,
        word: &str,
        voice: Option<&Voice>,
    ) -> Option<Ticket> {
        let utterance = Utterance::new(word, voice, &self.fallback_language);
        match host.speak(&utterance) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                error!("speech error for {:?}: {}", word, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::FakeHost;

    const PAUSE: Duration = Duration::from_millis(500);

    fn sequencer() -> Sequencer {
        Sequencer::new("en-US")
    }

    #[test]
    fn test_pair_waits_for_completion_then_pause() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_pair(&mut host, "cat", "bat", None);
        assert_eq!(host.spoken_texts(), vec!["cat"]);

        // No second word before the first completes, however long we wait
        seq.poll(&mut host, t0 + Duration::from_secs(10));
        assert_eq!(host.spoken_texts(), vec!["cat"]);

        let first = host.last_ticket();
        host.finish(first);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        assert_eq!(seq.time_until_fire(t0), Some(PAUSE));

        // Not yet
        seq.poll(&mut host, t0 + PAUSE - Duration::from_millis(1));
        assert_eq!(host.spoken_texts(), vec!["cat"]);

        // Fires once, exactly one submission of the second word
        seq.poll(&mut host, t0 + PAUSE);
        assert_eq!(host.spoken_texts(), vec!["cat", "bat"]);
        seq.poll(&mut host, t0 + PAUSE * 2);
        assert_eq!(host.spoken_texts(), vec!["cat", "bat"]);

        let second = host.last_ticket();
        host.finish(second);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        assert!(seq.is_idle());
    }

    #[test]
    fn test_new_request_supersedes_pending_pause() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_pair(&mut host, "cat", "bat", None);
        let first = host.last_ticket();
        host.finish(first);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        assert!(seq.time_until_fire(t0).is_some());

        // A single-word request during the pause wins
        seq.speak_one(&mut host, "dog", None);
        assert_eq!(host.spoken_texts(), vec!["cat", "dog"]);
        assert!(seq.time_until_fire(t0).is_none());

        // The superseded pair's second word never plays
        seq.poll(&mut host, t0 + Duration::from_secs(10));
        assert_eq!(host.spoken_texts(), vec!["cat", "dog"]);
    }

    #[test]
    fn test_new_request_cancels_active_playback() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();

        seq.speak_one(&mut host, "cat", None);
        assert!(host.is_speaking());

        seq.speak_one(&mut host, "dog", None);
        assert_eq!(host.cancels, 1);
        assert_eq!(host.spoken_texts(), vec!["cat", "dog"]);
    }

    #[test]
    fn test_first_word_error_tears_chain_down() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_pair(&mut host, "cat", "bat", None);
        let first = host.last_ticket();
        host.error(first, "synthesis failed");
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }

        // No hang: the chain is gone and the second word never plays
        assert!(seq.is_idle());
        assert!(seq.time_until_fire(t0).is_none());
        seq.poll(&mut host, t0 + Duration::from_secs(10));
        assert_eq!(host.spoken_texts(), vec!["cat"]);
    }

    #[test]
    fn test_pause_is_read_at_completion_time() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_pair(&mut host, "cat", "bat", None);
        let first = host.last_ticket();
        host.finish(first);

        // The control moved while the first word was playing; the value at
        // completion is what counts
        let adjusted = Duration::from_millis(300);
        for event in host.drain_events() {
            seq.handle_event(&event, adjusted, t0);
        }
        assert_eq!(seq.time_until_fire(t0), Some(adjusted));

        seq.poll(&mut host, t0 + adjusted);
        assert_eq!(host.spoken_texts(), vec!["cat", "bat"]);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_one(&mut host, "cat", None);
        let stale = host.last_ticket();

        seq.speak_one(&mut host, "dog", None);
        // The cancelled utterance's completion arrives late
        host.finish(stale);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        assert!(!seq.is_idle());

        let current = host.last_ticket();
        host.finish(current);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        assert!(seq.is_idle());
    }

    #[test]
    fn test_submit_failure_is_swallowed() {
        let mut host = FakeHost::new();
        host.fail_next_speak = true;
        let mut seq = sequencer();

        seq.speak_pair(&mut host, "cat", "bat", None);
        assert!(seq.is_idle());
        assert!(host.submitted.is_empty());
    }

    #[test]
    fn test_voice_resolved_once_for_both_words() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();
        let voice = Voice::new("Samantha", "en-US");

        seq.speak_pair(&mut host, "cat", "bat", Some(voice));
        let first = host.last_ticket();
        host.finish(first);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }
        seq.poll(&mut host, t0 + PAUSE);

        assert_eq!(host.submitted.len(), 2);
        for utterance in &host.submitted {
            assert_eq!(utterance.voice.as_deref(), Some("Samantha"));
        }
    }

    #[test]
    fn test_silence_clears_everything() {
        let mut host = FakeHost::new();
        let mut seq = sequencer();
        let t0 = Instant::now();

        seq.speak_pair(&mut host, "cat", "bat", None);
        let first = host.last_ticket();
        host.finish(first);
        for event in host.drain_events() {
            seq.handle_event(&event, PAUSE, t0);
        }

        seq.silence(&mut host);
        assert!(seq.is_idle());
        seq.poll(&mut host, t0 + Duration::from_secs(10));
        assert_eq!(host.spoken_texts(), vec!["cat"]);
    }
}
