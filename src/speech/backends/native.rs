//! Native speech host backed by the tts crate
//!
//! The `tts` crate provides a unified interface to Speech Dispatcher on
//! Linux, AVFoundation on macOS, and the platform engines elsewhere.
//! Utterance-end callbacks arrive on an engine thread; they are forwarded
//! over a channel and handed to the event loop through `drain_events`.

use crate::speech::host::{SpeechEvent, SpeechHost, Ticket, Utterance, Voice};
use crate::{MinpairError, Result};
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tts::Tts;

/// How long to wait before declaring an utterance finished on engines that
/// report neither callbacks nor a speaking state transition we observed
const COMPLETION_GRACE: Duration = Duration::from_millis(500);

/// Raw notifications crossing over from the engine's callback thread
enum EngineEvent {
    Ended(tts::UtteranceId),
    Stopped(tts::UtteranceId),
}

/// The one utterance we may have in flight
struct Pending {
    ticket: Ticket,
    engine_id: Option<tts::UtteranceId>,
    submitted_at: Instant,
    seen_speaking: bool,
}

/// Native TTS host
pub struct NativeHost {
    tts: Tts,

    /// Engine voice objects from the last enumeration, kept so a catalog
    /// name can be mapped back for `set_voice`
    engine_voices: Vec<tts::Voice>,

    /// Name of the voice currently applied to the engine
    current_voice: Option<String>,

    events: Receiver<EngineEvent>,
    pending: Option<Pending>,
    next_ticket: u64,
    callbacks_supported: bool,
}

impl NativeHost {
    /// Create the platform speech host
    ///
    /// Fails when no speech capability exists on this system; the caller
    /// treats that as fatal at startup.
    pub fn new() -> Result<Self> {
        debug!("creating native TTS host");

        let tts = Tts::default()
            .map_err(|e| MinpairError::Speech(format!("failed to initialize TTS: {}", e)))?;

        let features = tts.supported_features();
        let callbacks_supported = features.utterance_callbacks;
        debug!(
            "native TTS host ready (utterance callbacks: {})",
            callbacks_supported
        );

        let (tx, rx) = mpsc::channel();
        if callbacks_supported {
            let end_tx: Sender<EngineEvent> = tx.clone();
            tts.on_utterance_end(Some(Box::new(move |id| {
                let _ = end_tx.send(EngineEvent::Ended(id));
            })))
            .map_err(|e| {
                MinpairError::Speech(format!("failed to register end callback: {}", e))
            })?;

            let stop_tx = tx;
            tts.on_utterance_stop(Some(Box::new(move |id| {
                let _ = stop_tx.send(EngineEvent::Stopped(id));
            })))
            .map_err(|e| {
                MinpairError::Speech(format!("failed to register stop callback: {}", e))
            })?;
        }

        Ok(Self {
            tts,
            engine_voices: Vec::new(),
            current_voice: None,
            events: rx,
            pending: None,
            next_ticket: 0,
            callbacks_supported,
        })
    }

    /// Point the engine at the utterance's voice, or at any voice matching
    /// its fallback language tag, before speaking. Leaves the engine default
    /// in place when neither resolves.
    fn apply_voice(&mut self, utterance: &Utterance) -> Result<()> {
        let wanted = match (&utterance.voice, &utterance.language) {
            (Some(name), _) => self.engine_voices.iter().find(|v| v.name() == *name),
            (None, Some(lang)) => self
                .engine_voices
                .iter()
                .find(|v| v.language().to_string() == *lang),
            (None, None) => None,
        };

        if let Some(voice) = wanted {
            let name = voice.name();
            if self.current_voice.as_deref() != Some(name.as_str()) {
                debug!("switching engine voice to {}", name);
                self.tts
                    .set_voice(voice)
                    .map_err(|e| MinpairError::Speech(format!("failed to set voice: {}", e)))?;
                self.current_voice = Some(name);
            }
        }

        Ok(())
    }
}

impl SpeechHost for NativeHost {
    fn voices(&mut self) -> Result<Vec<Voice>> {
        let engine_voices = self
            .tts
            .voices()
            .map_err(|e| MinpairError::Speech(format!("failed to get voices: {}", e)))?;

        let list = engine_voices
            .iter()
            .map(|v| Voice {
                name: v.name(),
                language: v.language().to_string(),
            })
            .collect();

        self.engine_voices = engine_voices;
        Ok(list)
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<Ticket> {
        self.apply_voice(utterance)?;

        let engine_id = self
            .tts
            .speak(utterance.text.clone(), false)
            .map_err(|e| MinpairError::Speech(format!("speak failed: {}", e)))?;

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        debug!("speaking {:?} as {:?}", utterance.text, ticket);

        self.pending = Some(Pending {
            ticket,
            engine_id,
            submitted_at: Instant::now(),
            seen_speaking: false,
        });

        Ok(ticket)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("cancelling speech");
        self.pending = None;
        self.tts
            .stop()
            .map_err(|e| MinpairError::Speech(format!("cancel failed: {}", e)))?;
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        self.tts.is_speaking().unwrap_or(false)
    }

    fn drain_events(&mut self) -> Vec<SpeechEvent> {
        let mut out = Vec::new();

        while let Ok(event) = self.events.try_recv() {
            let Some(pending) = self.pending.as_ref() else {
                continue;
            };
            // Engines without utterance ids get a single pending slot, so a
            // missing id still matches the one utterance we submitted
            let matches = |id: &tts::UtteranceId| {
                pending.engine_id.as_ref().map_or(true, |p| p == id)
            };
            match event {
                EngineEvent::Ended(id) if matches(&id) => {
                    out.push(SpeechEvent::Finished(pending.ticket));
                    self.pending = None;
                }
                // A stop means we cancelled it ourselves; the sequencer has
                // already moved on, so no event is surfaced
                EngineEvent::Stopped(id) if matches(&id) => {
                    self.pending = None;
                }
                _ => {}
            }
        }

        // No callbacks on this engine: infer completion from the speaking
        // state settling back to idle
        if !self.callbacks_supported {
            let speaking = self.tts.is_speaking().unwrap_or(false);
            if let Some(pending) = &mut self.pending {
                if speaking {
                    pending.seen_speaking = true;
                }
            }
            let finished = matches!(
                &self.pending,
                Some(p) if !speaking
                    && (p.seen_speaking || p.submitted_at.elapsed() > COMPLETION_GRACE)
            );
            if finished {
                if let Some(p) = self.pending.take() {
                    out.push(SpeechEvent::Finished(p.ticket));
                }
            }
        }

        out
    }

    fn set_rate(&mut self, rate: u8) -> Result<()> {
        let features = self.tts.supported_features();
        if !features.rate {
            warn!("rate control not supported on this platform");
            return Ok(());
        }

        // Map 0-100 onto the engine's own range, 50 landing on normal
        let (min, normal, max) = (
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        let value = if rate <= 50 {
            min + (normal - min) * (rate as f32 / 50.0)
        } else {
            normal + (max - normal) * ((rate - 50) as f32 / 50.0)
        };

        self.tts
            .set_rate(value)
            .map_err(|e| MinpairError::Speech(format!("failed to set rate: {}", e)))?;
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        let features = self.tts.supported_features();
        if !features.volume {
            warn!("volume control not supported on this platform");
            return Ok(());
        }

        let (min, max) = (self.tts.min_volume(), self.tts.max_volume());
        let value = min + (max - min) * (volume as f32 / 100.0);

        self.tts
            .set_volume(value)
            .map_err(|e| MinpairError::Speech(format!("failed to set volume: {}", e)))?;
        Ok(())
    }
}
