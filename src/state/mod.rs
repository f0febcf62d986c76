//! Application state
//!
//! The App struct is the single owned state record: speech host, voice
//! manager, utterance sequencer, loaded catalog view, pause setting, and
//! the modal input stack. Everything the event loop and the key handlers
//! touch lives here.

pub mod config;

use crate::input::HandlerStack;
use crate::speech::{
    DiscoveryState, Sequencer, SpeechEvent, SpeechHost, Utterance, Voice, VoiceManager,
};
use crate::view::DrillView;
use crate::words::loader::CatalogSource;
use crate::{APP_NAME, VERSION};
use config::{Config, PAUSE_MAX_MS, PAUSE_MIN_MS, PAUSE_STEP_MS};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Bounded inter-word pause, stepped by the pause controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseSetting {
    ms: u64,
}

impl PauseSetting {
    pub fn new(ms: u64) -> Self {
        Self {
            ms: ms.clamp(PAUSE_MIN_MS, PAUSE_MAX_MS),
        }
    }

    pub fn increase(&mut self) {
        self.ms = (self.ms + PAUSE_STEP_MS).min(PAUSE_MAX_MS);
    }

    pub fn decrease(&mut self) {
        self.ms = self.ms.saturating_sub(PAUSE_STEP_MS);
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.ms)
    }

    pub fn ms(&self) -> u64 {
        self.ms
    }

    /// Display form: seconds with one decimal
    pub fn label(&self) -> String {
        format!("{:.1} sec", self.ms as f64 / 1000.0)
    }
}

/// Main application state
pub struct App {
    pub config: Config,
    pub host: Box<dyn SpeechHost>,
    pub voices: VoiceManager,
    pub sequencer: Sequencer,
    pub drill: DrillView,

    /// Modal input stack (word entry, voice pick)
    pub handlers: HandlerStack,

    /// Where the catalog came from; reload re-runs it
    pub source: CatalogSource,

    /// Status line for the last catalog load
    pub status: String,

    /// Free-text word slots
    pub custom_first: String,
    pub custom_second: String,

    pub pause: PauseSetting,

    /// Voice list overlay toggle
    pub show_voices: bool,

    /// Prompt and buffer of an active modal line input
    pub input_line: Option<(String, String)>,

    /// First-gesture hook has fired
    gesture_seen: bool,

    /// Display needs a repaint
    pub dirty: bool,

    /// Main loop should exit
    pub quit: bool,
}

impl App {
    /// Build the application state and start voice discovery
    pub fn new(config: Config, mut host: Box<dyn SpeechHost>, source: CatalogSource) -> Self {
        if let Some(rate) = config.rate() {
            if let Err(e) = host.set_rate(rate) {
                warn!("failed to apply configured rate: {}", e);
            }
        }
        if let Some(volume) = config.volume() {
            if let Err(e) = host.set_volume(volume) {
                warn!("failed to apply configured volume: {}", e);
            }
        }

        let mut voices = VoiceManager::new(
            &config.primary_language(),
            &config.secondary_language(),
        );
        voices.refresh(host.as_mut(), Instant::now());

        let sequencer = Sequencer::new(&config.primary_language());
        let pause = PauseSetting::new(config.pause_ms());

        let (drill, status) = match source.load() {
            Ok(catalog) => {
                let status = format!("Loaded {} pairs from {}", catalog.pair_count(), source.label());
                (DrillView::build(&catalog), status)
            }
            Err(e) => {
                warn!("catalog load failed: {}", e);
                (
                    DrillView::notice("Could not load the word catalog."),
                    format!("Error loading {}: {}", source.label(), e),
                )
            }
        };

        Self {
            config,
            host,
            voices,
            sequencer,
            drill,
            handlers: HandlerStack::new(),
            source,
            status,
            custom_first: String::new(),
            custom_second: String::new(),
            pause,
            show_voices: false,
            input_line: None,
            gesture_seen: false,
            dirty: true,
            quit: false,
        }
    }

    /// Re-run the active catalog source and replace the view wholesale
    pub fn reload_catalog(&mut self) {
        match self.source.load() {
            Ok(catalog) => {
                self.status = format!(
                    "Loaded {} pairs from {}",
                    catalog.pair_count(),
                    self.source.label()
                );
                self.drill = DrillView::build(&catalog);
            }
            Err(e) => {
                warn!("catalog reload failed: {}", e);
                self.status = format!("Error loading {}: {}", self.source.label(), e);
                self.drill = DrillView::notice("Could not load the word catalog.");
            }
        }
        self.dirty = true;
    }

    /// Selection for the next utterance: the chosen voice, else the first
    /// catalog entry, else none (host default with the fallback tag)
    pub fn resolve_voice(&self) -> Option<Voice> {
        self.voices
            .selected()
            .or_else(|| self.voices.catalog().first())
            .cloned()
    }

    /// Speak one word; blank input is ignored
    pub fn speak_word(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            debug!("ignoring empty speak request");
            return;
        }
        let voice = self.resolve_voice();
        self.sequencer.speak_one(self.host.as_mut(), word, voice);
    }

    /// Speak a pair; blank inputs are ignored
    pub fn speak_pair(&mut self, word1: &str, word2: &str) {
        let (word1, word2) = (word1.trim(), word2.trim());
        if word1.is_empty() || word2.is_empty() {
            debug!("ignoring pair with an empty word");
            return;
        }
        let voice = self.resolve_voice();
        self.sequencer
            .speak_pair(self.host.as_mut(), word1, word2, voice);
    }

    /// Cancel playback and any pending chain
    pub fn silence(&mut self) {
        self.sequencer.silence(self.host.as_mut());
    }

    /// Re-run voice discovery on user request
    pub fn rescan_voices(&mut self) {
        self.voices
            .retrigger(self.host.as_mut(), Instant::now());
        self.dirty = true;
    }

    pub fn select_voice_index(&mut self, index: usize) {
        if self.voices.select_index(index) {
            self.status = match self.voices.selected() {
                Some(v) => format!("Voice: {} ({})", v.name, v.language),
                None => "Voice selection cleared".to_string(),
            };
        } else {
            self.status = format!("No voice number {}", index);
        }
        self.dirty = true;
    }

    /// First keypress of the session: some hosts only report voices, or
    /// unlock audio output, after a user gesture
    pub fn on_user_gesture(&mut self, now: Instant) {
        if self.gesture_seen {
            return;
        }
        self.gesture_seen = true;
        debug!("first user gesture, re-running voice discovery");
        self.voices.retrigger(self.host.as_mut(), now);
        if let Err(e) = self.host.speak(&Utterance::priming()) {
            debug!("priming utterance failed: {}", e);
        }
        self.dirty = true;
    }

    /// One event-loop turn: drain host events into the state machines and
    /// fire any due timers
    pub fn tick(&mut self, now: Instant) {
        let before = self.voices_fingerprint();

        for event in self.host.drain_events() {
            match event {
                SpeechEvent::VoicesChanged => {
                    self.voices.on_voices_changed(self.host.as_mut(), now);
                }
                other => {
                    let pause = self.pause.duration();
                    self.sequencer.handle_event(&other, pause, now);
                }
            }
        }

        self.voices.poll(self.host.as_mut(), now);
        self.sequencer.poll(self.host.as_mut(), now);

        if before != self.voices_fingerprint() {
            self.dirty = true;
        }
    }

    /// Nearest pending deadline, for the poll timeout
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match (
            self.voices.time_until_retry(now),
            self.sequencer.time_until_fire(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    fn voices_fingerprint(&self) -> (DiscoveryState, usize) {
        (self.voices.state(), self.voices.catalog().len())
    }

    /// Build the full frame: status header, then either the voice overlay
    /// or the drill list
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} {} - {}", APP_NAME, VERSION, self.source.label()));
        lines.push(self.status.clone());
        lines.push(format!(
            "Voices: {} | Pause: {}",
            self.voice_label(),
            self.pause.label()
        ));
        lines.push(format!(
            "Words: [{}] [{}]  e/E edit, 1/2/3 speak",
            self.custom_first, self.custom_second
        ));
        lines.push(
            "Keys: arrows move, ,/. word, Enter pair, [/] pause, v voice, V list, g rescan, x silence, r reload, q quit"
                .to_string(),
        );

        if let Some((prompt, buffer)) = &self.input_line {
            lines.push(format!("{} {}_", prompt, buffer));
        }
        lines.push(String::new());

        if self.show_voices {
            lines.extend(self.voice_overlay());
        } else {
            lines.extend(self.drill.render());
        }

        let mut frame = String::from("\x1b[2J\x1b[H");
        frame.push_str(&lines.join("\r\n"));
        frame.push_str("\r\n");
        frame
    }

    fn voice_label(&self) -> String {
        match self.voices.state() {
            DiscoveryState::Empty => "starting".to_string(),
            DiscoveryState::Loading => "loading".to_string(),
            DiscoveryState::Failed => "No voices available (g to rescan)".to_string(),
            DiscoveryState::Ready => {
                let selected = match self.voices.selected() {
                    Some(v) => format!("{} ({})", v.name, v.language),
                    None => "host default".to_string(),
                };
                format!("{} ready, using {}", self.voices.catalog().len(), selected)
            }
        }
    }

    fn voice_overlay(&self) -> Vec<String> {
        if self.voices.catalog().is_empty() {
            return vec!["No voices available".to_string()];
        }
        let selected_name = self.voices.selected().map(|v| v.name.clone());
        self.voices
            .catalog()
            .iter()
            .enumerate()
            .map(|(i, voice)| {
                let marker = if Some(&voice.name) == selected_name.as_ref() {
                    '*'
                } else {
                    ' '
                };
                format!("  {} {:3}  {} ({})", marker, i, voice.name, voice.language)
            })
            .collect()
    }
}
