//! Voice catalog discovery and selection
//!
//! Host engines report their voices asynchronously, inconsistently, and on
//! some platforms not at all until a user gesture has occurred. The manager
//! polls the host with a bounded fixed-delay retry, owns the discovered
//! catalog, and resolves the selected voice by name on every read so a
//! replaced catalog can never leave a stale handle behind.

use crate::speech::host::{SpeechHost, Voice};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

/// Maximum discovery attempts before giving up
pub const MAX_VOICE_RETRIES: u32 = 10;

/// Delay between discovery attempts
pub const VOICE_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Discovery progress
///
/// `Failed` and `Ready` both accept a re-entrant trigger (host notification
/// or user gesture) back into discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Nothing attempted yet
    Empty,
    /// Last query came back empty; a retry is scheduled
    Loading,
    /// Catalog is populated
    Ready,
    /// Retry budget exhausted with no voices; terminal until re-triggered
    Failed,
}

/// Owns the voice catalog, the discovery state machine, and the selection
pub struct VoiceManager {
    catalog: Vec<Voice>,
    state: DiscoveryState,
    retries: u32,
    next_retry_at: Option<Instant>,

    /// Selection is stored by name and re-resolved against the live catalog
    selected: Option<String>,

    primary_language: String,
    secondary_language: String,
}

impl VoiceManager {
    pub fn new(primary_language: &str, secondary_language: &str) -> Self {
        Self {
            catalog: Vec::new(),
            state: DiscoveryState::Empty,
            retries: 0,
            next_retry_at: None,
            selected: None,
            primary_language: primary_language.to_string(),
            secondary_language: secondary_language.to_string(),
        }
    }

    /// Query the host for its current voice set.
    ///
    /// Non-empty: the catalog is replaced wholesale, sorted by
    /// case-insensitive name. Empty: a retry is scheduled until the budget
    /// runs out, after which the manager parks in `Failed`.
    pub fn refresh(&mut self, host: &mut dyn SpeechHost, now: Instant) {
        let mut voices = match host.voices() {
            Ok(v) => v,
            Err(e) => {
                warn!("voice enumeration failed: {}", e);
                Vec::new()
            }
        };

        if voices.is_empty() {
            if self.retries < MAX_VOICE_RETRIES {
                self.retries += 1;
                self.next_retry_at = Some(now + VOICE_RETRY_DELAY);
                self.state = DiscoveryState::Loading;
                warn!(
                    "no voices available yet, retry {} of {}",
                    self.retries, MAX_VOICE_RETRIES
                );
            } else {
                self.state = DiscoveryState::Failed;
                self.next_retry_at = None;
                self.catalog.clear();
                error!(
                    "no voices after {} attempts; waiting for an external trigger",
                    MAX_VOICE_RETRIES
                );
            }
            return;
        }

        voices.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.catalog = voices;
        self.state = DiscoveryState::Ready;
        self.retries = 0;
        self.next_retry_at = None;

        // Keep an explicit user choice if its name survived the replacement;
        // otherwise fall back to the locale preference policy
        let keep = self
            .selected
            .as_deref()
            .is_some_and(|name| self.catalog.iter().any(|v| v.name == name));
        if !keep {
            self.selected = self.default_selection().map(|v| v.name.clone());
        }

        info!(
            "voice catalog populated: {} voices, selected {:?}",
            self.catalog.len(),
            self.selected
        );
    }

    /// Host notification that the voice set changed.
    ///
    /// Skipped once `Ready` to avoid redundant rebuilds, but safe to call
    /// at any time.
    pub fn on_voices_changed(&mut self, host: &mut dyn SpeechHost, now: Instant) {
        if self.state == DiscoveryState::Ready {
            debug!("voices-changed notification ignored, catalog already ready");
            return;
        }
        self.refresh(host, now);
    }

    /// Re-arm the retry budget and refresh unconditionally.
    ///
    /// Wired to the first user gesture of the session and to the manual
    /// rescan control; this is the way out of `Failed`.
    pub fn retrigger(&mut self, host: &mut dyn SpeechHost, now: Instant) {
        debug!("voice discovery re-triggered");
        self.retries = 0;
        self.refresh(host, now);
    }

    /// Fire a due scheduled retry.
    ///
    /// A retry firing after discovery already succeeded (or was re-parked)
    /// is a no-op; the state check makes hard timer cancellation
    /// unnecessary.
    pub fn poll(&mut self, host: &mut dyn SpeechHost, now: Instant) {
        let due = self.next_retry_at.is_some_and(|at| now >= at);
        if !due {
            return;
        }
        self.next_retry_at = None;
        if self.state == DiscoveryState::Loading {
            self.refresh(host, now);
        }
    }

    /// Time until the scheduled retry, for the event loop's poll timeout
    pub fn time_until_retry(&self, now: Instant) -> Option<Duration> {
        self.next_retry_at
            .map(|at| at.saturating_duration_since(now))
    }

    /// Resolve the selection against the live catalog.
    ///
    /// None when the catalog is empty or the stored name no longer exists.
    pub fn selected(&self) -> Option<&Voice> {
        let name = self.selected.as_deref()?;
        self.catalog.iter().find(|v| v.name == name)
    }

    /// Select a voice by catalog index
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.catalog.get(index) {
            Some(voice) => {
                info!("voice selected: {} ({})", voice.name, voice.language);
                self.selected = Some(voice.name.clone());
                true
            }
            None => {
                warn!(
                    "voice index {} out of range (have {} voices)",
                    index,
                    self.catalog.len()
                );
                false
            }
        }
    }

    pub fn catalog(&self) -> &[Voice] {
        &self.catalog
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    /// Exact primary-locale match wins, then the secondary locale; ties
    /// break on the first after sort. No match leaves the selection empty
    /// and speak-time resolution falls back to the first catalog entry.
    fn default_selection(&self) -> Option<&Voice> {
        self.catalog
            .iter()
            .find(|v| v.language == self.primary_language)
            .or_else(|| {
                self.catalog
                    .iter()
                    .find(|v| v.language == self.secondary_language)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::FakeHost;

    fn manager() -> VoiceManager {
        VoiceManager::new("en-US", "en-GB")
    }

    #[test]
    fn test_ready_after_transient_empty_sets() {
        let mut host = FakeHost::with_voice_batches(vec![
            vec![],
            vec![],
            vec![Voice::new("b", "en-GB"), Voice::new("A", "en-US")],
        ]);
        let mut mgr = manager();
        let t0 = Instant::now();

        mgr.refresh(&mut host, t0);
        assert_eq!(mgr.state(), DiscoveryState::Loading);

        // Before the retry delay elapses nothing happens
        mgr.poll(&mut host, t0 + Duration::from_millis(199));
        assert_eq!(mgr.state(), DiscoveryState::Loading);

        mgr.poll(&mut host, t0 + VOICE_RETRY_DELAY);
        assert_eq!(mgr.state(), DiscoveryState::Loading);

        mgr.poll(&mut host, t0 + VOICE_RETRY_DELAY * 2);
        assert_eq!(mgr.state(), DiscoveryState::Ready);

        // Sorted case-insensitively by name
        let names: Vec<&str> = mgr.catalog().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A", "b"]);
        assert!(mgr.time_until_retry(t0).is_none());
    }

    #[test]
    fn test_failed_after_budget_then_retrigger_rearms() {
        let mut host = FakeHost::new();
        let mut mgr = manager();
        let t0 = Instant::now();

        mgr.refresh(&mut host, t0);
        let mut now = t0;
        for _ in 0..MAX_VOICE_RETRIES {
            now += VOICE_RETRY_DELAY;
            mgr.poll(&mut host, now);
        }
        assert_eq!(mgr.state(), DiscoveryState::Failed);
        assert!(mgr.catalog().is_empty());
        assert!(mgr.time_until_retry(now).is_none());

        // Terminal until an external trigger; a due-time poll does nothing
        mgr.poll(&mut host, now + Duration::from_secs(60));
        assert_eq!(mgr.state(), DiscoveryState::Failed);

        // Re-trigger re-arms the budget from zero
        let mut host = FakeHost::with_voice_batches(vec![vec![Voice::new("A", "en-US")]]);
        mgr.retrigger(&mut host, now);
        assert_eq!(mgr.state(), DiscoveryState::Ready);
        assert_eq!(mgr.catalog().len(), 1);
    }

    #[test]
    fn test_retrigger_after_failure_restarts_retry_loop() {
        let mut host = FakeHost::new();
        let mut mgr = manager();
        let t0 = Instant::now();

        mgr.refresh(&mut host, t0);
        let mut now = t0;
        for _ in 0..MAX_VOICE_RETRIES {
            now += VOICE_RETRY_DELAY;
            mgr.poll(&mut host, now);
        }
        assert_eq!(mgr.state(), DiscoveryState::Failed);

        mgr.retrigger(&mut host, now);
        assert_eq!(mgr.state(), DiscoveryState::Loading);
        assert!(mgr.time_until_retry(now).is_some());
    }

    #[test]
    fn test_default_selection_prefers_primary_locale() {
        let mut host = FakeHost::with_voice_batches(vec![vec![
            Voice::new("B", "en-GB"),
            Voice::new("A", "en-US"),
        ]]);
        let mut mgr = manager();
        mgr.refresh(&mut host, Instant::now());

        // After sort [A(en-US), B(en-GB)], the first en-US match wins
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("A"));
    }

    #[test]
    fn test_default_selection_falls_back_to_secondary_locale() {
        let mut host = FakeHost::with_voice_batches(vec![vec![
            Voice::new("Eloise", "fr-FR"),
            Voice::new("Brian", "en-GB"),
        ]]);
        let mut mgr = manager();
        mgr.refresh(&mut host, Instant::now());

        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("Brian"));
    }

    #[test]
    fn test_no_locale_match_leaves_selection_empty() {
        let mut host =
            FakeHost::with_voice_batches(vec![vec![Voice::new("Eloise", "fr-FR")]]);
        let mut mgr = manager();
        mgr.refresh(&mut host, Instant::now());

        assert_eq!(mgr.state(), DiscoveryState::Ready);
        assert!(mgr.selected().is_none());
    }

    #[test]
    fn test_on_voices_changed_skipped_when_ready() {
        let mut host = FakeHost::with_voice_batches(vec![
            vec![Voice::new("A", "en-US")],
            vec![], // would wipe the catalog if the notification refreshed
        ]);
        let mut mgr = manager();
        let now = Instant::now();

        mgr.refresh(&mut host, now);
        assert_eq!(mgr.state(), DiscoveryState::Ready);

        mgr.on_voices_changed(&mut host, now);
        assert_eq!(mgr.state(), DiscoveryState::Ready);
        assert_eq!(mgr.catalog().len(), 1);
    }

    #[test]
    fn test_selection_survives_catalog_replacement_by_name() {
        let mut host = FakeHost::with_voice_batches(vec![
            vec![Voice::new("A", "en-US"), Voice::new("B", "en-GB")],
            vec![Voice::new("B", "en-GB"), Voice::new("C", "en-AU")],
        ]);
        let mut mgr = manager();
        let now = Instant::now();

        mgr.refresh(&mut host, now);
        assert!(mgr.select_index(1)); // "B"
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("B"));

        mgr.retrigger(&mut host, now);
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("B"));
    }

    #[test]
    fn test_stale_selection_re_resolves_after_replacement() {
        let mut host = FakeHost::with_voice_batches(vec![
            vec![Voice::new("A", "en-US"), Voice::new("B", "en-GB")],
            vec![Voice::new("B", "en-GB")],
        ]);
        let mut mgr = manager();
        let now = Instant::now();

        mgr.refresh(&mut host, now);
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("A"));

        // "A" disappears; the default policy picks the secondary locale voice
        mgr.retrigger(&mut host, now);
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("B"));
    }

    #[test]
    fn test_select_index_out_of_range() {
        let mut host = FakeHost::with_voice_batches(vec![vec![Voice::new("A", "en-US")]]);
        let mut mgr = manager();
        mgr.refresh(&mut host, Instant::now());

        assert!(!mgr.select_index(5));
        assert_eq!(mgr.selected().map(|v| v.name.as_str()), Some("A"));
    }
}
