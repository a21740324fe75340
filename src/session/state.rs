use std::collections::{HashMap, HashSet};

use crate::models::{MediaSummary, TabId};

/// Coordinator-owned logging session.
///
/// Per-URL records are keyed by URL only, so the same page open in two tabs
/// shares one record.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub enabled: bool,
    pub auto_switch_enabled: bool,
    pub last_logged_url: Option<String>,
    generation: u64,
    url_records: HashMap<String, MediaSummary>,
    ended_tabs: HashSet<TabId>,
}

impl SessionState {
    pub fn new(auto_switch_enabled: bool) -> Self {
        Self {
            auto_switch_enabled,
            ..Self::default()
        }
    }

    pub fn begin(&mut self) {
        self.enabled = true;
        self.reset_tracking();
    }

    pub fn end(&mut self) {
        self.enabled = false;
        self.reset_tracking();
    }

    /// Bumped on every start and stop. Work begun under one generation must
    /// not write into another.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Session still enabled and not restarted since `generation` was read.
    pub fn is_current(&self, generation: u64) -> bool {
        self.enabled && self.generation == generation
    }

    fn reset_tracking(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.last_logged_url = None;
        self.url_records.clear();
        self.ended_tabs.clear();
    }

    pub fn record_for(&self, url: &str) -> Option<&MediaSummary> {
        self.url_records.get(url)
    }

    pub fn state_changed(&self, url: &str, current: &MediaSummary) -> bool {
        self.url_records
            .get(url)
            .map(|previous| !previous.same_state(current))
            .unwrap_or(true)
    }

    /// A line is written for a new URL, when forced, or when the URL's
    /// playing/ended pair moved since its last line.
    pub fn should_log(&self, url: &str, current: &MediaSummary, force: bool) -> bool {
        self.last_logged_url.as_deref() != Some(url) || force || self.state_changed(url, current)
    }

    pub fn record_logged(&mut self, url: &str, summary: MediaSummary) {
        self.url_records.insert(url.to_string(), summary);
        self.last_logged_url = Some(url.to_string());
    }

    pub fn is_ended_flag_set(&self, tab_id: TabId) -> bool {
        self.ended_tabs.contains(&tab_id)
    }

    /// Set the tab's ended flag. `false` when it was already set for the
    /// current episode.
    pub fn mark_ended(&mut self, tab_id: TabId) -> bool {
        self.ended_tabs.insert(tab_id)
    }

    pub fn clear_ended(&mut self, tab_id: TabId) {
        self.ended_tabs.remove(&tab_id);
    }

    pub fn tracked_urls(&self) -> usize {
        self.url_records.len()
    }

    pub fn ended_tab_count(&self) -> usize {
        self.ended_tabs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> MediaSummary {
        MediaSummary {
            has_playing_media: true,
            video_count: 1,
            playing_video_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn repeated_identical_observations_log_once() {
        let mut state = SessionState::new(false);
        state.begin();
        let url = "https://example.com/a";
        let idle = MediaSummary::default();

        assert!(state.should_log(url, &idle, false));
        state.record_logged(url, idle);

        for _ in 0..5 {
            assert!(!state.should_log(url, &idle, false));
        }
    }

    #[test]
    fn state_flip_or_force_or_new_url_logs() {
        let mut state = SessionState::new(false);
        state.begin();
        let url = "https://example.com/a";
        state.record_logged(url, MediaSummary::default());

        assert!(state.should_log(url, &playing(), false));
        assert!(state.should_log(url, &MediaSummary::default(), true));
        assert!(state.should_log("https://example.com/b", &MediaSummary::default(), false));
    }

    #[test]
    fn previously_seen_url_with_same_state_is_logged_again_after_leaving() {
        let mut state = SessionState::new(false);
        state.begin();
        state.record_logged("https://a.example/", MediaSummary::default());
        state.record_logged("https://b.example/", MediaSummary::default());

        assert!(state.should_log("https://a.example/", &MediaSummary::default(), false));
        assert!(!state.state_changed("https://a.example/", &MediaSummary::default()));
    }

    #[test]
    fn begin_and_end_reset_tracking() {
        let mut state = SessionState::new(true);
        state.begin();
        state.record_logged("https://a.example/", playing());
        assert!(state.mark_ended(7));

        state.begin();
        assert!(state.enabled);
        assert!(state.last_logged_url.is_none());
        assert_eq!(state.tracked_urls(), 0);
        assert_eq!(state.ended_tab_count(), 0);
        assert!(state.auto_switch_enabled);

        state.record_logged("https://a.example/", playing());
        state.mark_ended(3);
        state.end();
        assert!(!state.enabled);
        assert!(state.last_logged_url.is_none());
        assert_eq!(state.tracked_urls(), 0);
        assert!(!state.is_ended_flag_set(3));
    }

    #[test]
    fn restart_invalidates_earlier_generation() {
        let mut state = SessionState::new(false);
        state.begin();
        let started = state.generation();
        assert!(state.is_current(started));

        state.end();
        assert!(!state.is_current(started));
        state.begin();
        assert!(!state.is_current(started));
        assert!(state.is_current(state.generation()));
    }

    #[test]
    fn ended_flag_is_set_once_per_episode() {
        let mut state = SessionState::new(true);
        assert!(state.mark_ended(1));
        assert!(!state.mark_ended(1));
        state.clear_ended(1);
        assert!(state.mark_ended(1));
    }
}
