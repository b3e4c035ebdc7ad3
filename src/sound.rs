//! Sound cues.
//!
//! Catalog of the companion's audio cues and a small mixer state that turns
//! mood changes into cue requests. Playback itself belongs to the host.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::hub::MoodObserver;
use crate::mood::{Mood, MoodConfig};

/// Volume used for cues that do not carry their own.
pub const DEFAULT_VOLUME: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCategory {
    Ui,
    Mascot,
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundSpec {
    pub key: &'static str,
    pub src: &'static str,
    pub volume: Option<f32>,
    pub looped: bool,
    pub category: SoundCategory,
}

const fn spec(
    key: &'static str,
    src: &'static str,
    volume: Option<f32>,
    looped: bool,
    category: SoundCategory,
) -> SoundSpec {
    SoundSpec {
        key,
        src,
        volume,
        looped,
        category,
    }
}

static CATALOG: &[SoundSpec] = &[
    spec("hover", "/audio/ui/hover.wav", Some(0.2), false, SoundCategory::Ui),
    spec("click", "/audio/ui/click.wav", Some(0.3), false, SoundCategory::Ui),
    spec("transition", "/audio/ui/transition.wav", Some(0.25), false, SoundCategory::Ui),
    spec("giggle-soft", "/audio/mascot/giggle-soft.wav", Some(0.4), false, SoundCategory::Mascot),
    spec("giggle-big", "/audio/mascot/giggle-big.wav", Some(0.5), false, SoundCategory::Mascot),
    spec("idle-breath", "/audio/mascot/idle-breath.wav", Some(0.2), true, SoundCategory::Mascot),
    spec("sleepy", "/audio/mascot/sleepy.wav", Some(0.3), false, SoundCategory::Mascot),
    spec("curious-blip", "/audio/mascot/curious-blip.wav", None, false, SoundCategory::Mascot),
    spec(
        "background-loop",
        "/audio/ambient/background-loop.mp3",
        Some(0.15),
        true,
        SoundCategory::Ambient,
    ),
];

pub fn lookup(key: &str) -> Option<&'static SoundSpec> {
    CATALOG.iter().find(|spec| spec.key == key)
}

pub fn sounds_by_category(category: SoundCategory) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|spec| spec.category == category)
        .map(|spec| spec.key)
        .collect()
}

/// A cue the host should play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub key: &'static str,
    pub spec: &'static SoundSpec,
    /// Cue volume scaled by the master volume
    pub volume: f32,
}

#[derive(Debug)]
struct BoardState {
    volume: f32,
    muted: bool,
    last_played: Option<&'static str>,
}

/// Master volume, mute switch and last-played bookkeeping.
#[derive(Debug)]
pub struct SoundBoard {
    state: Mutex<BoardState>,
}

impl SoundBoard {
    pub fn new(volume: f32, muted: bool) -> Self {
        Self {
            state: Mutex::new(BoardState {
                volume: volume.clamp(0.0, 1.0),
                muted,
                last_played: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Clamped to 0.0 - 1.0.
    pub fn set_volume(&self, volume: f32) {
        self.state().volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.state().volume
    }

    pub fn set_muted(&self, muted: bool) {
        self.state().muted = muted;
    }

    /// Returns the new mute state.
    pub fn toggle_mute(&self) -> bool {
        let mut state = self.state();
        state.muted = !state.muted;
        state.muted
    }

    pub fn is_muted(&self) -> bool {
        self.state().muted
    }

    pub fn last_played(&self) -> Option<&'static str> {
        self.state().last_played
    }

    /// Resolves `key` into a cue. `None` when muted or the key is unknown.
    pub fn play(&self, key: &str) -> Option<Cue> {
        let mut state = self.state();
        if state.muted {
            return None;
        }
        let Some(spec) = lookup(key) else {
            warn!(key, "Unknown sound cue");
            return None;
        };

        state.last_played = Some(spec.key);
        let volume = spec.volume.unwrap_or(DEFAULT_VOLUME) * state.volume;
        debug!(key, volume, "Sound cue");
        Some(Cue {
            key: spec.key,
            spec,
            volume,
        })
    }
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, false)
    }
}

impl MoodObserver for SoundBoard {
    fn on_mood_change(&self, _mood: Mood, config: &MoodConfig) {
        if let Some(key) = config.sound_key {
            self.play(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mood_cue_is_in_catalog() {
        for mood in Mood::ALL {
            if let Some(key) = mood.config().sound_key {
                assert!(lookup(key).is_some(), "missing cue {key}");
            }
        }
    }

    #[test]
    fn test_sounds_by_category() {
        let ui = sounds_by_category(SoundCategory::Ui);
        assert_eq!(ui, vec!["hover", "click", "transition"]);
        assert_eq!(sounds_by_category(SoundCategory::Ambient), vec!["background-loop"]);
    }

    #[test]
    fn test_volume_is_clamped() {
        let board = SoundBoard::default();
        board.set_volume(3.0);
        assert_eq!(board.volume(), 1.0);
        board.set_volume(-1.0);
        assert_eq!(board.volume(), 0.0);
    }

    #[test]
    fn test_play_scales_by_master_volume() {
        let board = SoundBoard::new(0.5, false);
        let cue = board.play("giggle-big").unwrap();
        assert_eq!(cue.volume, 0.25);
        assert_eq!(board.last_played(), Some("giggle-big"));
    }

    #[test]
    fn test_muted_board_records_nothing() {
        let board = SoundBoard::default();
        assert!(board.toggle_mute());
        assert!(board.play("click").is_none());
        assert_eq!(board.last_played(), None);
    }

    #[test]
    fn test_play_resolves_every_catalog_entry() {
        let board = SoundBoard::new(1.0, false);
        for spec in CATALOG {
            let cue = board.play(spec.key).unwrap();
            assert_eq!(cue.spec, lookup(spec.key).unwrap());
            assert_eq!(board.last_played(), Some(spec.key));
        }
        let blip = board.play("curious-blip").unwrap();
        assert_eq!(blip.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_unknown_key_ignored() {
        let board = SoundBoard::default();
        assert!(board.play("kazoo").is_none());
        assert_eq!(board.last_played(), None);
    }

    #[test]
    fn test_observer_plays_mood_cue() {
        let board = SoundBoard::default();
        board.on_mood_change(Mood::Sleepy, Mood::Sleepy.config());
        assert_eq!(board.last_played(), Some("sleepy"));

        board.on_mood_change(Mood::Talking, Mood::Talking.config());
        assert_eq!(board.last_played(), Some("sleepy"));
    }
}
