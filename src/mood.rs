//! Mood Set.
//!
//! The companion's closed set of moods and the fixed presentation table
//! attached to each of them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::MascotError;

/// Discrete emotional state of the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Resting baseline
    #[default]
    #[serde(alias = "neutral")]
    Idle,
    Curious,
    Happy,
    Excited,
    /// Reached automatically after prolonged inactivity
    Sleepy,
    Talking,
}

impl Mood {
    /// Every mood, in declaration order.
    pub const ALL: [Mood; 6] = [
        Mood::Idle,
        Mood::Curious,
        Mood::Happy,
        Mood::Excited,
        Mood::Sleepy,
        Mood::Talking,
    ];

    /// The mood `wake` returns to.
    pub const DEFAULT: Mood = Mood::Idle;

    /// The mood the idle timer forces.
    pub const DORMANT: Mood = Mood::Sleepy;

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Curious => "curious",
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Sleepy => "sleepy",
            Self::Talking => "talking",
        }
    }

    /// Presentation parameters for this mood.
    pub fn config(self) -> &'static MoodConfig {
        match self {
            Self::Idle => &IDLE,
            Self::Curious => &CURIOUS,
            Self::Happy => &HAPPY,
            Self::Excited => &EXCITED,
            Self::Sleepy => &SLEEPY,
            Self::Talking => &TALKING,
        }
    }

    pub fn is_dormant(self) -> bool {
        self == Self::DORMANT
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = MascotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" | "neutral" => Ok(Self::Idle),
            "curious" => Ok(Self::Curious),
            "happy" => Ok(Self::Happy),
            "excited" => Ok(Self::Excited),
            "sleepy" => Ok(Self::Sleepy),
            "talking" => Ok(Self::Talking),
            _ => Err(MascotError::UnknownMood(Arc::new(s.to_string()))),
        }
    }
}

/// Tuning values the rendering and audio layers read for a mood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodConfig {
    /// Breathing animation speed multiplier
    pub breathing_speed: f32,
    /// Vertical bounce amplitude
    pub bounce_amplitude: f32,
    /// Eye scale relative to the resting size
    pub eye_size: f32,
    /// Audio cue to play on entering the mood
    pub sound_key: Option<&'static str>,
}

const IDLE: MoodConfig = MoodConfig {
    breathing_speed: 1.0,
    bounce_amplitude: 0.1,
    eye_size: 1.0,
    sound_key: Some("idle-breath"),
};

const CURIOUS: MoodConfig = MoodConfig {
    breathing_speed: 1.2,
    bounce_amplitude: 0.15,
    eye_size: 1.2,
    sound_key: Some("curious-blip"),
};

const HAPPY: MoodConfig = MoodConfig {
    breathing_speed: 1.5,
    bounce_amplitude: 0.2,
    eye_size: 1.1,
    sound_key: Some("giggle-soft"),
};

const EXCITED: MoodConfig = MoodConfig {
    breathing_speed: 2.0,
    bounce_amplitude: 0.3,
    eye_size: 1.3,
    sound_key: Some("giggle-big"),
};

const SLEEPY: MoodConfig = MoodConfig {
    breathing_speed: 0.5,
    bounce_amplitude: 0.05,
    eye_size: 0.7,
    sound_key: Some("sleepy"),
};

const TALKING: MoodConfig = MoodConfig {
    breathing_speed: 1.3,
    bounce_amplitude: 0.12,
    eye_size: 1.0,
    sound_key: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("idle", Mood::Idle)]
    #[case("neutral", Mood::Idle)]
    #[case("Curious", Mood::Curious)]
    #[case(" happy ", Mood::Happy)]
    #[case("EXCITED", Mood::Excited)]
    #[case("sleepy", Mood::Sleepy)]
    #[case("talking", Mood::Talking)]
    fn test_parse_mood(#[case] input: &str, #[case] expected: Mood) {
        assert_eq!(input.parse::<Mood>().ok(), Some(expected));
    }

    #[test]
    fn test_parse_unknown_mood() {
        let err = "grumpy".parse::<Mood>();
        assert!(matches!(err, Err(MascotError::UnknownMood(_))));
    }

    #[test]
    fn test_display_matches_name() {
        for mood in Mood::ALL {
            assert_eq!(mood.to_string(), mood.name());
            assert_eq!(mood.name().parse::<Mood>().ok(), Some(mood));
        }
    }

    #[test]
    fn test_dormant_and_default() {
        assert!(Mood::Sleepy.is_dormant());
        assert!(!Mood::Idle.is_dormant());
        assert_eq!(Mood::default(), Mood::DEFAULT);
    }

    #[test]
    fn test_config_table() {
        assert_eq!(Mood::Sleepy.config().breathing_speed, 0.5);
        assert_eq!(Mood::Excited.config().sound_key, Some("giggle-big"));
        assert_eq!(Mood::Talking.config().sound_key, None);
        // Only the sleepy mood slows breathing below the baseline.
        for mood in Mood::ALL {
            let slow = mood.config().breathing_speed < 1.0;
            assert_eq!(slow, mood.is_dormant(), "{mood}");
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Mood::Curious).unwrap();
        assert_eq!(json, "\"curious\"");
        let parsed: Mood = serde_json::from_str("\"neutral\"").unwrap();
        assert_eq!(parsed, Mood::Idle);
    }
}
