//! # Mascot Mood
//!
//! Emotional core of an animated companion mascot: a small mood state
//! machine, an idle timer that puts the companion to sleep after a period
//! of inactivity, a typed observer hub that broadcasts every change, and a
//! bounded dialogue queue for the speech bubble.
//!
//! Rendering and audio playback live outside this crate; they subscribe to
//! mood changes through [`MoodObserver`].

pub mod clock;
pub mod companion;
pub mod config;
pub mod controller;
pub mod dialogue;
pub mod errors;
pub mod hub;
pub mod idle;
pub mod mood;
pub mod sound;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use companion::{Companion, CompanionStatus};
pub use config::{load_settings, save_settings, Settings};
pub use controller::{ControllerOptions, MoodController, WeakMoodController};
pub use dialogue::{DialogueQueue, Enqueued, OverflowPolicy};
pub use errors::{MascotError, Result};
pub use hub::{MoodObserver, NotificationHub, Subscription};
pub use idle::IdleTimer;
pub use mood::{Mood, MoodConfig};
pub use sound::SoundBoard;
