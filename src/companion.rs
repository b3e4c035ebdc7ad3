//! Companion.
//!
//! Top-level owner of one mascot: mood controller, idle timer, dialogue
//! queue and sound board. Created once per session and passed around by
//! reference; dropping it releases every background task it started.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::Settings;
use crate::controller::MoodController;
use crate::dialogue::{DialogueQueue, Enqueued};
use crate::errors::Result;
use crate::hub::Subscription;
use crate::idle::IdleTimer;
use crate::mood::{Mood, MoodConfig};
use crate::sound::SoundBoard;

/// Point-in-time view of the companion.
#[derive(Debug, Clone, Serialize)]
pub struct CompanionStatus {
    pub mood: Mood,
    pub config: MoodConfig,
    pub idle_ms: u64,
    pub speaking: bool,
    pub pending_lines: usize,
    pub muted: bool,
    pub last_sound: Option<&'static str>,
}

pub struct Companion {
    controller: MoodController,
    dialogue: DialogueQueue,
    speaking: bool,
    sound: Arc<SoundBoard>,
    sound_subscription: Subscription,
    timer: IdleTimer,
    revert: Option<JoinHandle<()>>,
    happy_duration: Duration,
    excited_duration: Duration,
}

impl Companion {
    /// Builds the companion and starts its idle timer. Needs a tokio runtime.
    pub fn start(settings: &Settings, clock: Arc<dyn Clock>) -> Result<Self> {
        settings.validate()?;

        let controller = MoodController::new(settings.controller_options(), clock);
        let sound = Arc::new(SoundBoard::new(settings.volume, settings.muted));
        let sound_subscription = controller.subscribe(sound.clone());
        let timer = IdleTimer::start(&controller, settings.tick_interval());

        info!(mood = %controller.mood(), "Companion started");
        Ok(Self {
            controller,
            dialogue: DialogueQueue::new(settings.dialogue_capacity, settings.overflow),
            speaking: false,
            sound,
            sound_subscription,
            timer,
            revert: None,
            happy_duration: settings.happy_duration(),
            excited_duration: settings.excited_duration(),
        })
    }

    pub fn controller(&self) -> &MoodController {
        &self.controller
    }

    pub fn sound(&self) -> &SoundBoard {
        &self.sound
    }

    pub fn mood(&self) -> Mood {
        self.controller.mood()
    }

    pub fn set_mood(&self, mood: Mood) {
        self.controller.set_mood(mood);
    }

    pub fn wake(&self) {
        self.controller.wake();
    }

    pub fn touch(&self) {
        self.controller.record_interaction();
    }

    pub fn make_happy(&mut self) {
        self.burst(Mood::Happy, self.happy_duration);
    }

    pub fn make_excited(&mut self) {
        self.burst(Mood::Excited, self.excited_duration);
    }

    pub fn make_sleepy(&mut self) {
        self.cancel_revert();
        self.controller.set_mood(Mood::Sleepy);
    }

    /// Holds `mood` for `hold`, then settles back unless something newer
    /// has taken over. A new burst replaces any pending revert.
    fn burst(&mut self, mood: Mood, hold: Duration) {
        self.cancel_revert();
        self.controller.set_mood(mood);

        let weak = self.controller.downgrade();
        self.revert = Some(tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            if let Some(controller) = weak.upgrade() {
                if controller.settle(mood) {
                    debug!(%mood, "Emotion burst ended");
                }
            }
        }));
    }

    fn cancel_revert(&mut self) {
        if let Some(handle) = self.revert.take() {
            handle.abort();
        }
    }

    /// Queues a line for the speech bubble and marks the companion speaking.
    pub fn speak(&mut self, line: impl Into<String>) -> Enqueued {
        let outcome = self.dialogue.push(line);
        self.speaking = true;
        outcome
    }

    pub fn stop_speaking(&mut self) {
        self.speaking = false;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Next line for the display layer.
    pub fn next_line(&mut self) -> Option<String> {
        self.dialogue.pop()
    }

    pub fn dialogue(&self) -> &DialogueQueue {
        &self.dialogue
    }

    pub fn clear_dialogue(&mut self) -> usize {
        self.dialogue.clear()
    }

    pub fn status(&self) -> CompanionStatus {
        let mood = self.controller.mood();
        CompanionStatus {
            mood,
            config: *mood.config(),
            idle_ms: u64::try_from(self.controller.idle_for().as_millis()).unwrap_or(u64::MAX),
            speaking: self.speaking,
            pending_lines: self.dialogue.len(),
            muted: self.sound.is_muted(),
            last_sound: self.sound.last_played(),
        }
    }

    /// Stops the idle timer and any pending revert. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        self.cancel_revert();
        self.sound_subscription.unsubscribe();
    }
}

impl Drop for Companion {
    fn drop(&mut self) {
        self.shutdown();
    }
}
