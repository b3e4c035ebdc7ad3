//! Mood State Controller.
//!
//! Single source of truth for the companion's current mood. Every change
//! goes through one request queue:
//!
//! - Requests are applied one at a time, and observers are notified with no
//!   lock held.
//! - A request made from inside a notification loop (an observer calling
//!   back in) is queued and applied, in order, once the running loop has
//!   drained its current delivery.
//! - A request from any other thread waits for the running loop to finish
//!   and then applies itself, so `set_mood(m)` is visible to its caller as
//!   soon as it returns. An observer must not block on another thread that
//!   is itself changing the mood.
//! - Conditions (`wake`, the idle check, the equality short-circuit) are
//!   evaluated when the request is applied, not when it was made.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::hub::{MoodObserver, NotificationHub, Subscription};
use crate::mood::{Mood, MoodConfig};

/// Default inactivity before the companion dozes off.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Construction options for [`MoodController`].
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub initial_mood: Mood,
    pub idle_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            initial_mood: Mood::DEFAULT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    /// Explicit caller transition; refreshes the interaction timestamp.
    Set(Mood),
    /// Back to the default mood, only if currently in the given mood.
    Settle(Mood),
    /// Timer tick: dormant transition once the idle threshold is exceeded.
    IdleCheck,
}

struct State {
    mood: Mood,
    last_interaction: Instant,
    /// Thread currently running a notification loop
    deliverer: Option<ThreadId>,
    pending: VecDeque<Request>,
}

struct Inner {
    state: Mutex<State>,
    drained: Condvar,
    hub: NotificationHub,
    clock: Arc<dyn Clock>,
    idle_timeout: Duration,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn idle_expired(&self, state: &State) -> bool {
        let elapsed = self.clock.now().saturating_duration_since(state.last_interaction);
        elapsed > self.idle_timeout
    }

    /// Resolves a request against the current state. Returns the new mood if
    /// a transition happened.
    fn apply(&self, state: &mut State, request: Request) -> Option<Mood> {
        let (target, explicit) = match request {
            Request::Set(mood) => (mood, true),
            Request::Settle(from) if state.mood == from => (Mood::DEFAULT, true),
            Request::Settle(_) => return None,
            Request::IdleCheck if !state.mood.is_dormant() && self.idle_expired(state) => {
                (Mood::DORMANT, false)
            }
            Request::IdleCheck => return None,
        };

        if state.mood == target {
            return None;
        }

        let previous = state.mood;
        state.mood = target;
        if explicit {
            state.last_interaction = self.clock.now();
            debug!(from = %previous, to = %target, "Mood changed");
        } else {
            info!(from = %previous, idle_timeout = ?self.idle_timeout, "Idle timeout reached, dozing off");
        }
        Some(target)
    }
}

/// Cheap-clone handle to a companion's mood state.
#[derive(Clone)]
pub struct MoodController {
    inner: Arc<Inner>,
}

impl MoodController {
    pub fn new(options: ControllerOptions, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    mood: options.initial_mood,
                    last_interaction: now,
                    deliverer: None,
                    pending: VecDeque::new(),
                }),
                drained: Condvar::new(),
                hub: NotificationHub::new(),
                clock,
                idle_timeout: options.idle_timeout,
            }),
        }
    }

    /// Default options on the system clock.
    pub fn with_defaults() -> Self {
        Self::new(ControllerOptions::default(), Arc::new(SystemClock))
    }

    pub fn mood(&self) -> Mood {
        self.inner.state().mood
    }

    /// Tuning values for the current mood.
    pub fn config(&self) -> &'static MoodConfig {
        self.mood().config()
    }

    /// Moves to `mood`. No-op, with no notification, if already there.
    pub fn set_mood(&self, mood: Mood) {
        self.submit(Request::Set(mood));
    }

    /// Returns from the dormant mood to the default one; no-op otherwise.
    pub fn wake(&self) {
        self.submit(Request::Settle(Mood::DORMANT));
    }

    /// Returns to the default mood if the current mood is still `from`.
    /// Used to end a timed emotion without clobbering a newer one.
    pub fn settle(&self, from: Mood) -> bool {
        self.submit(Request::Settle(from))
    }

    /// One idle tick. Returns `true` if this call put the companion to sleep.
    pub fn check_idle(&self) -> bool {
        self.submit(Request::IdleCheck)
    }

    /// Counts as user activity without changing mood.
    pub fn record_interaction(&self) {
        let now = self.inner.clock.now();
        self.inner.state().last_interaction = now;
    }

    pub fn last_interaction(&self) -> Instant {
        self.inner.state().last_interaction
    }

    /// Time since the last explicit transition or recorded interaction.
    pub fn idle_for(&self) -> Duration {
        let last = self.last_interaction();
        self.inner.clock.now().saturating_duration_since(last)
    }

    pub fn idle_timeout(&self) -> Duration {
        self.inner.idle_timeout
    }

    pub fn subscribe(&self, observer: Arc<dyn MoodObserver>) -> Subscription {
        self.inner.hub.subscribe(observer)
    }

    /// Closure shorthand for [`MoodController::subscribe`].
    pub fn subscribe_fn<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Mood, &MoodConfig) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(callback))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.hub.len()
    }

    pub fn downgrade(&self) -> WeakMoodController {
        WeakMoodController {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Applies `request` and anything queued behind it. Returns whether
    /// `request` itself caused a transition; requests queued from inside an
    /// observer report `false`.
    fn submit(&self, request: Request) -> bool {
        let me = thread::current().id();
        let mut state = self.inner.state();
        loop {
            match state.deliverer {
                None => break,
                Some(owner) if owner == me => {
                    debug!(?request, "Re-entrant request from observer, queueing");
                    state.pending.push_back(request);
                    return false;
                }
                Some(_) => {
                    state = self
                        .inner
                        .drained
                        .wait(state)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                }
            }
        }

        state.deliverer = Some(me);
        state.pending.push_front(request);

        let mut first = true;
        let mut changed = false;
        while let Some(next) = state.pending.pop_front() {
            let applied = self.inner.apply(&mut state, next);
            if first {
                changed = applied.is_some();
                first = false;
            }
            let Some(mood) = applied else {
                continue;
            };

            drop(state);
            self.inner.hub.notify(mood, mood.config());
            state = self.inner.state();
        }
        state.deliverer = None;
        drop(state);
        self.inner.drained.notify_all();
        changed
    }
}

impl fmt::Debug for MoodController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state();
        f.debug_struct("MoodController")
            .field("mood", &state.mood)
            .field("pending", &state.pending.len())
            .field("idle_timeout", &self.inner.idle_timeout)
            .field("hub", &self.inner.hub)
            .finish()
    }
}

/// Non-owning handle, used by background tasks so they never keep a
/// torn-down controller alive.
#[derive(Clone)]
pub struct WeakMoodController {
    inner: Weak<Inner>,
}

impl WeakMoodController {
    pub fn upgrade(&self) -> Option<MoodController> {
        self.inner.upgrade().map(|inner| MoodController { inner })
    }
}
