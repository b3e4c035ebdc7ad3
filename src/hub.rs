//! Notification Hub.
//!
//! Typed registry of mood observers. Delivery is synchronous and each
//! observer call is isolated, so one panicking observer neither stops the
//! others from hearing about the change nor takes the controller down.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

use crate::mood::{Mood, MoodConfig};

/// Receives every mood change the controller applies.
pub trait MoodObserver: Send + Sync {
    fn on_mood_change(&self, mood: Mood, config: &MoodConfig);
}

impl<F> MoodObserver for F
where
    F: Fn(Mood, &MoodConfig) + Send + Sync,
{
    fn on_mood_change(&self, mood: Mood, config: &MoodConfig) {
        self(mood, config);
    }
}

struct Entry {
    id: u64,
    active: Arc<AtomicBool>,
    observer: Arc<dyn MoodObserver>,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl HubInner {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        // Observers never run under this lock, so poisoning carries no torn state.
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        let removed = {
            let mut entries = self.entries();
            entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|i| entries.remove(i))
        };
        // Observers may own subscriptions of their own; drop them unlocked.
        drop(removed);
    }
}

/// Set of registered observers.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Registrations are never de-duplicated.
    pub fn subscribe(&self, observer: Arc<dyn MoodObserver>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner.entries().push(Entry {
            id,
            active: Arc::clone(&active),
            observer,
        });
        debug!(subscriber = id, "Observer subscribed");

        Subscription {
            id,
            active,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `(mood, config)` to every active observer.
    ///
    /// Returns how many observers completed without panicking. Observers
    /// unsubscribed while delivery is in progress are skipped.
    pub fn notify(&self, mood: Mood, config: &MoodConfig) -> usize {
        let snapshot: Vec<(u64, Arc<AtomicBool>, Arc<dyn MoodObserver>)> = self
            .inner
            .entries()
            .iter()
            .map(|e| (e.id, Arc::clone(&e.active), Arc::clone(&e.observer)))
            .collect();

        let mut delivered = 0;
        for (id, active, observer) in snapshot {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| observer.on_mood_change(mood, config))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    warn!(
                        subscriber = id,
                        %mood,
                        "Observer panicked during notification: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        delivered
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by [`NotificationHub::subscribe`].
///
/// Dropping the handle unsubscribes, so keep it for as long as the observer
/// should hear about changes.
#[must_use = "dropping the subscription unsubscribes the observer immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops all further deliveries to this observer. Idempotent.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
        debug!(subscriber = self.id, "Observer unsubscribed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
