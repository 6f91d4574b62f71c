//! Observable events for interactive components
//!
//! An [`Event`] keeps a list of handlers behind a mutex. Emitting copies the
//! list into a local snapshot under the lock and invokes the handlers after
//! the lock is released, so a handler may subscribe or unsubscribe (itself
//! included) while it runs.
//!
//! # Example
//!
//! ```ignore
//! let clicked = Event::<ClickEvent>::new();
//! let id = clicked.subscribe(|e| log::info!("clicked {:?}", e.entity));
//! clicked.emit(&ClickEvent { .. });
//! clicked.unsubscribe(id);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec2;
use hecs::Entity;

use crate::input::MouseButton;

/// Identifies a subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A list of callbacks invoked with `&T`
pub struct Event<T> {
    handlers: Mutex<Vec<(HandlerId, Handler<T>)>>,
    next_id: AtomicU64,
}

impl<T> Event<T> {
    /// Create an event with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(HandlerId, Handler<T>)>> {
        // Handlers never run under the lock; a poisoned list is intact
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a handler
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not registered
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    /// Invoke every handler registered at the time of the call
    pub fn emit(&self, args: &T) {
        let snapshot: Vec<Handler<T>> = self.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in snapshot {
            handler(args);
        }
    }

    /// Number of registered handlers
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.lock().len()
    }

    /// Remove all handlers
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Pointer entered or left a clickable area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEvent {
    /// Entity owning the clickable
    pub entity: Option<Entity>,
    /// True when the pointer is now over the area
    pub hovered: bool,
}

/// A clickable was activated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Entity owning the clickable
    pub entity: Option<Entity>,
    /// Pointer position at the time of the click
    pub position: Vec2,
    /// Button that triggered the click (`None` for keyboard/gamepad activation)
    pub button: Option<MouseButton>,
}
