//! Edge-triggered notifications.

use std::fmt;

/// Callback invoked with the new value of a signal.
pub type SignalCallback<T> = Box<dyn FnMut(T) + Send>;

/// Undo/redo availability as shown by toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UndoAvailability {
    /// Something can be undone.
    pub can_undo: bool,
    /// Something can be redone.
    pub can_redo: bool,
}

/// A value whose subscribers are told only when it actually changes.
pub struct EdgeSignal<T> {
    value: T,
    callbacks: Vec<SignalCallback<T>>,
}

impl<T: Copy + PartialEq> EdgeSignal<T> {
    /// Create a signal holding `initial`. Subscribers are not called for it.
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            callbacks: Vec::new(),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.value
    }

    /// Register a callback for future transitions.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(T) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Store `value`, notifying subscribers if it differs from the current one.
    ///
    /// Returns `true` when a transition happened.
    pub fn set(&mut self, value: T) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        for callback in &mut self.callbacks {
            callback(value);
        }
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for EdgeSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeSignal")
            .field("value", &self.value)
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
