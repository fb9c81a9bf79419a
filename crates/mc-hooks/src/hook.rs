//! Ordered observer lists.

use std::sync::Arc;

/// Unique identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

impl ObserverId {
    /// Create a new observer ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Type-erased observer function.
pub(crate) type ObserverFn<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

struct Registered<E> {
    id: ObserverId,
    callback: ObserverFn<E>,
}

/// A named extension point.
///
/// Observers run synchronously, in registration order, each with mutable
/// access to the event so later observers see what earlier ones changed.
pub struct Hook<E> {
    name: &'static str,
    observers: Vec<Registered<E>>,
    next_observer_id: u32,
}

impl<E> Hook<E> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Register an observer. Returns an ID that can be used to remove it.
    pub fn add<F>(&mut self, callback: F) -> ObserverId
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let id = ObserverId::new(self.next_observer_id);
        self.next_observer_id += 1;

        self.observers.push(Registered {
            id,
            callback: Arc::new(callback),
        });
        tracing::debug!(hook = self.name, id = id.raw(), "observer added");

        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);

        let removed = self.observers.len() != before;
        if removed {
            tracing::debug!(hook = self.name, id = id.raw(), "observer removed");
        }
        removed
    }

    /// Run every observer on `event`.
    pub fn fire(&self, event: &mut E) {
        for observer in &self.observers {
            (observer.callback)(event);
        }
    }

    /// Current observers in registration order, detached from the list so
    /// they can run after a lock on the hook is released.
    pub(crate) fn snapshot(&self) -> Vec<ObserverFn<E>> {
        self.observers
            .iter()
            .map(|observer| Arc::clone(&observer.callback))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> core::fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
