use std::fmt;

use indexmap::IndexMap;

use crate::core::Viewport;

/// Notification delivered by the host to a live chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resized(Viewport),
    ThemeChanged { dark_mode: bool },
    /// The page scrolled; open tooltips are hidden.
    Scrolled,
    /// The backend reported a data-zoom change.
    DataZoom,
}

/// Registration returned by [`ValueSubject::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// Current-value observable.
///
/// New listeners receive the current value immediately. Every `next` call
/// is delivered, equal values included; after `complete` nothing is.
pub struct ValueSubject<T> {
    value: T,
    listeners: IndexMap<u64, Listener<T>>,
    next_id: u64,
    completed: bool,
}

impl<T> ValueSubject<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            listeners: IndexMap::new(),
            next_id: 0,
            completed: false,
        }
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns `None` once the subject is completed.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&T) + 'static) -> Option<ListenerId> {
        if self.completed {
            return None;
        }
        listener(&self.value);
        self.next_id += 1;
        self.listeners.insert(self.next_id, Box::new(listener));
        Some(ListenerId(self.next_id))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.shift_remove(&id.0).is_some()
    }

    /// Stores and publishes `value`. Ignored after completion.
    pub fn next(&mut self, value: T) {
        if self.completed {
            return;
        }
        self.value = value;
        for listener in self.listeners.values_mut() {
            listener(&self.value);
        }
    }

    /// Drops every listener and stops further publication.
    pub fn complete(&mut self) {
        self.completed = true;
        self.listeners.clear();
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSubject")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .field("completed", &self.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::ValueSubject;

    #[test]
    fn replays_current_value_and_stops_after_complete() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subject = ValueSubject::new(1.0);
        let sink = Rc::clone(&seen);
        let id = subject
            .subscribe(move |value: &f64| sink.borrow_mut().push(*value))
            .expect("open subject accepts listeners");

        subject.next(2.0);
        subject.complete();
        subject.next(3.0);

        assert_eq!(*seen.borrow(), vec![1.0, 2.0]);
        assert!(!subject.unsubscribe(id));
        assert!(subject.subscribe(|_| {}).is_none());
    }
}
