//! # Payload containers
//!
//! Small carriers for structured payloads, so callers do not need a dedicated
//! type for every message shape. They are read back in handlers with
//! [Message::content](crate::Message::content).

use parking_lot::Mutex;
use std::{fmt, sync::Arc};

#[cfg(test)]
mod test;

/// Two values travelling together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair<A, B> {
    first: A,
    second: B,
}

impl<A, B> Pair<A, B> {
    /// Creates a pair
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// First value
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Second value
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Splits the pair into a tuple
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

/// Ordered list of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Items<T> {
    items: Vec<T>,
}

impl<T> Items<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Items in insertion order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> Items<T> {
    /// Copy of the items
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T> Default for Items<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Items<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Items<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

type CallbackFn<A> = dyn Fn(A) + Send + Sync;

/// Callback a handler can run on behalf of the sender
///
/// Shared through a payload, so it is cleared through `&self`. A cleared
/// callback does nothing when executed.
pub struct Callback {
    inner: CallbackWith<()>,
}

impl Callback {
    /// Wraps `f`
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: CallbackWith::new(move |()| f()),
        }
    }

    /// Runs the callback unless it was cleared
    pub fn execute(&self) {
        self.inner.execute(());
    }

    /// Drops the callback
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// `true` until [clear](Self::clear) is called
    pub fn is_set(&self) -> bool {
        self.inner.is_set()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// [Callback] taking one argument
pub struct CallbackWith<A> {
    callback: Mutex<Option<Arc<CallbackFn<A>>>>,
}

impl<A> CallbackWith<A> {
    /// Wraps `f`
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let callback: Arc<CallbackFn<A>> = Arc::new(f);
        Self {
            callback: Mutex::new(Some(callback)),
        }
    }

    /// Runs the callback with `arg` unless it was cleared
    pub fn execute(&self, arg: A) {
        // cloned out so the callback may clear itself
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(arg);
        }
    }

    /// Drops the callback
    pub fn clear(&self) {
        let callback = self.callback.lock().take();
        drop(callback);
    }

    /// `true` until [clear](Self::clear) is called
    pub fn is_set(&self) -> bool {
        self.callback.lock().is_some()
    }
}

impl<A> fmt::Debug for CallbackWith<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackWith")
            .field("is_set", &self.is_set())
            .finish()
    }
}
