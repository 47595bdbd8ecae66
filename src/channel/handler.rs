use super::Topic;
use crate::Message;
use std::{fmt, ptr, sync::Arc};

type HandlerFn<T> = dyn Fn(&Message<T>) -> Result<(), String> + Send + Sync;

/// Listener callback for a [Channel](super::Channel)
///
/// Cloning a handler is cheap and keeps its identity: a clone can detach the
/// original. Two handlers built from the same closure code are still distinct.
pub struct Handler<T: Topic> {
    inner: Arc<HandlerFn<T>>,
}

impl<T: Topic> Handler<T> {
    /// Wraps an infallible callback
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Message<T>) + Send + Sync + 'static,
    {
        let inner: Arc<HandlerFn<T>> = Arc::new(move |message: &Message<T>| -> Result<(), String> {
            f(message);
            Ok(())
        });
        Self { inner }
    }

    /// Wraps a callback whose errors are reported as delivery failures
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&Message<T>) -> Result<(), E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let inner: Arc<HandlerFn<T>> = Arc::new(move |message: &Message<T>| -> Result<(), String> {
            f(message).map_err(|e| e.to_string())
        });
        Self { inner }
    }

    /// `true` if both are the same handler
    pub fn same(&self, other: &Self) -> bool {
        ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }

    pub(crate) fn call(&self, message: &Message<T>) -> Result<(), String> {
        (self.inner)(message)
    }
}

impl<T: Topic> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Topic> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&(Arc::as_ptr(&self.inner) as *const ()))
            .finish()
    }
}
