//! # Channels
//!
//! A [Channel] is an isolated bus for one [Topic] type. Listeners attach per
//! topic and are invoked in registration order. Synchronous sends dispatch
//! immediately; asynchronous ones are queued and flushed on the next
//! [Driver](crate::Driver) tick.
//!
//! Every dispatch runs against a snapshot: the pending queue is taken before a
//! flush and the listener list is copied before each delivery, so attach and
//! detach calls made by handlers only affect later deliveries.
//! No lock is held while a handler runs, handlers may use the channel freely.

use crate::{
    driver::{self, Driver, Tick},
    error::BusError,
    Message,
};
use parking_lot::Mutex;
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    hash::Hash,
    mem,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Weak},
};
use tracing::{debug, error, trace, warn};

mod handler;
mod registry;


pub use handler::Handler;

/// A closed set of topic values keying one [Channel] type
///
/// Usually implemented with [declare](crate::declare).
pub trait Topic: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Channel name in debug messages
    const DEBUG_NAME: &'static str;
}

/// Publish/subscribe bus for the topics of `T`
pub struct Channel<T: Topic> {
    me: Weak<Self>,
    driver: Arc<Driver>,
    state: Mutex<State<T>>,
}

struct State<T: Topic> {
    listeners: HashMap<T, Vec<Handler<T>>>,
    pending: Vec<Arc<Message<T>>>,
    attached: bool,
}

impl<T: Topic> Channel<T> {
    /// Creates an independent channel flushed by the process-wide driver
    pub fn new() -> Arc<Self> {
        Self::with_driver(driver::global())
    }

    /// Creates an independent channel flushed by `driver`
    pub fn with_driver(driver: Arc<Driver>) -> Arc<Self> {
        let channel = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            driver,
            state: Mutex::new(State {
                listeners: HashMap::new(),
                pending: Vec::new(),
                attached: false,
            }),
        });
        registry::register(&channel);
        channel
    }

    /// Returns the process-wide channel for `T`, creating it on first use
    pub fn global() -> Arc<Self> {
        registry::global()
    }

    /// Snapshot of all live channels of type `T`, oldest first
    pub fn instances() -> Vec<Arc<Self>> {
        registry::instances()
    }

    /// Driver flushing this channel's deferred messages
    pub fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    /// Registers `handler` for `topic`, logging a warning if it is already there
    pub fn attach(&self, topic: T, handler: &Handler<T>) {
        if let Err(err) = self.try_attach(topic, handler) {
            warn!(channel = T::DEBUG_NAME, label = err.as_label(), "{err}");
        }
    }

    /// Registers `handler` for `topic`
    ///
    /// Fails with [BusError::DuplicateRegistration] without touching the
    /// registry if the handler is already attached to this topic.
    pub fn try_attach(&self, topic: T, handler: &Handler<T>) -> Result<(), BusError> {
        let mut state = self.state.lock();
        let list = state.listeners.entry(topic).or_default();
        if list.iter().any(|h| h.same(handler)) {
            return Err(BusError::DuplicateRegistration {
                channel: T::DEBUG_NAME,
                topic: format!("{topic:?}"),
            });
        }
        list.push(handler.clone());
        Ok(())
    }

    /// Removes `handler` from `topic`, logging a warning if it was not attached
    pub fn detach(&self, topic: T, handler: &Handler<T>) {
        if let Err(err) = self.try_detach(topic, handler) {
            warn!(channel = T::DEBUG_NAME, label = err.as_label(), "{err}");
        }
    }

    /// Removes `handler` from `topic`
    ///
    /// The topic entry is dropped together with its last handler.
    pub fn try_detach(&self, topic: T, handler: &Handler<T>) -> Result<(), BusError> {
        let mut state = self.state.lock();
        let missing = || BusError::MissingRegistration {
            channel: T::DEBUG_NAME,
            topic: format!("{topic:?}"),
        };
        let list = state.listeners.get_mut(&topic).ok_or_else(missing)?;
        let index = list
            .iter()
            .position(|h| h.same(handler))
            .ok_or_else(missing)?;
        let removed = list.remove(index);
        if list.is_empty() {
            state.listeners.remove(&topic);
        }
        drop(state);
        drop(removed);
        Ok(())
    }

    /// Removes every listener, and the queued messages if `clear_pending`
    ///
    /// A scheduled flush still runs and finds nothing to deliver.
    pub fn detach_all(&self, clear_pending: bool) {
        let mut state = self.state.lock();
        let listeners = mem::take(&mut state.listeners);
        let pending = if clear_pending {
            mem::take(&mut state.pending)
        } else {
            Vec::new()
        };
        drop(state);
        debug!(
            channel = T::DEBUG_NAME,
            topics = listeners.len(),
            discarded = pending.len(),
            "detached all listeners"
        );
    }

    /// Sends a payload-less message synchronously
    pub fn send(&self, topic: T) -> bool {
        self.send_message(Message::new(topic))
    }

    /// Sends `payload` synchronously
    pub fn send_with<P: Any + Send + Sync>(&self, topic: T, payload: P) -> bool {
        self.send_message(Message::with_payload(topic, payload))
    }

    /// Queues a payload-less message for the next tick
    pub fn post(&self, topic: T) -> bool {
        self.send_message(Message::new(topic).deferred())
    }

    /// Queues `payload` for the next tick
    pub fn post_with<P: Any + Send + Sync>(&self, topic: T, payload: P) -> bool {
        self.send_message(Message::with_payload(topic, payload).deferred())
    }

    /// Dispatches or queues `message` depending on [Message::is_async]
    ///
    /// A synchronous message returns `false` when nobody listens to its topic.
    /// Asynchronous messages are always accepted, listeners may attach before
    /// the next tick.
    pub fn send_message(&self, message: impl Into<Arc<Message<T>>>) -> bool {
        let message = message.into();
        message.bind(&self.me);
        let topic = message.topic();

        if message.is_async() {
            let mut state = self.state.lock();
            state.pending.push(message);
            if !state.attached {
                state.attached = self.attach_to_driver();
            }
            trace!(
                channel = T::DEBUG_NAME,
                topic = ?topic,
                pending = state.pending.len(),
                "message queued"
            );
            return true;
        }

        match self.snapshot(topic) {
            Some(handlers) => {
                self.deliver(&message, &handlers);
                true
            }
            None => false,
        }
    }

    /// `true` if at least one handler is attached to `topic`
    pub fn has_listeners(&self, topic: T) -> bool {
        self.state.lock().listeners.contains_key(&topic)
    }

    /// Number of handlers attached to `topic`
    pub fn listener_count(&self, topic: T) -> usize {
        self.state.lock().listeners.get(&topic).map_or(0, Vec::len)
    }

    /// Number of messages waiting for the next tick
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// `true` while the channel is registered with its driver
    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    fn flush(&self) {
        let batch = {
            let mut state = self.state.lock();
            // detach before delivery so posts made by handlers schedule a new flush
            if state.attached {
                state.attached = false;
                self.detach_from_driver();
            }
            mem::take(&mut state.pending)
        };
        if batch.is_empty() {
            return;
        }

        debug!(
            channel = T::DEBUG_NAME,
            messages = batch.len(),
            "flushing deferred messages"
        );
        for message in &batch {
            let Some(handlers) = self.snapshot(message.topic()) else {
                trace!(
                    channel = T::DEBUG_NAME,
                    topic = ?message.topic(),
                    "no listeners, message dropped"
                );
                continue;
            };
            self.deliver(message, &handlers);
        }
    }

    fn snapshot(&self, topic: T) -> Option<Vec<Handler<T>>> {
        self.state.lock().listeners.get(&topic).map(|list| list.to_vec())
    }

    fn deliver(&self, message: &Message<T>, handlers: &[Handler<T>]) {
        for handler in handlers {
            let reason = match panic::catch_unwind(AssertUnwindSafe(|| handler.call(message))) {
                Ok(Ok(())) => continue,
                Ok(Err(reason)) => reason,
                Err(panic) => panic_message(&*panic),
            };
            let err = BusError::DeliveryFailure {
                channel: T::DEBUG_NAME,
                topic: format!("{:?}", message.topic()),
                reason,
            };
            error!(
                channel = T::DEBUG_NAME,
                label = err.as_label(),
                payload = message.payload_type(),
                "{err}"
            );
        }
    }

    // Called with the state lock held.
    fn attach_to_driver(&self) -> bool {
        let Some(this) = self.me.upgrade() else {
            return false;
        };
        if let Err(err) = self.driver.add(this) {
            error!(channel = T::DEBUG_NAME, label = err.as_label(), "{err}");
        }
        true
    }

    // Called with the state lock held.
    fn detach_from_driver(&self) {
        let Some(this) = self.me.upgrade() else {
            return;
        };
        let this: Arc<dyn Tick> = this;
        if let Err(err) = self.driver.remove(&this) {
            error!(channel = T::DEBUG_NAME, label = err.as_label(), "{err}");
        }
    }
}

impl<T: Topic> Tick for Channel<T> {
    fn tick(&self) {
        self.flush();
    }
}

impl<T: Topic> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("name", &T::DEBUG_NAME)
            .field("topics", &state.listeners.len())
            .field("pending", &state.pending.len())
            .field("attached", &state.attached)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}
