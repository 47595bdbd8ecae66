//! # Messages
//!
//! A [Message] is the envelope every delivery goes through: a topic, an optional
//! payload of any `'static` type, the async flag and a back-reference to the
//! channel that dispatched it. Everything is fixed when the message is built,
//! except the back-reference, which is bound once by the first
//! [Channel::send_message](crate::Channel::send_message) and never changes after.

use crate::{channel::Channel, error::BusError, Topic};
use once_cell::sync::OnceCell;
use std::{
    any::{type_name, Any},
    fmt,
    sync::{Arc, Weak},
};
use tracing::{debug, error};

#[cfg(test)]
mod test;

type Payload = Box<dyn Any + Send + Sync>;

/// Envelope delivered to [Handler](crate::Handler)s
pub struct Message<T: Topic> {
    topic: T,
    payload: Option<Payload>,
    payload_type: &'static str,
    is_async: bool,
    channel: OnceCell<Weak<Channel<T>>>,
}

impl<T: Topic> Message<T> {
    /// Creates a synchronous message without payload
    pub fn new(topic: T) -> Self {
        Self {
            topic,
            payload: None,
            payload_type: type_name::<()>(),
            is_async: false,
            channel: OnceCell::new(),
        }
    }

    /// Creates a synchronous message carrying `payload`
    pub fn with_payload<P: Any + Send + Sync>(topic: T, payload: P) -> Self {
        Self {
            payload: Some(Box::new(payload)),
            payload_type: type_name::<P>(),
            ..Self::new(topic)
        }
    }

    /// Marks the message for delivery on the next driver tick
    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Topic of this message
    pub fn topic(&self) -> T {
        self.topic
    }

    /// `true` when the message is delivered on the next tick instead of immediately
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// `true` when a payload is attached
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Type name of the payload, `()` when there is none
    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }

    /// Untyped access to the payload
    pub fn payload(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.payload.as_deref()
    }

    /// Reads the payload as `C`
    ///
    /// Returns [BusError::PayloadTypeMismatch] when the payload is missing
    /// or has another type.
    pub fn try_content<C: Any>(&self) -> Result<&C, BusError> {
        self.payload
            .as_deref()
            .and_then(|payload| payload.downcast_ref::<C>())
            .ok_or(BusError::PayloadTypeMismatch {
                expected: type_name::<C>(),
                found: self.payload_type,
            })
    }

    /// Reads the payload as `C`, logging the mismatch and returning `None`
    /// when it is not one
    pub fn content<C: Any>(&self) -> Option<&C> {
        match self.try_content() {
            Ok(content) => Some(content),
            Err(err) => {
                error!(
                    channel = T::DEBUG_NAME,
                    topic = ?self.topic,
                    label = err.as_label(),
                    "{err}"
                );
                None
            }
        }
    }

    /// Channel this message was sent through
    ///
    /// `None` before the first send, or once that channel is gone.
    pub fn channel(&self) -> Option<Arc<Channel<T>>> {
        self.channel.get().and_then(Weak::upgrade)
    }

    /// Binds the back-reference; later binds keep the first channel
    pub(crate) fn bind(&self, channel: &Weak<Channel<T>>) -> bool {
        if self.channel.set(channel.clone()).is_ok() {
            return true;
        }
        let rebound = self
            .channel
            .get()
            .is_some_and(|bound| !bound.ptr_eq(channel));
        if rebound {
            debug!(
                channel = T::DEBUG_NAME,
                topic = ?self.topic,
                "message already bound to another channel, keeping the first one"
            );
        }
        false
    }
}

impl<T: Topic> fmt::Debug for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("channel", &T::DEBUG_NAME)
            .field("topic", &self.topic)
            .field("payload_type", &self.payload_type)
            .field("is_async", &self.is_async)
            .finish()
    }
}
