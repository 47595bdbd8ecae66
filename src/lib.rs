#![warn(missing_docs)]
#![warn(clippy::missing_panics_doc)]

//! Typed in-process publish/subscribe channels
//!
//! Each [Channel] serves one closed set of topics (usually an enum declared with
//! [declare]). Handlers attach per topic. [Channel::send] delivers immediately
//! to the handlers attached at that moment, [Channel::post] queues the message
//! until the next [Driver] tick. Handler failures are logged through `tracing`
//! and never interrupt delivery to the other handlers.

#[macro_use]
mod common;

pub mod channel;
pub mod driver;
pub mod error;
pub mod message;
pub mod payload;

pub use channel::{Channel, Handler, Topic};
pub use driver::{spawn_ticker, Driver, Tick};
pub use error::BusError;
pub use message::Message;
pub use payload::{Callback, CallbackWith, Items, Pair};

#[doc(hidden)]
pub use doc_comment::doc_comment as __doc_comment;

/// Declare [Topic] enums
///
/// Each declaration produces a fieldless enum deriving `Clone`, `Copy`,
/// `Debug`, `PartialEq`, `Eq` and `Hash`, its [Topic] implementation named
/// after the enum, and a `channel()` function returning the process-wide
/// [Channel] for it.
///
/// ## Syntax
///
/// `<visibility>? topic <name> { <variant>, ... }`
///
/// ## Example
///
/// ```rust
/// use std::sync::{
///     atomic::{AtomicBool, Ordering::SeqCst},
///     Arc,
/// };
/// use tickbus::{Handler, Message};
///
/// tickbus::declare! {
///     /// Window events
///     pub topic Window {
///         /// Focus changed, payload is the new focus state
///         Focus,
///         Close,
///     }
///
///     pub(crate) topic Audio { Mute }
/// }
///
/// let focused = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&focused);
/// let handler = Handler::new(move |message: &Message<Window>| {
///     if let Some(focus) = message.content::<bool>() {
///         flag.store(*focus, SeqCst);
///     }
/// });
///
/// let channel = Window::channel();
/// channel.attach(Window::Focus, &handler);
/// assert!(channel.send_with(Window::Focus, true));
/// assert!(focused.load(SeqCst));
///
/// // nobody listens to Close
/// assert!(!channel.send(Window::Close));
/// assert!(!Audio::channel().send(Audio::Mute));
/// ```
#[macro_export]
macro_rules! declare {
    () => {};

    (
        $(#[$attr:meta])*
        $v:vis topic $name:ident {
            $(
                $(#[$variant_attr:meta])*
                $variant:ident
            ),* $(,)?
        }
        $($next:tt)*
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $v enum $name {
            $(
                $(#[$variant_attr])*
                $variant,
            )*
        }

        impl $crate::Topic for $name {
            const DEBUG_NAME: &'static str = stringify!($name);
        }

        impl $name {
            $crate::__doc_comment! {
                concat!("Returns the process-wide channel for ", stringify!($name)),
                $v fn channel() -> ::std::sync::Arc<$crate::Channel<$name>> {
                    $crate::Channel::global()
                }
            }
        }

        $crate::declare!($($next)*);
    };
}
