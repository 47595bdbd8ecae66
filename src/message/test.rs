use super::*;
use crate::{Driver, Pair};

crate::declare! {
    topic Scene { Loaded, Unloaded }
}

fn channel() -> Arc<Channel<Scene>> {
    Channel::with_driver(Arc::new(Driver::new()))
}

#[test]
fn defaults() {
    let message = Message::new(Scene::Loaded);
    assert_eq!(message.topic(), Scene::Loaded);
    assert!(!message.is_async());
    assert!(!message.has_payload());
    assert_eq!(message.payload_type(), "()");
    assert!(message.channel().is_none());

    let message = Message::with_payload(Scene::Unloaded, 7u8).deferred();
    assert!(message.is_async());
    assert!(message.has_payload());
    assert_eq!(message.payload_type(), "u8");
}

#[test]
fn content_checks_type() {
    let message = Message::with_payload(Scene::Loaded, 42i32);
    assert_eq!(message.content::<i32>(), Some(&42));
    assert_eq!(message.content::<String>(), None);
    assert_eq!(
        message.try_content::<u64>(),
        Err(BusError::PayloadTypeMismatch {
            expected: "u64",
            found: "i32",
        })
    );
}

#[test]
fn content_without_payload_is_mismatch() {
    let message = Message::new(Scene::Loaded);
    assert!(message.content::<()>().is_none());
    assert!(matches!(
        message.try_content::<i32>(),
        Err(BusError::PayloadTypeMismatch { found: "()", .. })
    ));
}

#[test]
fn structured_payload() {
    let message = Message::with_payload(Scene::Loaded, Pair::new("intro", 3usize));
    let pair = message.content::<Pair<&str, usize>>().unwrap();
    assert_eq!(*pair.first(), "intro");
    assert_eq!(*pair.second(), 3);
}

#[test]
fn back_reference_is_write_once() {
    let first = channel();
    let second = channel();
    let message = Arc::new(Message::new(Scene::Loaded).deferred());

    assert!(first.send_message(Arc::clone(&message)));
    assert!(Arc::ptr_eq(&message.channel().unwrap(), &first));

    assert!(second.send_message(Arc::clone(&message)));
    assert!(Arc::ptr_eq(&message.channel().unwrap(), &first));
    assert_eq!(second.pending_len(), 1);
}

#[test]
fn back_reference_does_not_keep_channel_alive() {
    let message = Arc::new(Message::new(Scene::Loaded));
    {
        let channel = channel();
        channel.send_message(Arc::clone(&message));
    }
    assert!(message.channel().is_none());
}
