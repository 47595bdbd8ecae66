use super::*;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

#[test]
fn pair() {
    let pair = Pair::new("menu", 2u8);
    assert_eq!(*pair.first(), "menu");
    assert_eq!(*pair.second(), 2);
    assert_eq!(pair.into_inner(), ("menu", 2));
    assert_eq!(Pair::from((1, true)), Pair::new(1, true));
}

#[test]
fn items_keep_insertion_order() {
    let mut items = Items::new();
    assert!(items.is_empty());
    items.push("a");
    items.push("b");
    items.push("c");
    assert_eq!(items.len(), 3);
    assert_eq!(items.items(), ["a", "b", "c"]);

    let mut copy = items.to_vec();
    copy.push("d");
    assert_eq!(items.len(), 3);

    let collected: Items<i32> = (1..=3).collect();
    assert_eq!(collected.into_iter().sum::<i32>(), 6);
    assert_eq!(Items::from(vec![1, 2]).items(), [1, 2]);
}

#[test]
fn callback_runs_until_cleared() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let callback = Callback::new(move || {
        counter.fetch_add(1, SeqCst);
    });

    callback.execute();
    callback.execute();
    assert_eq!(hits.load(SeqCst), 2);
    assert!(callback.is_set());

    callback.clear();
    callback.execute();
    assert_eq!(hits.load(SeqCst), 2);
    assert!(!callback.is_set());
}

#[test]
fn callback_with_argument() {
    let total = Arc::new(AtomicUsize::new(0));
    let sum = Arc::clone(&total);
    let callback = CallbackWith::new(move |n: usize| {
        sum.fetch_add(n, SeqCst);
    });

    callback.execute(3);
    callback.execute(4);
    assert_eq!(total.load(SeqCst), 7);

    callback.clear();
    callback.execute(100);
    assert_eq!(total.load(SeqCst), 7);
}

#[test]
fn callback_can_clear_itself() {
    let hits = Arc::new(AtomicUsize::new(0));
    let slot: Arc<OnceCell<Arc<Callback>>> = Arc::new(OnceCell::new());
    let callback = Arc::new(Callback::new({
        let hits = Arc::clone(&hits);
        let slot = Arc::clone(&slot);
        move || {
            hits.fetch_add(1, SeqCst);
            if let Some(me) = slot.get() {
                me.clear();
            }
        }
    }));
    assert!(slot.set(Arc::clone(&callback)).is_ok());

    callback.execute();
    callback.execute();
    assert_eq!(hits.load(SeqCst), 1);
    assert!(!callback.is_set());
}
