use super::*;
use crate::{Channel, Handler};

crate::declare! {
    topic Frame { Begin, End }
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Tick for Recorder {
    fn tick(&self) {
        self.log.lock().push(self.name);
    }
}

fn recorder(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn Tick> {
    Arc::new(Recorder {
        name,
        log: Arc::clone(log),
    })
}

#[test]
fn bookkeeping() {
    let driver = Driver::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let a = recorder("a", &log);

    assert!(driver.is_empty());
    assert_eq!(driver.add(Arc::clone(&a)), Ok(()));
    assert_eq!(
        driver.add(Arc::clone(&a)),
        Err(BusError::DuplicateDriverCallback)
    );
    assert_eq!(driver.len(), 1);
    assert!(driver.contains(&a));

    assert_eq!(driver.remove(&a), Ok(()));
    assert_eq!(driver.remove(&a), Err(BusError::MissingDriverCallback));
    assert!(!driver.contains(&a));
}

#[test]
fn tick_invokes_each_callback_once_newest_first() {
    let driver = Driver::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    driver.add(recorder("a", &log)).unwrap();
    driver.add(recorder("b", &log)).unwrap();

    driver.tick();
    assert_eq!(*log.lock(), ["b", "a"]);

    driver.tick();
    assert_eq!(*log.lock(), ["b", "a", "b", "a"]);
}

struct SelfRemoving {
    driver: Arc<Driver>,
    me: Mutex<Option<Arc<dyn Tick>>>,
    hits: Mutex<usize>,
}

impl Tick for SelfRemoving {
    fn tick(&self) {
        *self.hits.lock() += 1;
        if let Some(me) = self.me.lock().take() {
            self.driver.remove(&me).unwrap();
        }
    }
}

#[test]
fn callbacks_can_unregister_during_tick() {
    let driver = Arc::new(Driver::new());
    let callback = Arc::new(SelfRemoving {
        driver: Arc::clone(&driver),
        me: Mutex::new(None),
        hits: Mutex::new(0),
    });
    let as_tick: Arc<dyn Tick> = callback.clone();
    *callback.me.lock() = Some(Arc::clone(&as_tick));
    driver.add(as_tick).unwrap();

    driver.tick();
    driver.tick();
    assert_eq!(*callback.hits.lock(), 1);
    assert!(driver.is_empty());
}

#[test]
fn global_driver_is_shared() {
    assert!(Arc::ptr_eq(&global(), &global()));
}

#[tokio::test(start_paused = true)]
async fn ticker_flushes_channels() {
    let driver = Arc::new(Driver::new());
    let channel = Channel::<Frame>::with_driver(Arc::clone(&driver));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = Handler::new(move |message: &crate::Message<Frame>| {
        sink.lock().push(message.topic());
    });
    channel.attach(Frame::Begin, &handler);
    channel.attach(Frame::End, &handler);

    assert!(channel.post(Frame::Begin));
    assert!(channel.post(Frame::End));
    assert!(seen.lock().is_empty());

    let ticker = spawn_ticker(Arc::clone(&driver), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(25)).await;

    assert_eq!(*seen.lock(), [Frame::Begin, Frame::End]);
    assert!(!channel.is_attached());
    assert!(driver.is_empty());
    ticker.abort();
}
