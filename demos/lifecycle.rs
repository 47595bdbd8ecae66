use std::time::Duration;
use tickbus::{spawn_ticker, Callback, Handler, Message, Pair};
use tracing::info;
use tracing_subscriber::EnvFilter;

tickbus::declare! {
    /// Application lifecycle signals forwarded by the host loop
    topic Lifecycle {
        Focus,
        Pause,
        Quit,
        SceneLoaded,
    }
}

fn on_lifecycle(message: &Message<Lifecycle>) {
    match message.topic() {
        Lifecycle::Focus | Lifecycle::Pause => {
            if let Some(state) = message.content::<bool>() {
                info!(topic = ?message.topic(), state, "lifecycle");
            }
        }
        Lifecycle::SceneLoaded => {
            if let Some(scene) = message.content::<Pair<&str, u32>>() {
                info!(name = scene.first(), index = scene.second(), "scene loaded");
            }
        }
        Lifecycle::Quit => {
            if let Some(done) = message.content::<Callback>() {
                done.execute();
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tickbus=debug")),
        )
        .init();

    let channel = Lifecycle::channel();
    let handler = Handler::new(on_lifecycle);
    for topic in [
        Lifecycle::Focus,
        Lifecycle::Pause,
        Lifecycle::Quit,
        Lifecycle::SceneLoaded,
    ] {
        channel.attach(topic, &handler);
    }

    let ticker = spawn_ticker(channel.driver().clone(), Duration::from_millis(16));

    // a host would forward these from its window and scene callbacks
    channel.send_with(Lifecycle::Focus, true);
    channel.post_with(Lifecycle::SceneLoaded, Pair::new("intro", 0u32));
    channel.post_with(Lifecycle::SceneLoaded, Pair::new("menu", 1u32));
    channel.send_with(Lifecycle::Pause, false);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let done_tx = std::sync::Mutex::new(Some(done_tx));
    channel.send_with(
        Lifecycle::Quit,
        Callback::new(move || {
            if let Some(tx) = done_tx.lock().ok().and_then(|mut tx| tx.take()) {
                let _ = tx.send(());
            }
        }),
    );
    done_rx.await.expect("Quit was not delivered");

    ticker.abort();
    channel.detach_all(true);
    info!("bye");
}
