//! Stdin event feeder: newline-delimited JSON in, snapshots out.
//!
//! One event per line, e.g.
//! `{"event":"type","target":"#phone","text":"79123456789"}` or
//! `{"event":"snapshot"}`. EOF signals shutdown.

use kassa_actors::actor::Addr;
use kassa_actors::system::ShutdownHandle;
use kassa_page::{PageActor, PageMsg};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WireEvent {
    Click { target: String },
    Focus { target: String },
    Blur { target: String },
    Type { target: String, text: String },
    Input { target: String, value: String },
    Pick { target: String, index: usize },
    Snapshot,
    Shutdown,
}

pub fn spawn_page_feeders(page: Addr<PageActor>, shutdown: ShutdownHandle) {
    let mut shutdown_input = shutdown.subscribe();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = shutdown_input.recv() => break,
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<WireEvent>(&line) {
                                Ok(event) => deliver(&page, &shutdown, event).await,
                                Err(e) => {
                                    tracing::warn!(error = %e, "unparseable event line");
                                }
                            }
                        }
                        Ok(None) => {
                            // stdin closed: the driving session is over.
                            shutdown.signal();
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "stdin read failed");
                            shutdown.signal();
                            break;
                        }
                    }
                }
            }
        }
    });
}

async fn deliver(page: &Addr<PageActor>, shutdown: &ShutdownHandle, event: WireEvent) {
    let msg = match event {
        WireEvent::Click { target } => PageMsg::Click { target },
        WireEvent::Focus { target } => PageMsg::Focus { target },
        WireEvent::Blur { target } => PageMsg::Blur { target },
        WireEvent::Type { target, text } => PageMsg::Type { target, text },
        WireEvent::Input { target, value } => PageMsg::Input { target, value },
        WireEvent::Pick { target, index } => PageMsg::Pick { target, index },
        WireEvent::Shutdown => {
            let _ = page.send(PageMsg::Shutdown).await;
            shutdown.signal();
            return;
        }
        WireEvent::Snapshot => {
            let (tx, rx) = oneshot::channel();
            if page.send(PageMsg::Snapshot { reply: tx }).await.is_err() {
                return;
            }
            if let Ok(snap) = rx.await {
                match serde_json::to_string(&snap) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "snapshot serialization failed"),
                }
            }
            return;
        }
    };
    let _ = page.send(msg).await;
}
