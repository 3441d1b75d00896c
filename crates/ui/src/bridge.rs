use std::path::PathBuf;
use std::thread;

use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};
use slot_engine::{JsonFileStore, SaveResult, spawn_save_worker};
use slot_engine::store::{SaveRequestSender, SaveResultReceiver};

const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;
const STORE_ROOT_ENV: &str = "SLOT_EDITOR_STORE";
const DEFAULT_STORE_ROOT: &str = "slot-data";

/// Messages emitted by the persistence bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Ready(SaveRequestSender),
    Finished(SaveResult),
    Disconnected,
}

/// Directory holding one JSON document per video.
pub fn store_root() -> PathBuf {
    std::env::var_os(STORE_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT))
}

/// Builds a subscription that starts the save worker and forwards results.
pub fn persistence_subscription() -> Subscription<BridgeEvent> {
    Subscription::run(bridge_worker_stream)
}

fn bridge_worker_stream() -> impl iced::futures::Stream<Item = BridgeEvent> {
    bridge_worker_stream_with(spawn_file_store_bridge)
}

fn bridge_worker_stream_with(
    spawn_bridge: fn() -> (SaveRequestSender, SaveResultReceiver),
) -> impl iced::futures::Stream<Item = BridgeEvent> {
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (save_tx, result_rx) = spawn_bridge();
            let _ = output.send(BridgeEvent::Ready(save_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(result) = result_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Finished(result))).is_err() {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

/// Spawns the production bridge writing to [`store_root`].
pub fn spawn_file_store_bridge() -> (SaveRequestSender, SaveResultReceiver) {
    let root = store_root();
    tracing::info!(root = ?root, "persistence bridge starting");
    spawn_save_worker(JsonFileStore::new(root))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use iced::futures::{StreamExt, executor, pin_mut};
    use slot_engine::store::{SaveRequestSender, SaveResultReceiver};
    use slot_engine::{
        EngineError, SaveRequest, Slot, SlotStore, StoredTimeline, spawn_save_worker,
    };

    use super::{BridgeEvent, bridge_worker_stream_with};

    #[test]
    fn bridge_worker_stream_emits_ready_forwards_results_and_disconnected() {
        let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeEvent>();

        thread::spawn(move || {
            let stream = bridge_worker_stream_with(spawn_mock_bridge);
            executor::block_on(async move {
                pin_mut!(stream);
                for _ in 0..4 {
                    let Some(event) = stream.next().await else {
                        break;
                    };
                    if bridge_tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        let ready = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("ready event");
        let BridgeEvent::Ready(save_tx) = ready else {
            panic!("expected BridgeEvent::Ready");
        };

        save_tx
            .send(SaveRequest {
                video_id: String::from("clip"),
                revision: 3,
                slots: Vec::new(),
            })
            .expect("send save request");
        save_tx
            .send(SaveRequest {
                video_id: String::from("broken"),
                revision: 4,
                slots: Vec::new(),
            })
            .expect("send save request");

        let first = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("first forwarded result");
        let BridgeEvent::Finished(first) = first else {
            panic!("expected BridgeEvent::Finished");
        };
        assert_eq!(first.revision, 3);
        assert_eq!(
            first.result.expect("save should succeed").saved_at_ms,
            42
        );

        let second = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("second forwarded result");
        let BridgeEvent::Finished(second) = second else {
            panic!("expected BridgeEvent::Finished");
        };
        assert_eq!(second.revision, 4);
        assert!(second.result.is_err());

        drop(save_tx);

        let disconnected = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("disconnected event");
        assert!(matches!(disconnected, BridgeEvent::Disconnected));
    }

    fn spawn_mock_bridge() -> (SaveRequestSender, SaveResultReceiver) {
        spawn_save_worker(MockStore)
    }

    #[derive(Debug, Clone, Copy)]
    struct MockStore;

    impl SlotStore for MockStore {
        fn load(&self, _video_id: &str) -> slot_engine::Result<Vec<Slot>> {
            Ok(Vec::new())
        }

        fn save(&self, video_id: &str, slots: &[Slot]) -> slot_engine::Result<StoredTimeline> {
            if video_id == "broken" {
                return Err(EngineError::InvalidVideoId {
                    video_id: video_id.to_owned(),
                });
            }
            Ok(StoredTimeline {
                video_id: video_id.to_owned(),
                saved_at_ms: 42,
                slots: slots.to_vec(),
            })
        }
    }
}
