//! Integration tests feeding a recorded NDJSON event log through the
//! codec and the event consumer, the way the replay command does.

use std::io::Write;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

use benchdash::channel::codec::EventCodec;
use benchdash::engine::snapshot::ConnectionStatus;
use benchdash::models::SetupStepStatus;
use benchdash::orchestrator::spawn_event_consumer;

use super::test_helpers::{configured_harness, wl};

const LOG: &str = r#"{"event":"connected"}
{"event":"status_update","data":{"infrastructure_ready":true,"databases_configured":true}}

{"event":"setup_started","data":{"workload":"cassandra_sai"}}
this line is garbage
{"event":"setup_progress","data":{"workload":"cassandra_sai","success":true}}
{"event":"status_update","data":{"running_benchmarks":{"cassandra_sai":{"status":"running","pid":77,"cycle_rate":20,"phase":"run","runtime_seconds":42.9}}}}
{"event":"setup_started","data":{"workload":"mongodb_vector"}}
"#;

#[tokio::test]
async fn recorded_log_replays_into_engine() {
    let h = configured_harness(&["cassandra_sai", "mongodb_vector"]).await;
    h.controller
        .run_setup(vec![wl("cassandra_sai"), wl("mongodb_vector")])
        .await
        .unwrap();

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(LOG.as_bytes()).expect("write log");
    let reader = tokio::fs::File::open(file.path()).await.expect("open log");

    let (tx, rx) = mpsc::channel(4);
    let consumer = spawn_event_consumer(rx, Arc::clone(&h.controller), CancellationToken::new());
    let mut frames = FramedRead::new(reader, EventCodec::new());
    let mut forwarded = 0;
    while let Some(frame) = frames.next().await {
        tx.send(frame.expect("framing intact")).await.unwrap();
        forwarded += 1;
    }
    drop(tx);
    consumer.await.unwrap();

    assert_eq!(forwarded, 6);
    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.connection, ConnectionStatus::Connected);
    assert!(snapshot.state.infrastructure_ready);
    assert_eq!(snapshot.runtime_of(&wl("cassandra_sai")), Some(42));
    assert_eq!(snapshot.state.running_benchmarks[&wl("cassandra_sai")].pid, 77);

    let batch = snapshot.setup_batch.as_ref().expect("mongodb still running");
    assert_eq!(
        batch.status_of(&wl("cassandra_sai")),
        Some(SetupStepStatus::Completed)
    );
    assert_eq!(
        batch.status_of(&wl("mongodb_vector")),
        Some(SetupStepStatus::Running)
    );
    let control = snapshot.control_for(&wl("cassandra_sai")).expect("control");
    assert!(control.running);
    assert_eq!(control.cycle_rate.get(), 20);
}
