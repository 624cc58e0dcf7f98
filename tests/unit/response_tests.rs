//! Unit tests for the command reply envelope and the offline sender.

use benchdash::driver::{CommandResponse, CommandSender, OfflineSender};
use benchdash::models::{ConfigValue, DatabaseConfig, WorkloadId};
use benchdash::AppError;

#[test]
fn successful_reply_passes_through() {
    let reply = CommandResponse::from_json(r#"{"success":true,"pid":123}"#)
        .and_then(CommandResponse::into_result)
        .unwrap();
    assert_eq!(reply.pid().unwrap(), 123);
}

#[test]
fn failed_reply_becomes_rejected_with_reason() {
    let err = CommandResponse::from_json(r#"{"success":false,"error":"Benchmark already running"}"#)
        .and_then(CommandResponse::into_result)
        .unwrap_err();
    match err {
        AppError::Rejected(reason) => assert_eq!(reason, "Benchmark already running"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn failed_reply_without_reason_uses_placeholder() {
    let err = CommandResponse::default().into_result().unwrap_err();
    assert_eq!(err.to_string(), "rejected: unknown error");
}

#[test]
fn garbled_reply_is_transport_error() {
    let err = CommandResponse::from_json("<html>502</html>").unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
}

#[test]
fn missing_pid_is_transport_error() {
    let reply = CommandResponse {
        success: true,
        ..CommandResponse::default()
    };
    assert!(matches!(reply.pid(), Err(AppError::Transport(_))));
}

#[test]
fn config_echo_falls_back_to_submitted() {
    let mut submitted = DatabaseConfig::new();
    submitted.insert("cassandra_host".into(), ConfigValue::Text("a".into()));

    let reply = CommandResponse {
        success: true,
        ..CommandResponse::default()
    };
    assert_eq!(reply.config_or(submitted.clone()), submitted);
}

#[test]
fn workload_catalog_is_read_from_reply() {
    let reply = CommandResponse::from_json(
        r#"{"success":true,"workloads":{"cassandra_sai":{"available":true,"database":"cassandra"}}}"#,
    )
    .unwrap();
    let catalog = reply.workloads().unwrap();
    assert!(catalog[&WorkloadId::new("cassandra_sai").unwrap()].available);
}

#[tokio::test]
async fn offline_sender_refuses_every_command() {
    let sender = OfflineSender;
    let err = sender.start_infrastructure().await.unwrap_err();
    assert_eq!(err.to_string(), "transport: no command transport configured");
    assert!(sender.list_workloads().await.is_err());
    assert!(sender
        .stop_benchmark(WorkloadId::new("a").unwrap())
        .await
        .is_err());
}
