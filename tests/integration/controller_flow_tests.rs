//! Integration tests for operator actions routed through the session
//! controller: confirmation gating, notices, and setup batch flow.

use std::sync::Arc;
use std::time::Duration;

use benchdash::channel::InboundEvent;
use benchdash::models::{
    BenchmarkInfo, ConfigValue, CycleRate, DatabaseConfig, NoticeLevel, PartialSessionState,
    SetupStepStatus,
};
use benchdash::AppError;

use super::test_helpers::{configured_harness, harness, wl, Failure};

// ── Infrastructure and configuration ────────────────────

#[tokio::test]
async fn infrastructure_start_marks_ready_after_confirmation() {
    let h = harness();
    h.controller.start_infrastructure().await.unwrap();

    assert!(h.controller.snapshot().await.state.infrastructure_ready);
    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Success,
            "Infrastructure started successfully".into()
        ))
    );

    h.controller.stop_infrastructure().await.unwrap();
    assert!(!h.controller.snapshot().await.state.infrastructure_ready);
}

#[tokio::test]
async fn rejected_infrastructure_start_leaves_state_untouched() {
    let h = harness();
    h.sender.fail(
        "start_infrastructure",
        Failure::Rejected("docker compose failed".into()),
    );

    let err = h.controller.start_infrastructure().await.unwrap_err();

    assert!(matches!(err, AppError::Rejected(_)));
    assert!(!h.controller.snapshot().await.state.infrastructure_ready);
    assert_eq!(h.presenter.render_count(), 0);
    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Danger,
            "Failed to start infrastructure: docker compose failed".into()
        ))
    );
}

#[tokio::test]
async fn transport_failure_uses_error_wording() {
    let h = harness();
    h.sender.fail(
        "stop_infrastructure",
        Failure::Transport("connection refused".into()),
    );

    h.controller.stop_infrastructure().await.unwrap_err();

    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Danger,
            "Error stopping infrastructure: connection refused".into()
        ))
    );
}

#[tokio::test]
async fn saving_config_refreshes_catalog() {
    let h = harness();
    h.sender.set_catalog(&[("cassandra_sai", true), ("mongodb_vector", false)]);
    let mut config = DatabaseConfig::new();
    config.insert("cassandra_host".into(), ConfigValue::Text("db".into()));

    h.controller.save_database_config(config.clone()).await.unwrap();

    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.state.databases_configured);
    assert_eq!(snapshot.state.database_config, config);
    assert!(snapshot.can_run_setup);
    let catalog = h.controller.catalog().await.expect("catalog cached");
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        h.sender.calls(),
        ["save_database_config(1)", "list_workloads()"]
    );
}

#[tokio::test]
async fn failed_catalog_refresh_does_not_fail_save() {
    let h = harness();
    h.sender
        .fail("list_workloads", Failure::Transport("timeout".into()));

    h.controller
        .save_database_config(DatabaseConfig::new())
        .await
        .unwrap();

    assert!(h.controller.snapshot().await.state.databases_configured);
    assert!(h.controller.catalog().await.is_none());
}

#[tokio::test]
async fn catalog_is_empty_until_databases_configured() {
    let h = harness();
    h.sender.set_catalog(&[("cassandra_sai", true)]);

    let catalog = h.controller.refresh_workloads().await.unwrap();

    assert!(catalog.is_empty());
    assert!(h.sender.calls().is_empty());
}

// ── Setup batch ─────────────────────────────────────────

#[tokio::test]
async fn setup_batch_flow_through_events() {
    let h = configured_harness(&["a", "b"]).await;

    h.controller.run_setup(vec![wl("a"), wl("b")]).await.unwrap();
    assert_eq!(
        h.presenter.last_notice(),
        Some((NoticeLevel::Info, "Setup started. Check progress below.".into()))
    );
    let batch = h.controller.snapshot().await.setup_batch.expect("active");
    assert_eq!(batch.status_of(&wl("a")), Some(SetupStepStatus::Running));

    h.controller
        .handle_event(InboundEvent::SetupProgress {
            workload: wl("a"),
            success: true,
        })
        .await;
    h.controller
        .handle_event(InboundEvent::SetupStarted { workload: wl("b") })
        .await;
    h.controller
        .handle_event(InboundEvent::SetupProgress {
            workload: wl("b"),
            success: false,
        })
        .await;

    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.setup_batch.is_none());
    assert!(snapshot.state.setup_status[&wl("a")]);
    assert!(!snapshot.state.setup_status[&wl("b")]);
    assert_eq!(snapshot.controls.len(), 1);
    assert_eq!(snapshot.controls[0].workload, wl("a"));
    assert!(snapshot.can_run_setup);
}

#[tokio::test]
async fn empty_setup_selection_warns() {
    let h = configured_harness(&["a"]).await;

    let err = h.controller.run_setup(vec![]).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Warning,
            "Please select at least one workload".into()
        ))
    );
    assert!(!h.sender.calls().iter().any(|c| c.starts_with("run_setup")));
}

#[tokio::test]
async fn unavailable_workload_is_refused_before_sending() {
    let h = harness();
    h.sender.set_catalog(&[("a", true), ("b", false)]);
    h.controller
        .save_database_config(DatabaseConfig::new())
        .await
        .unwrap();

    let err = h.controller.run_setup(vec![wl("b")]).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(h.controller.snapshot().await.setup_batch.is_none());
    assert_eq!(h.presenter.last_notice().unwrap().0, NoticeLevel::Warning);
}

#[tokio::test]
async fn second_setup_while_active_is_already_running() {
    let h = configured_harness(&["a", "b"]).await;
    h.controller.run_setup(vec![wl("a")]).await.unwrap();

    let err = h.controller.run_setup(vec![wl("b")]).await.unwrap_err();

    assert!(matches!(err, AppError::AlreadyRunning(_)));
    let batch = h.controller.snapshot().await.setup_batch.expect("first batch");
    assert_eq!(batch.workloads, vec![wl("a")]);
    assert_eq!(
        h.sender
            .calls()
            .iter()
            .filter(|c| c.starts_with("run_setup"))
            .count(),
        1
    );
}

#[tokio::test]
async fn refused_setup_abandons_reserved_batch() {
    let h = configured_harness(&["a"]).await;
    h.sender
        .fail("run_setup", Failure::Rejected("runner busy".into()));

    h.controller.run_setup(vec![wl("a")]).await.unwrap_err();

    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.setup_batch.is_none());
    assert!(snapshot.can_run_setup);
    assert_eq!(
        h.presenter.last_notice(),
        Some((NoticeLevel::Danger, "Failed to start setup: runner busy".into()))
    );

    h.sender.clear("run_setup");
    h.controller.run_setup(vec![wl("a")]).await.unwrap();
}

#[tokio::test]
async fn late_setup_failure_keeps_newer_batch() {
    let h = configured_harness(&["a", "b"]).await;
    h.sender
        .fail("run_setup", Failure::Transport("timeout".into()));
    let gate = h.sender.hold_next("run_setup");

    let first = {
        let controller = Arc::clone(&h.controller);
        tokio::spawn(async move { controller.run_setup(vec![wl("a")]).await })
    };
    while !h.sender.calls().iter().any(|c| c == "run_setup(a)") {
        tokio::task::yield_now().await;
    }

    // The first batch finishes and a second one is accepted while the
    // first reply is still outstanding.
    h.controller
        .handle_event(InboundEvent::SetupProgress {
            workload: wl("a"),
            success: true,
        })
        .await;
    h.sender.clear("run_setup");
    h.controller.run_setup(vec![wl("b")]).await.unwrap();

    gate.notify_one();
    let err = first.await.unwrap().unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));

    let batch = h
        .controller
        .snapshot()
        .await
        .setup_batch
        .expect("second batch survives");
    assert_eq!(batch.workloads, vec![wl("b")]);

    h.controller
        .handle_event(InboundEvent::SetupProgress {
            workload: wl("b"),
            success: true,
        })
        .await;
    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.state.setup_status[&wl("b")]);
    assert!(snapshot.control_for(&wl("b")).is_some());
}

// ── Benchmarks ──────────────────────────────────────────

#[tokio::test]
async fn start_benchmark_applies_optimistic_entry() {
    let h = configured_harness(&["a"]).await;

    h.controller.start_benchmark(wl("a"), 250).await.unwrap();

    let snapshot = h.controller.snapshot().await;
    let info = &snapshot.state.running_benchmarks[&wl("a")];
    assert!(info.is_running());
    assert_eq!(info.pid, 1001);
    assert_eq!(info.cycle_rate.get(), 250);
    assert_eq!(snapshot.runtime_of(&wl("a")), Some(0));
    assert_eq!(
        h.presenter.last_notice(),
        Some((NoticeLevel::Success, "Started benchmark: a".into()))
    );

    h.clock.advance(Duration::from_secs(5));
    assert_eq!(h.controller.snapshot().await.runtime_of(&wl("a")), Some(5));
}

#[tokio::test]
async fn out_of_range_rate_never_reaches_sender() {
    let h = configured_harness(&["a"]).await;

    let err = h.controller.start_benchmark(wl("a"), 0).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(!h
        .sender
        .calls()
        .iter()
        .any(|c| c.starts_with("start_benchmark")));
    assert_eq!(h.presenter.last_notice().unwrap().0, NoticeLevel::Warning);
}

#[tokio::test]
async fn rejected_start_leaves_benchmark_absent() {
    let h = configured_harness(&["a"]).await;
    h.sender.fail(
        "start_benchmark",
        Failure::Rejected("Benchmark already running".into()),
    );

    h.controller.start_benchmark(wl("a"), 10).await.unwrap_err();

    assert!(h
        .controller
        .snapshot()
        .await
        .state
        .running_benchmarks
        .is_empty());
    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Danger,
            "Failed to start benchmark: Benchmark already running".into()
        ))
    );
}

#[tokio::test]
async fn stop_benchmark_removes_entry_and_estimate() {
    let h = configured_harness(&["a"]).await;
    h.controller.start_benchmark(wl("a"), 10).await.unwrap();

    h.controller.stop_benchmark(wl("a")).await.unwrap();

    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.state.running_benchmarks.is_empty());
    assert_eq!(snapshot.runtime_of(&wl("a")), None);
    assert_eq!(
        h.presenter.last_notice(),
        Some((NoticeLevel::Success, "Stopped benchmark: a".into()))
    );
}

#[tokio::test]
async fn update_cycle_rate_changes_running_benchmark() {
    let h = configured_harness(&["a"]).await;
    h.controller.start_benchmark(wl("a"), 10).await.unwrap();

    h.controller.update_cycle_rate(wl("a"), 75).await.unwrap();

    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.state.running_benchmarks[&wl("a")].cycle_rate.get(), 75);
    assert_eq!(
        h.presenter.last_notice(),
        Some((
            NoticeLevel::Success,
            "Updated cycle rate for a to 75".into()
        ))
    );
}

#[tokio::test]
async fn push_after_optimistic_start_supersedes_it() {
    let h = configured_harness(&["a"]).await;
    h.controller.start_benchmark(wl("a"), 10).await.unwrap();

    let mut reported = BenchmarkInfo::started(4242, CycleRate::new(10).unwrap());
    reported.runtime_seconds = 30.0;
    h.controller
        .handle_event(InboundEvent::StatusUpdate(PartialSessionState {
            running_benchmarks: Some([(wl("a"), reported)].into_iter().collect()),
            ..PartialSessionState::default()
        }))
        .await;

    let snapshot = h.controller.snapshot().await;
    assert_eq!(snapshot.state.running_benchmarks[&wl("a")].pid, 4242);
    assert_eq!(snapshot.runtime_of(&wl("a")), Some(30));
}

#[tokio::test]
async fn reapply_state_restores_saved_view() {
    let h = configured_harness(&["a"]).await;
    let saved = h.controller.snapshot().await.state;
    h.controller.start_benchmark(wl("a"), 10).await.unwrap();

    h.controller.reapply_state(saved).await;

    let snapshot = h.controller.snapshot().await;
    assert!(snapshot.state.running_benchmarks.is_empty());
    assert_eq!(snapshot.runtime_of(&wl("a")), None);
}

#[tokio::test]
async fn renders_arrive_in_revision_order() {
    let h = configured_harness(&["a"]).await;
    h.controller.start_infrastructure().await.unwrap();
    h.controller.start_benchmark(wl("a"), 10).await.unwrap();
    h.controller.stop_benchmark(wl("a")).await.unwrap();

    let revisions: Vec<u64> = h.presenter.renders().iter().map(|s| s.revision).collect();
    assert!(revisions.len() >= 3);
    assert!(revisions.windows(2).all(|w| w[0] < w[1]), "{revisions:?}");
}
