//! Bridge tests
//!
//! Exercises the per-origin run slots and the event stream seen by a
//! polling consumer.

mod common;

use common::{FakeGateway, FakeTranslator, Gate};
use dubforge::bridge::{Bridge, Event, EventKind, Origin, Status};
use dubforge::config::Settings;
use dubforge::pipeline::{Level, PipelineExecutor, PipelineRequest};
use dubforge_av::actions::TrimSpec;
use dubforge_av::Tool;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Drain events until `origin` reports a terminal status.
fn collect_until_done(bridge: &Bridge, origin: Origin) -> Vec<Event> {
    let deadline = Instant::now() + TIMEOUT;
    let mut events = Vec::new();
    loop {
        while let Some(event) = bridge.drain() {
            let done = event.origin == origin && event.terminal_status().is_some();
            events.push(event);
            if done {
                return events;
            }
        }
        assert!(Instant::now() < deadline, "timed out waiting for {origin}");
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn wait_idle(bridge: &Bridge, origin: Origin) {
    let deadline = Instant::now() + TIMEOUT;
    while bridge.is_busy(origin) {
        assert!(Instant::now() < deadline, "{origin} slot never released");
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn statuses(events: &[Event], origin: Origin) -> Vec<Status> {
    events
        .iter()
        .filter(|e| e.origin == origin)
        .filter_map(|e| match e.kind {
            EventKind::Status { status } => Some(status),
            _ => None,
        })
        .collect()
}

fn request(dir: &Path, actions: &[&str]) -> PipelineRequest {
    PipelineRequest {
        url: "https://video.example/watch?v=abc123".to_string(),
        output_dir: dir.to_path_buf(),
        audio: None,
        actions: actions.iter().map(|s| s.to_string()).collect(),
        settings: Settings::default(),
    }
}

#[test]
fn test_pipeline_emits_running_then_finished() {
    let dir = tempdir().unwrap();
    let gateway = Arc::new(FakeGateway::new());
    let executor = PipelineExecutor::new(gateway, Arc::new(FakeTranslator::new()));

    let bridge = Bridge::new();
    assert!(bridge.start_pipeline(executor, request(dir.path(), &["md"])));

    let events = collect_until_done(&bridge, Origin::Url);
    assert_eq!(
        statuses(&events, Origin::Url),
        vec![Status::Running, Status::Finished]
    );
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::Log { level: Level::Info, message } if message.contains("Pipeline completed")
    )));

    wait_idle(&bridge, Origin::Url);
    assert!(bridge.drain().is_none());
}

#[test]
fn test_aborted_pipeline_ends_with_error_status() {
    let dir = tempdir().unwrap();
    let gateway = Arc::new(FakeGateway::with_tools([Tool::Ffmpeg]));
    let executor = PipelineExecutor::new(gateway, Arc::new(FakeTranslator::new()));

    let bridge = Bridge::new();
    bridge.start_pipeline(executor, request(dir.path(), &["dv"]));

    let events = collect_until_done(&bridge, Origin::Url);
    assert_eq!(
        statuses(&events, Origin::Url),
        vec![Status::Running, Status::Error]
    );
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::Log { level: Level::Error, message } if message.contains("yt-dlp")
    )));
}

#[test]
fn test_second_start_is_rejected_while_busy() {
    let gate = Gate::new();
    let bridge = Bridge::new();

    let worker_gate = gate.clone();
    assert!(bridge.start(Origin::Url, move |log| {
        log.info("working");
        worker_gate.wait();
        true
    }));
    assert!(bridge.is_busy(Origin::Url));

    assert!(!bridge.start(Origin::Url, |_| true));

    gate.open();
    let events = collect_until_done(&bridge, Origin::Url);
    wait_idle(&bridge, Origin::Url);

    let warnings: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Log { level: Level::Warn, .. }))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        statuses(&events, Origin::Url),
        vec![Status::Running, Status::Finished]
    );

    // The slot is free again.
    assert!(bridge.start(Origin::Url, |_| true));
    let events = collect_until_done(&bridge, Origin::Url);
    assert_eq!(
        statuses(&events, Origin::Url),
        vec![Status::Running, Status::Finished]
    );
}

#[test]
fn test_origins_run_independently() {
    let gate = Gate::new();
    let bridge = Bridge::new();

    let url_gate = gate.clone();
    assert!(bridge.start(Origin::Url, move |_| {
        url_gate.wait();
        true
    }));
    assert!(bridge.start(Origin::Trim, |log| {
        log.info("trimming");
        false
    }));

    let trim_events = collect_until_done(&bridge, Origin::Trim);
    assert_eq!(
        statuses(&trim_events, Origin::Trim),
        vec![Status::Running, Status::Error]
    );
    assert!(bridge.is_busy(Origin::Url));

    gate.open();
    let url_events = collect_until_done(&bridge, Origin::Url);
    assert_eq!(statuses(&url_events, Origin::Url).last(), Some(&Status::Finished));
}

#[test]
fn test_panicking_task_reports_error_once() {
    let bridge = Bridge::new();
    assert!(bridge.start(Origin::Url, |_| panic!("boom")));

    let events = collect_until_done(&bridge, Origin::Url);
    assert_eq!(
        statuses(&events, Origin::Url),
        vec![Status::Running, Status::Error]
    );
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::Log { level: Level::Error, message } if message.contains("boom")
    )));

    wait_idle(&bridge, Origin::Url);
    assert!(bridge.drain().is_none());
}

#[test]
fn test_events_keep_task_order() {
    let bridge = Bridge::new();
    assert!(bridge.start(Origin::Url, |log| {
        for i in 0..20 {
            log.info(format!("line {i}"));
        }
        true
    }));

    let events = collect_until_done(&bridge, Origin::Url);
    let lines: Vec<String> = events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Log { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_trim_runs_on_trim_origin() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    std::fs::write(&input, "media").unwrap();
    let output = dir.path().join("clip_cut.mp4");

    let gateway = Arc::new(FakeGateway::new());
    let bridge = Bridge::new();
    bridge.start_trim(
        gateway.clone(),
        TrimSpec {
            input,
            output: output.clone(),
            start: "00:00:01".to_string(),
            end: "00:00:05.500".to_string(),
        },
    );

    let events = collect_until_done(&bridge, Origin::Trim);
    assert_eq!(
        statuses(&events, Origin::Trim),
        vec![Status::Running, Status::Finished]
    );
    assert!(output.exists());

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    let (tool, args) = &calls[0];
    assert_eq!(*tool, Tool::Ffmpeg);
    assert!(args.windows(2).any(|w| w[0] == "-ss" && w[1] == "00:00:01"));
    assert!(args.windows(2).any(|w| w[0] == "-to" && w[1] == "00:00:05.500"));
}

#[test]
fn test_trim_with_bad_range_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("clip.mp4");
    std::fs::write(&input, "media").unwrap();

    let gateway = Arc::new(FakeGateway::new());
    let bridge = Bridge::new();
    bridge.start_trim(
        gateway.clone(),
        TrimSpec {
            input,
            output: dir.path().join("out.mp4"),
            start: "00:00:05".to_string(),
            end: "00:00:01".to_string(),
        },
    );

    let events = collect_until_done(&bridge, Origin::Trim);
    assert_eq!(
        statuses(&events, Origin::Trim),
        vec![Status::Running, Status::Error]
    );
    assert_eq!(gateway.call_count(), 0);
}
