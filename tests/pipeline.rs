use pitchtrack::pipeline::spawn_tracking;
use pitchtrack::{Detection, Frame, Identity, Session, SharedSession, TrackerConfig};

use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread;
use std::time::Duration;

fn shared() -> SharedSession {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init();

    SharedSession::new(Session::new(TrackerConfig::new(800, 600)).unwrap())
}

fn walking_frame(i: usize) -> Frame {
    let x = 20.0 + i as f32 * 5.0;

    Frame::new(
        (800, 600),
        i as f32 * 0.04,
        vec![
            Detection::corners(x - 10.0, 100.0, x + 10.0, 160.0),
            Detection::corners(700.0 - x, 400.0, 720.0 - x, 460.0),
        ],
    )
}

#[test]
fn processes_whole_source() {
    let shared = shared();
    let handle = spawn_tracking(shared.clone(), (0..100).map(walking_frame), 8);

    let mut reports = 0;
    let mut last_ids = Vec::new();
    for report in handle.reports().iter() {
        assert_eq!(report.assignment.frame, reports);
        last_ids = report.identities;
        reports += 1;
    }

    let summary = handle.join().unwrap();
    assert_eq!(summary.frames, 100);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.identities, 2);
    assert_eq!(reports, 100);
    assert_eq!(last_ids, vec![Identity(0), Identity(1)]);

    // display side reads what the worker wrote
    assert_eq!(shared.history(Identity(0)).unwrap().len(), 100);
    assert_eq!(shared.heatmap(Identity(1)).unwrap().unwrap().total(), 100);
}

#[test]
fn bad_frames_are_skipped() {
    let frames = (0..10).map(|i| {
        if i == 3 {
            Frame::new((640, 480), 0.0, vec![])
        } else {
            walking_frame(i)
        }
    });

    let handle = spawn_tracking(shared(), frames, 16);
    assert_eq!(handle.reports().iter().count(), 9);

    let summary = handle.join().unwrap();

    assert_eq!(summary.frames, 9);
    assert_eq!(summary.rejected, 1);
}

#[test]
fn stop_ends_at_a_frame_boundary() {
    let shared = shared();
    let (tx, rx) = channel::<Frame>();

    // the source blocks until frames are pushed, like a live decoder
    let handle = spawn_tracking(shared.clone(), rx.into_iter(), 4);

    tx.send(walking_frame(0)).unwrap();
    tx.send(walking_frame(1)).unwrap();

    let first = handle.reports().recv_timeout(Duration::from_secs(5)).unwrap();
    let second = handle.reports().recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.assignment.frame, 0);
    assert_eq!(second.assignment.frame, 1);

    handle.stop();
    // wakes the worker so it sees the flag; the frame itself must be refused
    tx.send(walking_frame(2)).unwrap();

    assert!(matches!(
        handle.reports().recv_timeout(Duration::from_secs(5)),
        Err(RecvTimeoutError::Disconnected)
    ));

    let summary = handle.join().unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(shared.frames_processed(), 2);
    assert!(shared.is_stopped());
}

#[test]
fn paused_worker_consumes_nothing() {
    let shared = shared();
    shared.pause();

    let handle = spawn_tracking(shared.clone(), (0..20).map(walking_frame), 32);

    assert!(matches!(
        handle.reports().recv_timeout(Duration::from_millis(100)),
        Err(RecvTimeoutError::Timeout)
    ));
    assert_eq!(shared.frames_processed(), 0);

    handle.resume();
    assert_eq!(handle.reports().iter().count(), 20);

    let summary = handle.join().unwrap();
    assert_eq!(summary.frames, 20);
}

#[test]
fn join_returns_while_paused() {
    let shared = shared();
    shared.pause();

    let handle = spawn_tracking(shared.clone(), (0..5).map(walking_frame), 4);
    let (done_tx, done_rx) = channel();

    thread::spawn(move || {
        let _ = done_tx.send(handle.join().map(|s| s.frames).ok());
    });

    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(Some(0)));
    assert_eq!(shared.frames_processed(), 0);
    assert!(shared.is_stopped());
}
