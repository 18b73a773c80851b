use super::*;
use crate::render::transition::TransitionParams;

fn config(width: u32, height: u32) -> SessionConfig {
    SessionConfig {
        width,
        height,
        seed: 7,
        transition: TransitionParams {
            fill_probability: 1.0,
            dissolve_probability: 1.0,
            color_variability: 10.0,
        },
        poll_interval_ms: 1,
        ..SessionConfig::default()
    }
}

fn at(start: Instant, frame: u64) -> Instant {
    start + Duration::from_millis(16 * frame)
}

/// Run lockstep frames until `state` is reached.
fn run_until(session: &mut PaintSession, start: Instant, state: PlaybackState) -> u64 {
    for n in 0..200 {
        let now = at(start, session.stats().frames);
        session.frame(now).unwrap();
        session.sync_completion(now, Duration::from_secs(5)).unwrap();
        if session.state() == state {
            return n;
        }
    }
    panic!("state {state:?} not reached, stuck in {:?}", session.state());
}

#[test]
fn first_stroke_starts_forward_playback() {
    let mut s = PaintSession::new(SessionConfig::default()).unwrap();
    assert_eq!(s.state(), PlaybackState::Empty);

    assert!(s.pointer_down(0.0, 0.0));
    assert_eq!(s.pointer_move(3.0, 0.0), 3);
    assert!(s.pointer_up());

    assert_eq!(s.state(), PlaybackState::Forward);
    assert_eq!(s.display().count_opaque(), 4);
    assert_eq!(s.stats().strokes_accepted, 1);
    assert_eq!(s.stats().pixels_merged, 4);

    assert_eq!(s.handle_key(KeyAction::ToggleDirection), Dispatched::Handled);
    assert_eq!(s.state(), PlaybackState::Reverse);
}

#[test]
fn strokes_are_rejected_while_clearing() {
    let mut s = PaintSession::new(config(8, 8)).unwrap();
    s.pointer_down(1.0, 1.0);
    s.pointer_up();
    s.handle_key(KeyAction::ToggleDirection);

    assert!(!s.pointer_down(4.0, 4.0));
    assert_eq!(s.stats().strokes_rejected, 1);
    assert_eq!(s.display().count_opaque(), 1);
}

#[test]
fn leaving_a_painting_state_ends_the_active_stroke() {
    let mut s = PaintSession::new(config(8, 8)).unwrap();
    s.pointer_down(0.0, 0.0);
    s.handle_key(KeyAction::ToggleDirection);

    assert_eq!(s.pointer_move(5.0, 0.0), 0);
    assert!(!s.pointer_up());
}

#[test]
fn paused_playback_does_not_tick() {
    let mut s = PaintSession::new(config(8, 8)).unwrap();
    s.pointer_down(3.0, 3.0);
    s.pointer_up();
    assert_eq!(s.handle_key(KeyAction::TogglePlayPause), Dispatched::Handled);
    assert_eq!(s.state(), PlaybackState::ForwardPaused);

    let before = s.display().clone();
    let report = s.frame(Instant::now()).unwrap();
    assert!(!report.ticked);
    assert_eq!(s.display(), &before);

    // Strokes still paint while paused, without resuming.
    assert!(s.pointer_down(0.0, 0.0));
    assert_eq!(s.state(), PlaybackState::ForwardPaused);
}

#[test]
fn unmapped_keys_and_save_are_reported() {
    let mut s = PaintSession::new(config(4, 4)).unwrap();
    let key = |k: &str, ctrl| InputEvent::Key {
        key: k.to_string(),
        ctrl,
    };
    assert_eq!(s.dispatch(&key("q", false)), Dispatched::Ignored);
    assert_eq!(s.dispatch(&key("KeyS", true)), Dispatched::SaveRequested);
    // No edge from Empty.
    assert_eq!(s.dispatch(&key("d", false)), Dispatched::Ignored);
    assert_eq!(s.state(), PlaybackState::Empty);
}

#[test]
fn resizes_coalesce_to_the_latest_request() {
    let mut s = PaintSession::new(config(8, 8)).unwrap();
    s.resize(10, 10);
    s.resize(20, 5);
    s.resize(0, 5);
    assert_eq!(s.canvas(), Canvas::new(8, 8));

    s.frame(Instant::now()).unwrap();
    assert_eq!(s.canvas(), Canvas::new(20, 5));
    assert_eq!(s.stats().resizes, 1);
}

#[test]
fn paints_to_done_and_regrows_on_a_larger_viewport() {
    let mut s = PaintSession::new(config(4, 4)).unwrap();
    let start = Instant::now();
    s.pointer_down(0.0, 0.0);
    s.pointer_up();

    run_until(&mut s, start, PlaybackState::Done);
    assert_eq!(s.display().count_opaque(), 16);
    assert!(s.stats().poll.verdicts_applied >= 1);

    // Shrinking a finished canvas keeps it finished.
    s.resize(3, 3);
    let report = s.frame(at(start, s.stats().frames)).unwrap();
    assert_eq!(report.state, PlaybackState::Done);

    s.resize(6, 3);
    let report = s.frame(at(start, s.stats().frames)).unwrap();
    assert_eq!(report.state, PlaybackState::Forward);
    assert!(report.ticked);

    run_until(&mut s, start, PlaybackState::Done);
    assert_eq!(s.display().count_opaque(), 18);
}

#[test]
fn dissolves_back_to_empty() {
    let mut s = PaintSession::new(config(5, 5)).unwrap();
    let start = Instant::now();
    s.pointer_down(2.0, 2.0);
    s.pointer_up();
    run_until(&mut s, start, PlaybackState::Done);

    s.handle_key(KeyAction::ToggleDirection);
    run_until(&mut s, start, PlaybackState::Empty);
    assert_eq!(s.display().count_opaque(), 0);

    // A fresh stroke starts over.
    assert!(s.pointer_down(1.0, 1.0));
    assert_eq!(s.state(), PlaybackState::Forward);
}

#[test]
fn export_name_and_format_follow_state() {
    let mut s = PaintSession::new(config(4, 4)).unwrap();
    assert_eq!(s.suggested_export_name(), "pixelspread.png");
    s.pointer_down(0.0, 0.0);
    s.pointer_up();
    run_until(&mut s, Instant::now(), PlaybackState::Done);
    assert_eq!(s.suggested_export_name(), "pixelspread.jpg");

    let dir = std::path::PathBuf::from("target").join("session_tests");
    let out = s.export_image(dir.join("done.png")).unwrap();
    assert_eq!(out.extension().and_then(|e| e.to_str()), Some("jpg"));
    assert!(out.is_file());
}

#[test]
fn same_seed_same_canvas() {
    let run = || {
        let mut s = PaintSession::new(SessionConfig {
            width: 16,
            height: 12,
            seed: 99,
            ..SessionConfig::default()
        })
        .unwrap();
        s.pointer_down(2.0, 2.0);
        s.pointer_move(12.0, 9.0);
        s.pointer_up();
        let start = Instant::now();
        for n in 0..4 {
            s.frame(at(start, n)).unwrap();
        }
        s.display().clone()
    };
    assert_eq!(run(), run());
}

fn never_completes(width: u32, height: u32) -> SessionConfig {
    let mut cfg = config(width, height);
    cfg.transition.fill_probability = 0.0;
    cfg.transition.dissolve_probability = 0.0;
    cfg
}

#[test]
fn key_press_during_a_check_discards_its_verdict_without_waiting() {
    let mut s = PaintSession::new(never_completes(8, 8)).unwrap();
    let start = Instant::now();
    s.pointer_down(1.0, 1.0);
    s.pointer_up();
    s.frame(start).unwrap();
    assert_eq!(s.stats().poll.submitted, 1);

    assert_eq!(s.handle_key(KeyAction::TogglePlayPause), Dispatched::Handled);
    let began = Instant::now();
    let entered = s.sync_completion(start, Duration::from_secs(5)).unwrap();
    assert_eq!(entered, None);
    assert!(began.elapsed() < Duration::from_secs(2));

    for n in 1..500 {
        if s.stats().poll.verdicts_discarded > 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
        s.frame(at(start, n)).unwrap();
    }
    let stats = s.stats().poll;
    assert_eq!(stats.verdicts_discarded, 1);
    assert_eq!(stats.verdicts_applied, 0);
    assert_eq!(s.state(), PlaybackState::ForwardPaused);
}

#[test]
fn resize_during_a_check_discards_its_verdict() {
    let mut s = PaintSession::new(never_completes(8, 8)).unwrap();
    let start = Instant::now();
    s.pointer_down(1.0, 1.0);
    s.pointer_up();
    s.frame(start).unwrap();
    assert_eq!(s.stats().poll.submitted, 1);

    s.resize(12, 12);
    let began = Instant::now();
    let report = s.frame(at(start, 1)).unwrap();
    s.sync_completion(at(start, 1), Duration::from_secs(5)).unwrap();
    assert!(began.elapsed() < Duration::from_secs(2));

    assert_eq!(report.completed, None);
    assert_eq!(s.canvas(), Canvas::new(12, 12));
    let stats = s.stats().poll;
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.verdicts_discarded, 1);
    assert_eq!(stats.verdicts_applied, 0);
    assert_eq!(s.state(), PlaybackState::Forward);
}
