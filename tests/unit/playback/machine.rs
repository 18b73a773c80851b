use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn machine_in(state: PlaybackState) -> PlaybackStateMachine {
    use PlaybackState as S;
    use PlaybackTrigger as T;

    let mut m = PlaybackStateMachine::new();
    let path: &[T] = match state {
        S::Empty => &[],
        S::Forward => &[T::Stroke],
        S::ForwardPaused => &[T::Stroke, T::TogglePlayPause],
        S::Reverse => &[T::Stroke, T::ToggleDirection],
        S::ReversePaused => &[T::Stroke, T::ToggleDirection, T::TogglePlayPause],
        S::Done => &[T::Stroke, T::PaintComplete],
    };
    for &t in path {
        assert!(m.apply(t).is_some());
    }
    assert_eq!(m.current(), state);
    m
}

#[test]
fn first_stroke_then_direction_toggle_reverses() {
    let mut m = PlaybackStateMachine::new();
    assert_eq!(m.apply(PlaybackTrigger::Stroke), Some(PlaybackState::Forward));
    assert_eq!(
        m.apply(PlaybackTrigger::ToggleDirection),
        Some(PlaybackState::Reverse)
    );
}

#[test]
fn full_table_is_honored() {
    use PlaybackState as S;
    use PlaybackTrigger as T;

    let expected = [
        (S::Empty, T::Stroke, S::Forward),
        (S::Forward, T::TogglePlayPause, S::ForwardPaused),
        (S::ForwardPaused, T::TogglePlayPause, S::Forward),
        (S::Reverse, T::TogglePlayPause, S::ReversePaused),
        (S::ReversePaused, T::TogglePlayPause, S::Reverse),
        (S::Forward, T::ToggleDirection, S::Reverse),
        (S::Done, T::ToggleDirection, S::Reverse),
        (S::ForwardPaused, T::ToggleDirection, S::ReversePaused),
        (S::Reverse, T::ToggleDirection, S::Forward),
        (S::ReversePaused, T::ToggleDirection, S::ForwardPaused),
        (S::Forward, T::PaintComplete, S::Done),
        (S::Reverse, T::DissolveComplete, S::Empty),
        (S::Done, T::ViewportGrew, S::Forward),
    ];

    for &state in &S::ALL {
        for &trigger in &T::ALL {
            let mut m = machine_in(state);
            let got = m.apply(trigger);
            let want = expected
                .iter()
                .find(|(s, t, _)| *s == state && *t == trigger)
                .map(|(_, _, to)| *to);
            assert_eq!(got, want, "{state:?} + {trigger:?}");
            assert_eq!(m.current(), want.unwrap_or(state), "{state:?} + {trigger:?}");
        }
    }
}

#[test]
fn terminal_states_only_reachable_through_their_edges() {
    for &from in &PlaybackState::ALL {
        assert_eq!(
            is_legal_edge(from, PlaybackState::Done),
            from == PlaybackState::Forward
        );
        assert_eq!(
            is_legal_edge(from, PlaybackState::Empty),
            from == PlaybackState::Reverse
        );
    }
}

#[test]
fn raw_transition_rejects_illegal_edges() {
    let mut m = PlaybackStateMachine::new();
    assert!(!m.transition(PlaybackState::Done));
    assert!(!m.transition(PlaybackState::Reverse));
    assert!(!m.transition(PlaybackState::Empty));
    assert_eq!(m.current(), PlaybackState::Empty);
    assert!(m.transition(PlaybackState::Forward));
}

#[test]
fn listeners_fire_in_order_and_never_spuriously() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut m = PlaybackStateMachine::new();

    let l1 = log.clone();
    m.subscribe(move |new, prev| l1.borrow_mut().push(("a", new, prev)));
    let l2 = log.clone();
    let second = m.subscribe(move |new, prev| l2.borrow_mut().push(("b", new, prev)));

    m.apply(PlaybackTrigger::Stroke);
    m.transition(PlaybackState::Forward);
    m.apply(PlaybackTrigger::DissolveComplete);

    assert_eq!(
        *log.borrow(),
        vec![
            ("a", PlaybackState::Forward, PlaybackState::Empty),
            ("b", PlaybackState::Forward, PlaybackState::Empty),
        ]
    );

    assert!(m.unsubscribe(second));
    assert!(!m.unsubscribe(second));
    m.apply(PlaybackTrigger::TogglePlayPause);
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(m.listener_count(), 1);
}

#[test]
fn channel_subscription_queues_changes() {
    let mut m = PlaybackStateMachine::new();
    let (_id, rx) = m.subscribe_channel();
    m.apply(PlaybackTrigger::Stroke);
    m.apply(PlaybackTrigger::ToggleDirection);

    let got: Vec<StateChange> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            StateChange {
                new: PlaybackState::Forward,
                previous: PlaybackState::Empty
            },
            StateChange {
                new: PlaybackState::Reverse,
                previous: PlaybackState::Forward
            },
        ]
    );
}

#[test]
fn stroke_acceptance_by_state() {
    use PlaybackState as S;
    for s in S::ALL {
        let accepted = s.accepts_strokes();
        assert_eq!(
            accepted,
            matches!(s, S::Empty | S::Forward | S::ForwardPaused),
            "{s:?}"
        );
    }
    assert!(S::Forward.is_running());
    assert!(S::Reverse.is_running());
    assert!(!S::Done.is_running());
}
