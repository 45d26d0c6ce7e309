use groove_core::gameplay::{evaluate_completion, Judgement, JudgmentEngine};
use groove_core::schedule::build_schedule;
use groove_core::ResolvedLevel;
use level_schema::{BeatEvent, Classification, CompletionThresholds, LevelDefinition};

// At 100 bpm one beat is 600ms.
fn level(beats: &[f64]) -> ResolvedLevel {
    let def = LevelDefinition {
        id: "t".to_string(),
        title: String::new(),
        bpm: 100,
        events: beats
            .iter()
            .map(|&beat| BeatEvent {
                beat,
                symbol: "bd".to_string(),
            })
            .collect(),
        scoring: None,
        completion: None,
        source: None,
    };
    ResolvedLevel::resolve(&def).unwrap()
}

fn judge(beats: &[f64]) -> (JudgmentEngine, ResolvedLevel) {
    let level = level(beats);
    let engine = JudgmentEngine::new(build_schedule(&level, 1), level.windows, level.points);
    (engine, level)
}

fn classification_of(j: &Judgement) -> Classification {
    j.classification()
}

#[test]
fn test_perfect_hit_near_event() {
    let (mut judge, _) = judge(&[0.0]);

    let result = judge.on_attempt(50.0);
    match &result {
        Judgement::Hit {
            event,
            classification,
            delta_ms,
        } => {
            assert_eq!(*classification, Classification::Perfect);
            assert_eq!(*delta_ms, 50.0);
            assert_eq!(event.id.index, 0);
        }
        other => panic!("expected a hit, got {other:?}"),
    }
    assert_eq!(judge.board().score, 100);
    assert_eq!(judge.board().combo, 1);
    assert!(judge.is_complete());
}

#[test]
fn test_good_hit_outside_perfect_window() {
    let (mut judge, _) = judge(&[0.0]);

    let result = judge.on_attempt(150.0);
    assert_eq!(classification_of(&result), Classification::Good);
    assert_eq!(judge.board().score, 60);
    assert_eq!(judge.board().combo, 1);
}

#[test]
fn test_unattempted_event_expires_and_fails_run() {
    let (mut judge, level) = judge(&[0.0]);

    let expired = judge.on_tick(250.0);
    assert_eq!(expired.len(), 1);
    match &expired[0] {
        Judgement::Miss { event: Some(event) } => {
            assert_eq!(event.classification, Classification::Miss)
        }
        other => panic!("expected an expiry, got {other:?}"),
    }
    assert_eq!(judge.board().combo, 0);
    assert!(judge.is_complete());

    let verdict = evaluate_completion(judge.board(), judge.total(), &level.completion);
    assert_eq!(verdict.accuracy, 0.0);
    assert!(!verdict.success);
}

#[test]
fn test_two_events_perfect_then_perfect_within_ten_ms() {
    let (mut judge, level) = judge(&[0.0, 1.0]);

    assert_eq!(classification_of(&judge.on_attempt(10.0)), Classification::Perfect);
    // 590 against 600 is 10ms off, inside the perfect window.
    assert_eq!(classification_of(&judge.on_attempt(590.0)), Classification::Perfect);

    assert_eq!(judge.board().score, 200);
    assert_eq!(judge.board().combo_max, 2);
    let verdict = evaluate_completion(judge.board(), judge.total(), &level.completion);
    assert_eq!(verdict.accuracy, 1.0);
    assert!(verdict.success);
}

#[test]
fn test_two_events_perfect_then_good() {
    let (mut judge, _) = judge(&[0.0, 1.0]);

    assert_eq!(classification_of(&judge.on_attempt(10.0)), Classification::Perfect);
    assert_eq!(classification_of(&judge.on_attempt(700.0)), Classification::Good);
    assert_eq!(judge.board().score, 160);
    assert_eq!(judge.board().combo_max, 2);
}

#[test]
fn test_resolved_event_is_never_judged_twice() {
    let (mut judge, _) = judge(&[0.0]);

    assert!(classification_of(&judge.on_attempt(0.0)).is_hit());
    assert_eq!(judge.on_attempt(0.0), Judgement::Miss { event: None });
    assert_eq!(judge.board().hit_counts.perfect, 1);
    assert_eq!(judge.board().hit_counts.miss, 1);

    // Already resolved, so expiry has nothing left to do.
    assert!(judge.on_tick(10_000.0).is_empty());
}

#[test]
fn test_one_attempt_resolves_at_most_one_event() {
    let (mut judge, _) = judge(&[0.0, 0.0]);

    match judge.on_attempt(0.0) {
        Judgement::Hit { event, .. } => assert_eq!(event.id.index, 0),
        other => panic!("expected a hit, got {other:?}"),
    }
    assert_eq!(judge.pending(), 1);
    assert_eq!(judge.events()[1].classification, Classification::Pending);
}

#[test]
fn test_first_in_schedule_order_wins_over_nearest() {
    // Events at 0 and 150. An attempt at 140 is nearer the second but both
    // are in the good window, so the first one is taken.
    let (mut judge, _) = judge(&[0.0, 0.25]);

    match judge.on_attempt(140.0) {
        Judgement::Hit {
            event,
            classification,
            ..
        } => {
            assert_eq!(event.id.index, 0);
            assert_eq!(classification, Classification::Good);
        }
        other => panic!("expected a hit, got {other:?}"),
    }
}

#[test]
fn test_whiff_resets_combo() {
    let (mut judge, _) = judge(&[0.0, 2.0]);

    judge.on_attempt(0.0);
    assert_eq!(judge.board().combo, 1);

    assert_eq!(judge.on_attempt(600.0), Judgement::Miss { event: None });
    assert_eq!(judge.board().combo, 0);
    assert_eq!(judge.board().combo_max, 1);
    assert_eq!(judge.pending(), 1);
}

#[test]
fn test_expiry_happens_in_schedule_order() {
    let (mut judge, _) = judge(&[0.0, 1.0, 2.0]);

    let expired = judge.on_tick(700.0);
    assert_eq!(expired.len(), 1);

    let expired = judge.on_tick(2000.0);
    let indices: Vec<usize> = expired
        .iter()
        .filter_map(|j| match j {
            Judgement::Miss { event: Some(e) } => Some(e.id.index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![1, 2]);
    assert!(judge.is_complete());
}

#[test]
fn test_schedule_uses_bpm_for_offsets() {
    let level = level(&[0.0, 1.0, 2.5]);
    let offsets: Vec<f64> = build_schedule(&level, 3).iter().map(|e| e.offset_ms).collect();
    assert_eq!(offsets, vec![0.0, 600.0, 1500.0]);
}

#[test]
fn test_thresholds_gate_success() {
    let (mut judge, _) = judge(&[0.0, 1.0]);
    judge.on_attempt(150.0);
    judge.on_attempt(600.0);

    let strict = CompletionThresholds {
        min_accuracy: 1.0,
        min_combo: 3,
    };
    let verdict = evaluate_completion(judge.board(), judge.total(), &strict);
    assert_eq!(verdict.accuracy, 1.0);
    assert!(!verdict.success, "combo of 2 is below 3");
}
