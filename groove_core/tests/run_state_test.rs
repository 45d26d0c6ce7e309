use groove_core::gameplay::{RunStateMachine, RunStatus};

#[test]
fn test_start_moves_to_counting_with_new_generation() {
    let mut machine = RunStateMachine::new();
    assert_eq!(machine.status(), RunStatus::Idle);

    let generation = machine.start();
    assert_eq!(generation, 1);
    assert_eq!(machine.status(), RunStatus::Counting);
    assert!(machine.is_current(generation));
}

#[test]
fn test_stale_generation_cannot_advance() {
    let mut machine = RunStateMachine::new();
    let first = machine.start();
    let second = machine.start();

    assert!(!machine.advance_to_play(first));
    assert_eq!(machine.status(), RunStatus::Counting);
    assert!(machine.advance_to_play(second));
    assert_eq!(machine.status(), RunStatus::Playing);
}

#[test]
fn test_stop_invalidates_pending_work() {
    let mut machine = RunStateMachine::new();
    let generation = machine.start();

    assert!(machine.stop());
    assert_eq!(machine.status(), RunStatus::Idle);
    assert!(!machine.is_current(generation));
    assert!(!machine.advance_to_play(generation));

    // Already idle.
    assert!(!machine.stop());
}

#[test]
fn test_complete_only_from_active_run() {
    let mut machine = RunStateMachine::new();
    assert!(!machine.complete(true));
    assert_eq!(machine.status(), RunStatus::Idle);

    machine.start();
    assert!(machine.complete(true));
    assert_eq!(machine.status(), RunStatus::Success);
    assert!(machine.status().is_terminal());

    // A terminal run can be restarted, and stopped back to idle.
    let generation = machine.start();
    assert!(machine.advance_to_play(generation));
    assert!(machine.stop());
    assert!(!machine.complete(false));
}
