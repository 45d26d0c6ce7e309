use groove_core::input::events::Attempt;
use groove_core::input::AttemptQueue;
use std::thread;

#[test]
fn test_attempt_queue_transmission() {
    let queue = AttemptQueue::new();
    let sender = queue.sender();

    // Spawn a producer thread
    let handle = thread::spawn(move || {
        sender.send(Attempt { timestamp_ms: 1.0 }).unwrap();
        sender.send(Attempt { timestamp_ms: 1.5 }).unwrap();
    });

    handle.join().unwrap();

    let received1 = queue.pop().expect("Should receive first attempt");
    assert_eq!(received1.timestamp_ms, 1.0);

    let received2 = queue.pop().expect("Should receive second attempt");
    assert_eq!(received2.timestamp_ms, 1.5);

    assert!(queue.pop().is_none());
}

#[test]
fn test_attempt_queue_ordering() {
    let queue = AttemptQueue::new();

    queue.push(Attempt { timestamp_ms: 10.0 });
    queue.push(Attempt { timestamp_ms: 11.0 });

    let e1 = queue.pop().unwrap();
    let e2 = queue.pop().unwrap();

    assert_eq!(e1.timestamp_ms, 10.0);
    assert_eq!(e2.timestamp_ms, 11.0);
}

#[test]
fn test_attempt_queue_clear() {
    let queue = AttemptQueue::new();
    queue.push(Attempt { timestamp_ms: 1.0 });
    queue.push(Attempt { timestamp_ms: 2.0 });

    assert_eq!(queue.clear(), 2);
    assert!(queue.pop().is_none());
    assert_eq!(queue.clear(), 0);
}
