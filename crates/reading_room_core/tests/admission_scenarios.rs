//! Integration tests for the admission lock: capacity, exclusion, FIFO
//! fairness, starvation freedom and cancellation.

use crossbeam_channel::{unbounded, Receiver};
use reading_room_core::{
    AdmissionLock, CancelSource, CancelToken, Role, RoomEvent, RoomEventKind,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const PATIENCE: Duration = Duration::from_secs(5);

fn observed_room(max_readers: usize) -> (Arc<AdmissionLock>, Receiver<RoomEvent>) {
    let (tx, rx) = unbounded();
    let room = AdmissionLock::new(max_readers).unwrap().with_observer(tx);
    (Arc::new(room), rx)
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + PATIENCE;
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Name of the next actor to enter, skipping other events.
fn next_entry(events: &Receiver<RoomEvent>) -> String {
    loop {
        let event = events.recv_timeout(PATIENCE).expect("no entry observed");
        assert!(event.snapshot.holds_invariants(), "invariant broken: {event}");
        if event.kind == RoomEventKind::Entered {
            return event.name;
        }
    }
}

/// Spawns a thread that queues `name` and returns once it is admitted. The
/// caller releases on its behalf.
fn spawn_acquire(
    room: &Arc<AdmissionLock>,
    name: &str,
    role: Role,
    token: CancelToken,
) -> JoinHandle<bool> {
    let room = Arc::clone(room);
    let name = name.to_owned();
    thread::spawn(move || {
        let result = match role {
            Role::Reader => room.acquire_read(&name, &token),
            Role::Writer => room.acquire_write(&name, &token),
        };
        result.is_ok()
    })
}

/// Queues `name` and waits until its ticket is visible in the queue.
fn enqueue(room: &Arc<AdmissionLock>, name: &str, role: Role) -> JoinHandle<bool> {
    let before = room.queue_length();
    let handle = spawn_acquire(room, name, role, CancelToken::never());
    wait_for(|| room.queue_length() > before || room.snapshot().readers.iter().any(|r| r == name));
    handle
}

// ============================================================================
// CAPACITY
// ============================================================================

#[test]
fn seven_readers_five_seats() {
    let (room, _events) = observed_room(5);
    let start = Arc::new(std::sync::Barrier::new(7));

    let handles: Vec<_> = (1..=7)
        .map(|i| {
            let room = Arc::clone(&room);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                room.acquire_read(&format!("Reader-{i}"), &CancelToken::never())
                    .is_ok()
            })
        })
        .collect();

    wait_for(|| room.active_reader_count() == 5 && room.queue_length() == 2);

    // Releasing one seat admits exactly one more
    let leaving = room.active_reader_names()[0].clone();
    room.release_read(&leaving);
    wait_for(|| room.queue_length() == 1);
    assert_eq!(room.active_reader_count(), 5);

    let leaving = room.active_reader_names()[0].clone();
    room.release_read(&leaving);
    wait_for(|| room.queue_length() == 0);
    assert_eq!(room.active_reader_count(), 5);

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    for name in room.active_reader_names() {
        room.release_read(&name);
    }
    assert!(room.is_idle());
}

#[test]
fn sixth_reader_waits_for_a_seat() {
    let (room, events) = observed_room(5);
    let never = CancelToken::never();
    for i in 1..=5 {
        room.acquire_read(&format!("Reader-{i}"), &never).unwrap();
    }
    for _ in 1..=5 {
        next_entry(&events);
    }

    let sixth = enqueue(&room, "Reader-6", Role::Reader);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.queue_length(), 1);
    assert_eq!(room.active_reader_count(), 5);

    room.release_read("Reader-1");
    assert_eq!(next_entry(&events), "Reader-6");
    assert!(sixth.join().unwrap());
    assert_eq!(room.active_reader_count(), 5);

    for i in 2..=6 {
        room.release_read(&format!("Reader-{i}"));
    }
    assert!(room.is_idle());
}

// ============================================================================
// EXCLUSION
// ============================================================================

#[test]
fn writer_waits_for_readers() {
    let (room, events) = observed_room(5);
    room.acquire_read("Reader-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let writer = enqueue(&room, "Writer-1", Role::Writer);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.active_writer_count(), 0);

    room.release_read("Reader-1");
    assert_eq!(next_entry(&events), "Writer-1");
    assert!(writer.join().unwrap());
    assert_eq!(room.active_reader_count(), 0);

    room.release_write("Writer-1");
}

#[test]
fn reader_waits_for_writer() {
    let (room, events) = observed_room(5);
    room.acquire_write("Writer-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let reader = enqueue(&room, "Reader-1", Role::Reader);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.active_reader_count(), 0);

    room.release_write("Writer-1");
    assert_eq!(next_entry(&events), "Reader-1");
    assert!(reader.join().unwrap());

    room.release_read("Reader-1");
}

#[test]
fn second_writer_waits_for_first() {
    let (room, events) = observed_room(5);
    room.acquire_write("Writer-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let second = enqueue(&room, "Writer-2", Role::Writer);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.active_writer_name().as_deref(), Some("Writer-1"));

    room.release_write("Writer-1");
    assert_eq!(next_entry(&events), "Writer-2");
    assert!(second.join().unwrap());
    assert_eq!(room.active_writer_name().as_deref(), Some("Writer-2"));

    room.release_write("Writer-2");
}

#[test]
fn lone_writer_enters_immediately() {
    let (room, events) = observed_room(5);
    room.acquire_write("Writer-1", &CancelToken::never()).unwrap();

    let kinds: Vec<_> = events.try_iter().map(|event| event.kind).collect();
    assert_eq!(kinds, [RoomEventKind::Requested, RoomEventKind::Entered]);
    assert_eq!(room.active_reader_count(), 0);

    room.release_write("Writer-1");
}

// ============================================================================
// FAIRNESS
// ============================================================================

#[test]
fn writer_queued_before_reader_enters_first() {
    let (room, events) = observed_room(5);
    room.acquire_read("Reader-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let writer = enqueue(&room, "Writer-1", Role::Writer);
    let reader = enqueue(&room, "Reader-2", Role::Reader);
    assert_eq!(room.queue_length(), 2);

    // Reader-2 could share the room with Reader-1, but Writer-1 is ahead of it
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.active_reader_names(), ["Reader-1"]);

    room.release_read("Reader-1");
    assert_eq!(next_entry(&events), "Writer-1");
    assert!(writer.join().unwrap());

    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.queue_length(), 1);
    assert_eq!(room.active_reader_count(), 0);

    room.release_write("Writer-1");
    assert_eq!(next_entry(&events), "Reader-2");
    assert!(reader.join().unwrap());

    room.release_read("Reader-2");
    assert!(room.is_idle());
}

#[test]
fn readers_enter_in_arrival_order() {
    let (room, events) = observed_room(1);
    room.acquire_read("Reader-0", &CancelToken::never()).unwrap();
    next_entry(&events);

    let handles: Vec<_> = (1..=4)
        .map(|i| enqueue(&room, &format!("Reader-{i}"), Role::Reader))
        .collect();

    let mut order = Vec::new();
    let mut current = "Reader-0".to_owned();
    for _ in 1..=4 {
        room.release_read(&current);
        current = next_entry(&events);
        order.push(current.clone());
    }
    room.release_read(&current);

    assert_eq!(order, ["Reader-1", "Reader-2", "Reader-3", "Reader-4"]);
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn freed_seat_goes_to_queued_reader_not_newcomer() {
    for round in 0..200 {
        let (room, events) = observed_room(1);
        room.acquire_read("Reader-0", &CancelToken::never()).unwrap();
        next_entry(&events);

        let queued = enqueue(&room, "Reader-A", Role::Reader);

        // Newcomer races the woken waiter for the mutex
        room.release_read("Reader-0");
        let newcomer = spawn_acquire(&room, "Reader-B", Role::Reader, CancelToken::never());

        assert_eq!(next_entry(&events), "Reader-A", "round {round}");
        assert!(queued.join().unwrap());

        room.release_read("Reader-A");
        assert_eq!(next_entry(&events), "Reader-B", "round {round}");
        assert!(newcomer.join().unwrap());
        room.release_read("Reader-B");
        assert!(room.is_idle());
    }
}

#[test]
fn writers_enter_in_arrival_order() {
    let (room, events) = observed_room(5);
    room.acquire_write("Writer-0", &CancelToken::never()).unwrap();
    next_entry(&events);

    let handles: Vec<_> = (1..=3)
        .map(|i| enqueue(&room, &format!("Writer-{i}"), Role::Writer))
        .collect();

    let mut order = Vec::new();
    let mut current = "Writer-0".to_owned();
    for _ in 1..=3 {
        room.release_write(&current);
        current = next_entry(&events);
        order.push(current.clone());
    }
    room.release_write(&current);

    assert_eq!(order, ["Writer-1", "Writer-2", "Writer-3"]);
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn later_readers_never_overtake_queued_writer() {
    let (room, events) = observed_room(5);
    room.acquire_read("Reader-0", &CancelToken::never()).unwrap();
    next_entry(&events);

    let writer = enqueue(&room, "Writer-1", Role::Writer);
    let readers: Vec<_> = (1..=4)
        .map(|i| enqueue(&room, &format!("Reader-{i}"), Role::Reader))
        .collect();

    room.release_read("Reader-0");
    assert_eq!(next_entry(&events), "Writer-1");
    assert!(writer.join().unwrap());

    room.release_write("Writer-1");
    let mut admitted: Vec<_> = (1..=4).map(|_| next_entry(&events)).collect();
    admitted.sort();
    assert_eq!(admitted, ["Reader-1", "Reader-2", "Reader-3", "Reader-4"]);

    for handle in readers {
        assert!(handle.join().unwrap());
    }
    for name in room.active_reader_names() {
        room.release_read(&name);
    }
}

#[test]
fn readers_waiting_behind_writer_still_get_in() {
    let (room, events) = observed_room(5);
    room.acquire_write("Writer-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let readers: Vec<_> = (1..=3)
        .map(|i| enqueue(&room, &format!("Reader-{i}"), Role::Reader))
        .collect();
    let writer = enqueue(&room, "Writer-2", Role::Writer);

    room.release_write("Writer-1");
    let mut admitted: Vec<_> = (1..=3).map(|_| next_entry(&events)).collect();
    admitted.sort();
    assert_eq!(admitted, ["Reader-1", "Reader-2", "Reader-3"]);

    for name in room.active_reader_names() {
        room.release_read(&name);
    }
    assert_eq!(next_entry(&events), "Writer-2");
    room.release_write("Writer-2");

    for handle in readers {
        assert!(handle.join().unwrap());
    }
    assert!(writer.join().unwrap());
}

// ============================================================================
// CANCELLATION
// ============================================================================

#[test]
fn cancelled_reader_leaves_queue_order_intact() {
    let (room, _events) = observed_room(5);
    room.acquire_write("Writer-0", &CancelToken::never()).unwrap();

    let first = enqueue(&room, "Reader-1", Role::Reader);

    let source = CancelSource::new();
    let before = room.queue_length();
    let cancelled = spawn_acquire(&room, "Reader-2", Role::Reader, source.token());
    wait_for(|| room.queue_length() == before + 1);

    let last = enqueue(&room, "Writer-1", Role::Writer);
    assert_eq!(room.queue_length(), 3);

    source.cancel();
    assert!(!cancelled.join().unwrap());

    // Exactly one ticket gone, the rest in their original order
    let queue: Vec<_> = room.snapshot().queue.into_iter().map(|r| r.name).collect();
    assert_eq!(queue, ["Reader-1", "Writer-1"]);

    room.release_write("Writer-0");
    assert!(first.join().unwrap());
    room.release_read("Reader-1");
    assert!(last.join().unwrap());
    room.release_write("Writer-1");
    assert!(room.is_idle());
}

#[test]
fn cancelled_writer_unblocks_readers_behind_it() {
    let (room, events) = observed_room(5);
    room.acquire_read("Reader-1", &CancelToken::never()).unwrap();
    next_entry(&events);

    let source = CancelSource::new();
    let writer = spawn_acquire(&room, "Writer-1", Role::Writer, source.token());
    wait_for(|| room.queue_length() == 1);

    let reader = enqueue(&room, "Reader-2", Role::Reader);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(room.active_reader_count(), 1);

    // Nobody releases: retracting the writer alone must let Reader-2 in
    source.cancel();
    assert!(!writer.join().unwrap());
    assert_eq!(next_entry(&events), "Reader-2");
    assert!(reader.join().unwrap());

    room.release_read("Reader-1");
    room.release_read("Reader-2");
    assert!(room.is_idle());
}

#[test]
fn stop_signal_unblocks_every_waiter() {
    let room = Arc::new(AdmissionLock::default());
    room.acquire_write("Writer-0", &CancelToken::never()).unwrap();

    let source = CancelSource::new();
    let waiters: Vec<_> = (1..=6)
        .map(|i| {
            let role = if i % 3 == 0 { Role::Writer } else { Role::Reader };
            spawn_acquire(&room, &format!("Actor-{i}"), role, source.token())
        })
        .collect();
    wait_for(|| room.queue_length() == 6);

    source.cancel();
    for waiter in waiters {
        assert!(!waiter.join().unwrap());
    }
    assert_eq!(room.queue_length(), 0);

    room.release_write("Writer-0");
    assert!(room.is_idle());
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn concurrent_actors_never_break_exclusion() {
    const MAX_READERS: usize = 3;
    let (room, events) = observed_room(MAX_READERS);
    let readers_inside = Arc::new(AtomicUsize::new(0));
    let writer_inside = Arc::new(AtomicBool::new(false));
    let admissions = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let room = Arc::clone(&room);
            let readers_inside = Arc::clone(&readers_inside);
            let writer_inside = Arc::clone(&writer_inside);
            let admissions = Arc::clone(&admissions);
            thread::spawn(move || {
                let never = CancelToken::never();
                let name = format!("Actor-{i}");
                for _ in 0..50 {
                    if i % 4 == 0 {
                        let _permit = room.write_permit(&name, &never).unwrap();
                        assert!(!writer_inside.swap(true, Ordering::SeqCst));
                        assert_eq!(readers_inside.load(Ordering::SeqCst), 0);
                        thread::yield_now();
                        writer_inside.store(false, Ordering::SeqCst);
                    } else {
                        let _permit = room.read_permit(&name, &never).unwrap();
                        let inside = readers_inside.fetch_add(1, Ordering::SeqCst) + 1;
                        assert!(inside <= MAX_READERS);
                        assert!(!writer_inside.load(Ordering::SeqCst));
                        thread::yield_now();
                        readers_inside.fetch_sub(1, Ordering::SeqCst);
                    }
                    admissions.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admissions.load(Ordering::SeqCst), 12 * 50);
    assert!(room.is_idle());
    assert_eq!(room.queue_length(), 0);

    // Every intermediate state seen by the observer held the invariants
    let mut seen = 0;
    for event in events.try_iter() {
        assert!(event.snapshot.holds_invariants(), "invariant broken: {event}");
        assert!(event.snapshot.readers.len() <= MAX_READERS);
        seen += 1;
    }
    assert!(seen >= 12 * 50 * 3);
}
