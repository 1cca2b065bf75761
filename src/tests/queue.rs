//! Queue semantics: ordering, capacity, removal and traversal
//!
//! 队列语义：顺序、容量、移除与遍历

use crate::cursor::Cursor;
use crate::error::{Full, NotLive};
use crate::mailbox::{Consumer, Producer, channel};
use crate::object::ObjectStorage;
use crate::queue::ArrayQueue;
use crate::storage::Storage;
use crate::Config;

fn filled(capacity: usize, values: &[char]) -> (Producer<ObjectStorage<char>>, Consumer<ObjectStorage<char>>) {
    let (producer, consumer) = channel::<ObjectStorage<char>>(capacity).unwrap();
    for &value in values {
        producer.push(value).unwrap();
    }
    (producer, consumer)
}

// ============================================================================
// SEGMENT 1: Ordering and Capacity
// 第1段：顺序与容量
// ============================================================================

#[test]
fn test_fifo_order_full_drain() {
    let (producer, mut consumer) = channel::<ObjectStorage<u32>>(8).unwrap();
    for i in 1..=8 {
        producer.push(i).unwrap();
    }
    let drained: Vec<u32> = consumer.drain().collect();
    assert_eq!(drained, (1..=8).collect::<Vec<_>>());
    assert!(consumer.is_empty());
}

#[test]
fn test_full_then_reuse_freed_slot() {
    let queue: ArrayQueue<ObjectStorage<u32>> = ArrayQueue::try_new(4).unwrap();
    for i in 0..4 {
        queue.push(i).unwrap();
    }
    assert_eq!(queue.reserve(), Err(Full));

    // SAFETY: single-threaded test acts as the only consumer
    assert_eq!(unsafe { queue.pop() }, Some(0));

    let position = queue.reserve().unwrap();
    assert_eq!(position, 4);
    // lands in the slot position 0 used to occupy
    assert_eq!(queue.geometry().index(position), 0);
}

#[test]
fn test_push_pop_stress_wrapping() {
    // Many laps around a small ring
    // 在小环上多次环绕
    crate::trace::init_tracing();
    let (producer, mut consumer) = channel::<ObjectStorage<i32>>(8).unwrap();

    for cycle in 0..50 {
        for i in 0..8 {
            producer.push(cycle * 100 + i).unwrap();
        }
        for i in 0..8 {
            assert_eq!(consumer.pop(), Some(cycle * 100 + i));
        }
    }
    assert_eq!(consumer.queue().head_position(), 400);
    assert_eq!(consumer.queue().tail_position(), 400);
}

#[test]
fn test_config_backoff_budget() {
    let (producer, consumer) = channel::<ObjectStorage<u8>>(Config::new(3).backoff_spins(0)).unwrap();
    assert_eq!(producer.capacity(), 4);
    producer.push(1).unwrap();
    assert_eq!(consumer.len(), 1);
}

// ============================================================================
// SEGMENT 2: Dequeue and Removal
// 第2段：出队与移除
// ============================================================================

#[test]
fn test_dequeue_through_later_index() {
    let (_producer, mut consumer) = filled(4, &['a', 'b', 'c', 'd']);
    assert_eq!(consumer.dequeue(2), Ok(()));
    assert_eq!(consumer.snapshot(), [&'d']);
    assert_eq!(consumer.queue().head_position(), 3);
}

#[test]
fn test_remove_head_degenerates_to_dequeue() {
    let (_producer, mut consumer) = filled(4, &['a', 'b', 'c']);
    assert_eq!(consumer.remove(0), Ok(None));
    assert_eq!(consumer.snapshot(), [&'b', &'c']);
    assert_eq!(consumer.queue().head_position(), 1);
    assert_eq!(consumer.queue().tail_position(), 3);
}

#[test]
fn test_remove_tail_retracts() {
    let (producer, mut consumer) = filled(4, &['a', 'b', 'c']);

    // predecessor 'b' stays in slot 1
    assert_eq!(consumer.remove(2), Ok(Some(1)));
    assert_eq!(consumer.snapshot(), [&'a', &'b']);
    assert_eq!(consumer.queue().head_position(), 0);
    assert_eq!(consumer.queue().tail_position(), 2);

    // next reservation reuses the retracted position
    assert_eq!(producer.queue().reserve(), Ok(2));
}

#[test]
fn test_remove_interior_compacts() {
    let (_producer, mut consumer) = filled(4, &['a', 'b', 'c']);

    // 'a' shifts from slot 0 into slot 1 and the head advances past slot 0
    assert_eq!(consumer.remove(1), Ok(Some(1)));
    assert_eq!(consumer.snapshot(), [&'a', &'c']);
    assert_eq!(consumer.queue().head_position(), 1);
    assert_eq!(consumer.queue().tail_position(), 3);
    assert_eq!(consumer.peek(), Some(1));
    assert_eq!(consumer.value(1), Some(&'a'));
    assert_eq!(consumer.value(0), None);

    assert_eq!(consumer.drain().collect::<Vec<_>>(), ['a', 'c']);
}

#[test]
fn test_remove_interior_across_wrap() {
    let (producer, mut consumer) = channel::<ObjectStorage<i32>>(4).unwrap();
    for i in 0..4 {
        producer.push(i).unwrap();
    }
    assert_eq!(consumer.pop(), Some(0));
    assert_eq!(consumer.pop(), Some(1));
    producer.push(4).unwrap();
    producer.push(5).unwrap();

    // live: slot2=2, slot3=3, slot0=4, slot1=5
    assert_eq!(consumer.remove(0), Ok(Some(0)));
    assert_eq!(consumer.snapshot(), [&2, &3, &5]);
    assert_eq!(consumer.queue().head_position(), 3);
    assert_eq!(consumer.drain().collect::<Vec<_>>(), [2, 3, 5]);
}

#[test]
fn test_remove_dead_index_rejected() {
    let (_producer, mut consumer) = filled(4, &['a']);
    assert_eq!(consumer.remove(1), Err(NotLive(1)));
    assert_eq!(consumer.dequeue(3), Err(NotLive(3)));
    assert_eq!(consumer.snapshot(), [&'a']);
}

#[test]
fn test_clear() {
    let (producer, mut consumer) = filled(8, &['a', 'b', 'c']);
    consumer.clear();
    assert!(consumer.is_empty());
    assert_eq!(consumer.peek(), None);
    producer.push('z').unwrap();
    assert_eq!(consumer.pop(), Some('z'));
}

// ============================================================================
// SEGMENT 3: Cursors and Traversal
// 第3段：游标与遍历
// ============================================================================

#[test]
fn test_peek_succ_walk() {
    let (_producer, consumer) = filled(4, &['a', 'b', 'c']);
    assert_eq!(consumer.succ(Cursor::BeforeFirst), Some(0));
    assert_eq!(consumer.succ(Cursor::At(0)), Some(1));
    assert_eq!(consumer.succ(Cursor::At(1)), Some(2));
    assert_eq!(consumer.succ(Cursor::At(2)), None);
}

#[test]
fn test_empty_queue_has_nothing_next() {
    let (_producer, consumer) = filled(4, &[]);
    assert!(!consumer.has_next());
    assert_eq!(consumer.peek(), None);
    assert_eq!(consumer.succ(Cursor::BeforeFirst), None);
    assert_eq!(consumer.iter().count(), 0);
}

#[test]
fn test_iter_oldest_first() {
    let (_producer, consumer) = filled(8, &['x', 'y', 'z']);
    let seen: Vec<char> = consumer.iter().copied().collect();
    assert_eq!(seen, ['x', 'y', 'z']);
    assert_eq!(consumer.len(), 3);
}

#[test]
fn test_traversal_remove_resumes_after_removed() {
    let (_producer, mut consumer) = filled(4, &['a', 'b', 'c']);

    let mut traversal = consumer.traverse();
    assert_eq!(traversal.next(), Some(&'a'));
    assert_eq!(traversal.next(), Some(&'b'));
    assert!(traversal.remove());
    // cursor now sits on the slot holding 'a'
    assert_eq!(traversal.cursor(), Cursor::At(1));

    let mut rest = Vec::new();
    while let Some(&c) = traversal.next() {
        rest.push(c);
    }
    assert_eq!(rest, ['c']);
    assert_eq!(consumer.snapshot(), [&'a', &'c']);
}

#[test]
fn test_traversal_remove_every_element() {
    let (_producer, mut consumer) = filled(4, &['a', 'b', 'c']);

    let mut traversal = consumer.traverse();
    let mut removed = Vec::new();
    while let Some(&c) = traversal.next() {
        removed.push(c);
        assert!(traversal.remove());
        assert_eq!(traversal.cursor(), Cursor::BeforeFirst);
    }
    assert_eq!(removed, ['a', 'b', 'c']);
    assert!(consumer.is_empty());
    assert_eq!(consumer.queue().head_position(), 3);
}

#[test]
fn test_traversal_remove_tail_then_stop() {
    let (_producer, mut consumer) = filled(8, &['a', 'b', 'c']);

    let mut traversal = consumer.traverse();
    let mut seen = Vec::new();
    while let Some(&c) = traversal.next() {
        seen.push(c);
        if c == 'c' {
            assert!(traversal.remove());
        }
    }
    assert_eq!(seen, ['a', 'b', 'c']);
    assert_eq!(consumer.queue().tail_position(), 2);
    assert_eq!(consumer.snapshot(), [&'a', &'b']);
}

#[test]
fn test_traversal_remove_without_next() {
    let (_producer, mut consumer) = filled(4, &['a']);
    let mut traversal = consumer.traverse();
    assert!(!traversal.remove());
    assert!(traversal.has_next());
}

#[test]
fn test_traversal_reset() {
    let (_producer, mut consumer) = filled(4, &['a', 'b']);
    let mut traversal = consumer.traverse();
    assert_eq!(traversal.next(), Some(&'a'));
    assert_eq!(traversal.next(), Some(&'b'));
    assert!(!traversal.has_next());

    traversal.reset();
    assert_eq!(traversal.cursor(), Cursor::BeforeFirst);
    assert_eq!(traversal.next(), Some(&'a'));
}

// ============================================================================
// SEGMENT 4: Snapshot
// 第4段：快照
// ============================================================================

#[test]
fn test_snapshot_idempotent() {
    let (_producer, consumer) = filled(8, &['a', 'b', 'c', 'd']);
    let first = consumer.snapshot();
    let second = consumer.snapshot();
    assert_eq!(first, second);
    assert_eq!(first, [&'a', &'b', &'c', &'d']);
}

#[test]
fn test_snapshot_skips_unpublished_reservation() {
    let (producer, consumer) = filled(4, &['a']);
    let position = producer.queue().reserve().unwrap();
    assert_eq!(position, 1);
    assert_eq!(consumer.len(), 2);
    assert_eq!(consumer.snapshot(), [&'a']);

    // SAFETY: publishing into the position reserved above
    unsafe { producer.queue().storage().publish(1, 'b') };
    assert_eq!(consumer.snapshot(), [&'a', &'b']);
}

#[test]
fn test_snapshot_after_wrap() {
    let (producer, mut consumer) = channel::<ObjectStorage<u32>>(4).unwrap();
    for i in 0..4 {
        producer.push(i).unwrap();
    }
    consumer.pop();
    consumer.pop();
    consumer.pop();
    producer.push(4).unwrap();
    producer.push(5).unwrap();
    assert_eq!(consumer.snapshot(), [&3, &4, &5]);
}
