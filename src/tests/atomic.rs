//! Queue behaviour over the atomic backend
//!
//! 原子后端上的队列行为

use crate::atomic::AtomicStorage;
use crate::cursor::Cursor;
use crate::mailbox::channel;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU64};

#[test]
fn test_u64_fifo() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicU64>>(16).unwrap();
    for i in 0..16u64 {
        producer.push(i * i).unwrap();
    }
    assert!(producer.is_full());
    let drained: Vec<u64> = consumer.drain().collect();
    assert_eq!(drained, (0..16u64).map(|i| i * i).collect::<Vec<_>>());
}

#[test]
fn test_snapshot_returns_copies() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicI32>>(4).unwrap();
    for value in [-1, 0, 1] {
        producer.push(value).unwrap();
    }
    let snapshot = consumer.snapshot();
    assert_eq!(snapshot, [-1, 0, 1]);

    consumer.clear();
    assert_eq!(snapshot, [-1, 0, 1]);
    assert!(consumer.snapshot().is_empty());
}

#[test]
fn test_remove_interior_compacts() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicU64>>(8).unwrap();
    for value in [10, 20, 30, 40, 50] {
        producer.push(value).unwrap();
    }

    // 10 and 20 shift one slot toward the tail
    assert_eq!(consumer.remove(2), Ok(Some(2)));
    assert_eq!(consumer.peek(), Some(1));
    assert_eq!(consumer.value(0), None);
    assert_eq!(consumer.value(1), Some(10));
    assert_eq!(consumer.value(2), Some(20));
    assert_eq!(consumer.snapshot(), [10, 20, 40, 50]);
}

#[test]
fn test_remove_tail_then_push_reuses_slot() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicU8>>(4).unwrap();
    for value in [1, 2, 3] {
        producer.push(value).unwrap();
    }
    assert_eq!(consumer.remove(2), Ok(Some(1)));
    producer.push(9).unwrap();
    assert_eq!(consumer.value(2), Some(9));
    assert_eq!(consumer.drain().collect::<Vec<_>>(), [1, 2, 9]);
}

#[test]
fn test_bool_traversal_filter() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicBool>>(8).unwrap();
    for flag in [true, false, true, true, false] {
        producer.push(flag).unwrap();
    }

    let mut traversal = consumer.traverse();
    while let Some(flag) = traversal.next() {
        if !flag {
            assert!(traversal.remove());
        }
    }
    assert_eq!(consumer.len(), 3);
    assert!(consumer.iter().all(|flag| flag));
}

#[test]
fn test_succ_after_wrap() {
    let (producer, mut consumer) = channel::<AtomicStorage<AtomicU64>>(4).unwrap();
    for i in 0..4 {
        producer.push(i).unwrap();
    }
    consumer.pop();
    consumer.pop();
    consumer.pop();
    producer.push(4).unwrap();
    producer.push(5).unwrap();

    // head sits in slot 3, the newer elements wrapped into slots 0 and 1
    let first = consumer.succ(Cursor::BeforeFirst).unwrap();
    assert_eq!(first, 3);
    let second = consumer.succ(Cursor::At(first)).unwrap();
    assert_eq!(second, 0);
    let third = consumer.succ(Cursor::At(second)).unwrap();
    assert_eq!(third, 1);
    assert_eq!(consumer.succ(Cursor::At(third)), None);
    assert_eq!(consumer.value(third), Some(5));
}
