//! Storage backend for arbitrary element types
//!
//! 任意元素类型的存储后端
//!
//! Each slot pairs an uninitialized cell with a `ready` flag. A producer
//! writes the cell and then sets the flag with release ordering; the consumer
//! checks the flag with acquire ordering before touching the cell.
//!
//! 每个槽位由一个未初始化单元和 `ready` 标志组成。生产者先写入单元，再以 release
//! 顺序设置标志；消费者在访问单元之前以 acquire 顺序检查标志。

use crate::shim::atomic::{AtomicBool, Ordering};
use crate::storage::Storage;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

struct Slot<T> {
    ready: AtomicBool,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Slot array holding owned values of type `T`
///
/// 持有 `T` 类型值的槽位数组
///
/// Values are handed out as `&T`; elements still in the ring are dropped with
/// the storage.
///
/// 值以 `&T` 形式借出；环中剩余的元素随存储一起 drop。
pub struct ObjectStorage<T> {
    slots: Box<[Slot<T>]>,
}

// SAFETY: a slot's cell is written by the single producer owning its
// reservation and otherwise accessed only by the single consumer; the ready
// flag orders the hand-off
unsafe impl<T: Send> Send for ObjectStorage<T> {}
unsafe impl<T: Send> Sync for ObjectStorage<T> {}

impl<T> Storage for ObjectStorage<T> {
    type Item = T;
    type Value<'a>
        = &'a T
    where
        Self: 'a;

    fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Slot::new()).collect(),
        }
    }

    #[inline]
    fn array_len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    unsafe fn publish(&self, index: usize, item: T) {
        let slot = &self.slots[index];
        debug_assert!(!slot.ready.load(Ordering::Relaxed));
        unsafe { (*slot.value.get()).write(item) };
        slot.ready.store(true, Ordering::Release);
    }

    #[inline]
    fn is_published(&self, index: usize) -> bool {
        self.slots[index].ready.load(Ordering::Acquire)
    }

    #[inline]
    unsafe fn value(&self, index: usize) -> Option<&T> {
        let slot = &self.slots[index];
        if !slot.ready.load(Ordering::Acquire) {
            return None;
        }
        Some(unsafe { (*slot.value.get()).assume_init_ref() })
    }

    #[inline]
    unsafe fn take_value(&self, index: usize) -> Option<T> {
        let slot = &self.slots[index];
        if !slot.ready.load(Ordering::Acquire) {
            return None;
        }
        let item = unsafe { (*slot.value.get()).assume_init_read() };
        slot.ready.store(false, Ordering::Release);
        Some(item)
    }

    #[inline]
    unsafe fn clear_value(&self, index: usize) {
        drop(unsafe { self.take_value(index) });
    }

    unsafe fn copy_value(&self, to: usize, from: usize) {
        if let Some(item) = unsafe { self.take_value(from) } {
            let slot = &self.slots[to];
            debug_assert!(!slot.ready.load(Ordering::Relaxed));
            unsafe { (*slot.value.get()).write(item) };
            slot.ready.store(true, Ordering::Release);
        }
    }
}

impl<T> Drop for ObjectStorage<T> {
    fn drop(&mut self) {
        for slot in self.slots.iter() {
            if slot.ready.load(Ordering::Acquire) {
                // SAFETY: `&mut self`, no producer or consumer is left
                unsafe { (*slot.value.get()).assume_init_drop() };
            }
        }
    }
}
