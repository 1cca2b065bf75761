//! Storage backend for primitive payloads
//!
//! 原始类型负载的存储后端
//!
//! Slots are atomics such as `AtomicU64`, so values are copied in and out
//! through atomic load/store instead of being moved through raw memory. No
//! `unsafe` cell access is involved.
//!
//! 槽位是 `AtomicU64` 等原子类型，值通过原子 load/store 复制进出，
//! 而不是经由原始内存移动，不涉及 `unsafe` 单元访问。

use crate::shim::atomic::{AtomicBool, Ordering};
use crate::storage::Storage;

/// Trait for atomic types usable as slots
///
/// 可用作槽位的原子类型 trait
///
/// This trait abstracts atomic operations to allow generic storage over
/// different atomic types (AtomicU8, AtomicU64, AtomicUsize, etc.)
///
/// 此 trait 抽象了原子操作，允许在不同原子类型上实现泛型存储
/// (AtomicU8, AtomicU64, AtomicUsize 等)
pub trait AtomicElement: Send + Sync + Default {
    /// The underlying primitive type
    ///
    /// 底层原始类型
    type Primitive: Copy;

    /// Load the value with specified ordering
    ///
    /// 使用指定的内存顺序加载值
    fn load(&self, order: Ordering) -> Self::Primitive;

    /// Store a value with specified ordering
    ///
    /// 使用指定的内存顺序存储值
    fn store(&self, val: Self::Primitive, order: Ordering);
}

use std::sync::atomic::{
    AtomicBool as StdAtomicBool, AtomicI8, AtomicI16, AtomicI32, AtomicI64, AtomicIsize,
    AtomicU8, AtomicU16, AtomicU32, AtomicU64, AtomicUsize,
};

macro_rules! impl_atomic_element {
    ($atomic:ty, $primitive:ty) => {
        impl AtomicElement for $atomic {
            type Primitive = $primitive;

            #[inline]
            fn load(&self, order: Ordering) -> Self::Primitive {
                <$atomic>::load(self, order)
            }

            #[inline]
            fn store(&self, val: Self::Primitive, order: Ordering) {
                <$atomic>::store(self, val, order);
            }
        }
    };
}

impl_atomic_element!(AtomicU8, u8);
impl_atomic_element!(AtomicU16, u16);
impl_atomic_element!(AtomicU32, u32);
impl_atomic_element!(AtomicU64, u64);
impl_atomic_element!(AtomicUsize, usize);
impl_atomic_element!(AtomicI8, i8);
impl_atomic_element!(AtomicI16, i16);
impl_atomic_element!(AtomicI32, i32);
impl_atomic_element!(AtomicI64, i64);
impl_atomic_element!(AtomicIsize, isize);
impl_atomic_element!(StdAtomicBool, bool);

struct AtomicSlot<A> {
    ready: AtomicBool,
    value: A,
}

/// Slot array of atomics
///
/// 原子类型的槽位数组
///
/// # Type Parameters
/// - `A`: Atomic type implementing [`AtomicElement`]
///
/// # 类型参数
/// - `A`: 实现 [`AtomicElement`] 的原子类型
///
/// # Examples
///
/// ```
/// use mailring::{mailbox, AtomicStorage};
/// use std::sync::atomic::AtomicU64;
///
/// let (producer, mut consumer) = mailbox::channel::<AtomicStorage<AtomicU64>>(4).unwrap();
/// producer.push(7).unwrap();
/// producer.push(9).unwrap();
/// assert_eq!(consumer.snapshot(), [7, 9]);
/// assert_eq!(consumer.pop(), Some(7));
/// ```
pub struct AtomicStorage<A: AtomicElement> {
    slots: Box<[AtomicSlot<A>]>,
}

impl<A: AtomicElement> Storage for AtomicStorage<A> {
    type Item = A::Primitive;
    type Value<'a>
        = A::Primitive
    where
        Self: 'a;

    fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len)
                .map(|_| AtomicSlot {
                    ready: AtomicBool::new(false),
                    value: A::default(),
                })
                .collect(),
        }
    }

    #[inline]
    fn array_len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    unsafe fn publish(&self, index: usize, item: A::Primitive) {
        let slot = &self.slots[index];
        slot.value.store(item, Ordering::Relaxed);
        slot.ready.store(true, Ordering::Release);
    }

    #[inline]
    fn is_published(&self, index: usize) -> bool {
        self.slots[index].ready.load(Ordering::Acquire)
    }

    #[inline]
    unsafe fn value(&self, index: usize) -> Option<A::Primitive> {
        let slot = &self.slots[index];
        slot.ready
            .load(Ordering::Acquire)
            .then(|| slot.value.load(Ordering::Relaxed))
    }

    #[inline]
    unsafe fn take_value(&self, index: usize) -> Option<A::Primitive> {
        let value = unsafe { self.value(index) }?;
        self.slots[index].ready.store(false, Ordering::Release);
        Some(value)
    }

    #[inline]
    unsafe fn clear_value(&self, index: usize) {
        self.slots[index].ready.store(false, Ordering::Release);
    }

    unsafe fn copy_value(&self, to: usize, from: usize) {
        if let Some(value) = unsafe { self.take_value(from) } {
            unsafe { self.publish(to, value) };
        }
    }
}
