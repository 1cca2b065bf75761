//! Traversal over the live elements of a queue
//!
//! 队列存活元素的遍历
//!
//! A [`Cursor`] is a physical slot index, not a logical counter. Its meaning
//! depends on the current arrangement of the slots, so after a removal the
//! traversal resumes from the index `remove` hands back.
//!
//! [`Cursor`] 是物理槽位索引而非逻辑计数器。其含义依赖于槽位的当前排列，
//! 因此移除之后遍历从 `remove` 返回的索引继续。

use crate::mailbox::Consumer;
use crate::storage::Storage;

/// Resumable traversal position
///
/// 可恢复的遍历位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Before the oldest element
    ///
    /// 位于最旧元素之前
    #[default]
    BeforeFirst,

    /// At the given physical slot
    ///
    /// 位于指定的物理槽位
    At(usize),
}

impl Cursor {
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::BeforeFirst => None,
            Cursor::At(index) => Some(index),
        }
    }
}

impl From<Option<usize>> for Cursor {
    #[inline]
    fn from(index: Option<usize>) -> Self {
        index.map_or(Cursor::BeforeFirst, Cursor::At)
    }
}

/// Stateful traversal that can remove the element it stands on
///
/// 可移除当前元素的有状态遍历
///
/// This is a lending cursor: the view returned by [`next`](Self::next)
/// borrows the traversal, so it must be dropped before calling `remove`.
///
/// 这是一个借出式游标：[`next`](Self::next) 返回的视图借用遍历本身，
/// 因此在调用 `remove` 之前必须释放它。
///
/// # Examples
///
/// ```
/// use mailring::{mailbox, ObjectStorage};
///
/// let (producer, mut consumer) = mailbox::channel::<ObjectStorage<char>>(4).unwrap();
/// for c in ['a', 'b', 'c'] {
///     producer.push(c).unwrap();
/// }
///
/// let mut traversal = consumer.traverse();
/// let mut seen = Vec::new();
/// while let Some(&c) = traversal.next() {
///     seen.push(c);
///     if c == 'b' {
///         traversal.remove();
///     }
/// }
/// assert_eq!(seen, ['a', 'b', 'c']);
/// assert_eq!(consumer.snapshot(), [&'a', &'c']);
/// ```
pub struct Traversal<'a, S: Storage> {
    consumer: &'a mut Consumer<S>,
    cursor: Cursor,
}

impl<'a, S: Storage> Traversal<'a, S> {
    pub(crate) fn new(consumer: &'a mut Consumer<S>) -> Self {
        Self {
            consumer,
            cursor: Cursor::BeforeFirst,
        }
    }

    #[inline]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Restart from before the oldest element
    ///
    /// 从最旧元素之前重新开始
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = Cursor::BeforeFirst;
    }

    /// Whether another element follows the cursor
    ///
    /// 游标之后是否还有元素
    #[inline]
    pub fn has_next(&self) -> bool {
        self.consumer.succ(self.cursor).is_some()
    }

    /// Advance and return a view of the element
    ///
    /// 前进并返回元素视图
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<S::Value<'_>> {
        let index = self.consumer.succ(self.cursor)?;
        self.cursor = Cursor::At(index);
        self.consumer.value(index)
    }

    /// Remove the element returned by the last `next`
    ///
    /// 移除上一次 `next` 返回的元素
    ///
    /// Returns `false` when the cursor does not stand on a live element. The
    /// cursor moves to the removed element's predecessor, so the following
    /// `next` yields the element after the removed one.
    ///
    /// 当游标不在存活元素上时返回 `false`。游标移动到被移除元素的前驱，
    /// 因此下一次 `next` 返回被移除元素之后的元素。
    pub fn remove(&mut self) -> bool {
        let Cursor::At(index) = self.cursor else {
            return false;
        };
        match self.consumer.remove(index) {
            Ok(predecessor) => {
                self.cursor = Cursor::from(predecessor);
                true
            }
            Err(_) => false,
        }
    }
}

/// Read-only iterator over the live elements, oldest first
///
/// 存活元素的只读迭代器，从旧到新
pub struct Iter<'a, S: Storage> {
    consumer: &'a Consumer<S>,
    cursor: Cursor,
}

impl<'a, S: Storage> Iter<'a, S> {
    pub(crate) fn new(consumer: &'a Consumer<S>) -> Self {
        Self {
            consumer,
            cursor: Cursor::BeforeFirst,
        }
    }
}

impl<'a, S: Storage + 'a> Iterator for Iter<'a, S> {
    type Item = S::Value<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.consumer.succ(self.cursor)?;
        self.cursor = Cursor::At(index);
        self.consumer.value(index)
    }
}

/// Draining iterator for the queue
///
/// 队列的消费迭代器
///
/// This iterator removes and returns elements until the queue is empty.
///
/// 此迭代器移除并返回元素，直到队列为空。
pub struct Drain<'a, S: Storage> {
    consumer: &'a mut Consumer<S>,
}

impl<'a, S: Storage> Drain<'a, S> {
    pub(crate) fn new(consumer: &'a mut Consumer<S>) -> Self {
        Self { consumer }
    }
}

impl<S: Storage> Iterator for Drain<'_, S> {
    type Item = S::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.consumer.pop()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.consumer.capacity()))
    }
}
