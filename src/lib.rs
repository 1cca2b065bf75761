//! # Bounded MPSC Array Queue for Mailboxes
//!
//! 面向邮箱的有界 MPSC 数组队列
//!
//! `mailring` is a bounded, lock-free, array-backed queue for many producer
//! threads and exactly one consumer thread, built as the storage layer of
//! actor and lightweight-thread mailboxes.
//!
//! `mailring` 是一个有界、无锁、基于数组的队列，支持多个生产者线程和唯一的消费者线程，
//! 用作 actor 与轻量级线程邮箱的存储层。
//!
//! ## Features
//!
//! 特性
//!
//! - **Lock-Free Producers** - Slots are claimed with a CAS on the tail counter
//! - **Single-Writer Consumer** - The head is advanced with a plain release store
//! - **Mid-Queue Removal** - The consumer can delete any live element in place
//! - **Removal-Aware Traversal** - Cursors resume correctly after compaction
//! - **Pluggable Storage** - Backends for owned values and for primitive atomics
//!
//! - **无锁生产者** - 通过对 tail 计数器的 CAS 获取槽位
//! - **单写者消费者** - head 通过普通 release 存储推进
//! - **队列中间移除** - 消费者可原地删除任意存活元素
//! - **感知移除的遍历** - 压缩之后游标能正确继续
//! - **可插拔存储** - 提供拥有值与原始原子类型两种后端
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ```rust
//! use mailring::{mailbox, ObjectStorage};
//!
//! let (producer, mut consumer) = mailbox::channel::<ObjectStorage<String>>(8).unwrap();
//!
//! producer.push("hello".to_string()).unwrap();
//! producer.push("world".to_string()).unwrap();
//!
//! assert_eq!(consumer.len(), 2);
//! assert_eq!(consumer.pop().as_deref(), Some("hello"));
//! assert_eq!(consumer.pop().as_deref(), Some("world"));
//! assert_eq!(consumer.pop(), None);
//! ```
//!
//! ## Selective Receive
//!
//! 选择性接收
//!
//! Mailboxes often scan for a matching message and remove it where it sits.
//!
//! 邮箱经常扫描匹配的消息并将其原地移除。
//!
//! ```rust
//! use mailring::{mailbox, ObjectStorage};
//!
//! let (producer, mut consumer) = mailbox::channel::<ObjectStorage<u32>>(8).unwrap();
//! for msg in [1, 20, 3, 40] {
//!     producer.push(msg).unwrap();
//! }
//!
//! let mut traversal = consumer.traverse();
//! while let Some(&msg) = traversal.next() {
//!     if msg >= 10 {
//!         traversal.remove();
//!     }
//! }
//!
//! assert_eq!(consumer.drain().collect::<Vec<_>>(), vec![1, 3]);
//! ```
//!
//! ## Notes
//!
//! 注意事项
//!
//! - Capacity is automatically rounded up to the nearest power of 2
//! - The queue never blocks: full and empty are reported to the caller
//! - Traversal and snapshots are weakly consistent with concurrent producers
//! - Removal cost grows with the distance from the head
//!
//! - 容量会自动向上取整到最接近的 2 的幂次
//! - 队列从不阻塞：满和空都报告给调用者
//! - 遍历和快照与并发生产者之间是弱一致的
//! - 移除代价随到 head 的距离增长

pub mod atomic;
pub mod backoff;
pub mod config;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod mailbox;
pub mod object;
pub mod queue;
pub mod storage;
pub mod trace;
mod shim;

pub use atomic::{AtomicElement, AtomicStorage};
pub use config::Config;
pub use cursor::Cursor;
pub use error::{CapacityError, Full, NotLive, PushError};
pub use mailbox::{Consumer, Producer, channel};
pub use object::ObjectStorage;
pub use queue::ArrayQueue;
pub use storage::Storage;

#[cfg(all(test, not(feature = "loom")))]
mod tests;
