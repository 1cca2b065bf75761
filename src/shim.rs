//! Shim module to abstract over std and loom primitives.
//!
//! Counters, publication flags and spin hints go through this module so the
//! `loom` feature can swap in model-checked versions without touching the queue.

#[cfg(not(feature = "loom"))]
pub mod atomic {
    pub use std::sync::atomic::*;
}

#[cfg(feature = "loom")]
pub mod atomic {
    pub use loom::sync::atomic::*;
}

#[cfg(not(feature = "loom"))]
pub mod sync {
    pub use std::sync::Arc;
}

#[cfg(feature = "loom")]
pub mod sync {
    pub use loom::sync::Arc;
}

#[cfg(not(feature = "loom"))]
pub mod hint {
    pub use std::hint::spin_loop;
}

#[cfg(feature = "loom")]
pub mod hint {
    // loom's spin hint yields to the model scheduler, so await loops terminate
    pub use loom::hint::spin_loop;
}
