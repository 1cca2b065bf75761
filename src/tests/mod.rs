mod atomic;
mod queue;
