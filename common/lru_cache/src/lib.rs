//! Bounded, insertion-ordered caches.
//!
//! Both caches evict the *oldest inserted* keys first, regardless of how recently a key was
//! read. Eviction is explicit: callers insert freely and call `prune` once they are done with a
//! batch of insertions, which lets a single logical operation temporarily exceed the capacity.
mod map;
mod space;

pub use map::FifoMap;
pub use space::FifoSet;
