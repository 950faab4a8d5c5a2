//! Queue module: the bounded request queue workers consume from.

mod bounded;

pub use bounded::BoundedQueue;
