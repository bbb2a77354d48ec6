//! Index coordination services.
//!
//! # Responsibility
//! - Expose the thread-safe tag index used by host applications.
//! - Keep locking, change tracking and persistence wiring out of the model.

pub mod hash_list;
