//! Index data model.
//!
//! # Responsibility
//! - Define the in-memory structures behind the tag index.
//! - Keep structural invariants (sorted, unique, no empty lists) local to
//!   the types that own them.
//!
//! # Invariants
//! - A `TagIndex` never stores an empty `SourceList`.

pub mod source_list;
pub mod tag_index;
