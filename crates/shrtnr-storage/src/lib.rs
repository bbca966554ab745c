//! Mapping store backends.
//!
//! [`RedbRepository`] persists mappings in a single redb file and is the
//! backend used in production. [`InMemoryRepository`] keeps everything in a
//! `DashMap` and loses its content when dropped.

pub mod memory;
pub mod redb;

pub use memory::InMemoryRepository;
pub use crate::redb::RedbRepository;
pub use shrtnr_core::repository::{ReadRepository, Repository, Result};
pub use shrtnr_core::StorageError;
