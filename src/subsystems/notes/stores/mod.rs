//! Concrete [`NoteStore`](super::NoteStore) backends.

pub mod sqlite;
pub mod tmp;
