//! `tmp` store — ephemeral in-memory note store.
//!
//! All data lives in process memory and is discarded when the process exits.
//! Selected with `[notes] store = "memory"`; also the store behind most
//! router and service tests.
//!
//! A [`BTreeMap`] keeps names in `str` order, so prefix listing is a range
//! scan that comes out already sorted.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard};

use crate::error::AppError;
use crate::subsystems::notes::store::{DeleteOutcome, NoteStore, UpdateOutcome, check_name};

/// Ephemeral in-memory [`NoteStore`].
#[derive(Default)]
pub struct TmpNoteStore {
    /// name -> text
    data: Mutex<BTreeMap<String, String>>,
}

impl TmpNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, AppError> {
        self.data
            .lock()
            .map_err(|_| AppError::Store("tmp store lock poisoned".into()))
    }
}

impl NoteStore for TmpNoteStore {
    fn store_type(&self) -> &str {
        "tmp"
    }

    fn save(&self, name: &str, text: &str) -> Result<(), AppError> {
        check_name(name)?;
        self.lock()?.insert(name.to_string(), text.to_string());
        Ok(())
    }

    fn update_if_exists(&self, name: &str, text: &str) -> Result<UpdateOutcome, AppError> {
        check_name(name)?;
        let mut data = self.lock()?;
        Ok(match data.get_mut(name) {
            Some(existing) => {
                *existing = text.to_string();
                UpdateOutcome::Updated
            }
            None => UpdateOutcome::NotFound,
        })
    }

    fn delete_if_exists(&self, name: &str) -> Result<DeleteOutcome, AppError> {
        check_name(name)?;
        Ok(match self.lock()?.remove(name) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    fn get(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let data = self.lock()?;
        Ok(data
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_get_delete() {
        let store = TmpNoteStore::new();
        assert_eq!(store.get("foo").unwrap(), None);

        store.save("foo", "bar").unwrap();
        assert_eq!(store.get("foo").unwrap(), Some("bar".into()));

        store.save("foo", "baz").unwrap();
        assert_eq!(store.get("foo").unwrap(), Some("baz".into()));

        assert_eq!(store.delete_if_exists("foo").unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.get("foo").unwrap(), None);
        assert_eq!(store.delete_if_exists("foo").unwrap(), DeleteOutcome::NotFound);
    }

    #[test]
    fn update_requires_existing() {
        let store = TmpNoteStore::new();
        assert_eq!(store.update_if_exists("x", "1").unwrap(), UpdateOutcome::NotFound);
        assert_eq!(store.get("x").unwrap(), None);
        store.save("x", "1").unwrap();
        assert_eq!(store.update_if_exists("x", "2").unwrap(), UpdateOutcome::Updated);
        assert_eq!(store.get("x").unwrap(), Some("2".into()));
    }

    #[test]
    fn prefix_range_scan() {
        let store = TmpNoteStore::new();
        for n in ["note2", "note1", "nota", "other", "Note3"] {
            store.save(n, "t").unwrap();
        }
        assert_eq!(store.list_by_prefix("note").unwrap(), vec!["note1", "note2"]);
        assert_eq!(store.list_by_prefix("zzz").unwrap(), Vec::<String>::new());
        assert_eq!(
            store.list_by_prefix("").unwrap(),
            vec!["Note3", "nota", "note1", "note2", "other"]
        );
    }

    #[test]
    fn embedded_nul_in_prefix() {
        let store = TmpNoteStore::new();
        for n in ["a\0b", "ab", "a"] {
            store.save(n, "t").unwrap();
        }
        assert_eq!(store.list_by_prefix("a\0").unwrap(), vec!["a\0b"]);
        assert_eq!(store.list_by_prefix("a").unwrap(), vec!["a", "a\0b", "ab"]);
    }

    #[test]
    fn store_type_is_tmp() {
        assert_eq!(TmpNoteStore::new().store_type(), "tmp");
    }
}
