//! Inline reference matcher — `#name` lookups inside ordinary messages.
//!
//! Evaluated only when a message is not a recognized command.  The FIRST
//! `#` followed by one or more word characters wins; later references in
//! the same message are ignored.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;

use crate::error::AppError;
use super::replies;
use super::store::NoteStore;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(\w+)").expect("inline reference pattern is valid")
});

/// Extract the first referenced note name, if any.
pub fn first_reference(text: &str) -> Option<&str> {
    REFERENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub struct RetrievalMatcher {
    store: Arc<dyn NoteStore>,
}

impl RetrievalMatcher {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` when `text` carries no reference.
    pub fn resolve(&self, text: &str) -> Result<Option<String>, AppError> {
        let Some(name) = first_reference(text) else {
            return Ok(None);
        };
        let reply = match self.store.get(name)? {
            Some(body) => {
                info!(note = %name, "note retrieved");
                replies::note_body(name, &body)
            }
            None => replies::not_found(name),
        };
        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::notes::stores::tmp::TmpNoteStore;

    #[test]
    fn finds_first_reference() {
        assert_eq!(first_reference("see #recipe for details"), Some("recipe"));
        assert_eq!(first_reference("#a and #b"), Some("a"));
        assert_eq!(first_reference("#my-note"), Some("my"));
        assert_eq!(first_reference("café #crème"), Some("crème"));
        assert_eq!(first_reference("no refs here"), None);
        assert_eq!(first_reference("lonely # marker"), None);
    }

    #[test]
    fn resolves_hit_and_miss() {
        let store = Arc::new(TmpNoteStore::new());
        store.save("recipe", "Recipe body").unwrap();
        let m = RetrievalMatcher::new(store);

        let hit = m.resolve("see #recipe for details").unwrap().unwrap();
        assert!(hit.contains("Recipe body"));
        assert!(hit.contains("\"recipe\""));

        let miss = m.resolve("#ghost").unwrap().unwrap();
        assert_eq!(miss, replies::not_found("ghost"));

        assert_eq!(m.resolve("plain text").unwrap(), None);
    }
}
