// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Filter preference persistence.

use crate::error::ProviderError;
use crate::providers::PreferenceStore;
use rollcall::FilterSpec;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;

/// Returns the storage key of a view's filter preference.
#[must_use]
pub fn filter_key(actor_id: i64, view: &str) -> String {
    format!("filter:{actor_id}:{view}")
}

pub(crate) fn load_filter<S>(store: &S, actor_id: i64, view: &str) -> Option<FilterSpec>
where
    S: PreferenceStore + ?Sized,
{
    let key: String = filter_key(actor_id, view);
    let raw: String = match store.load(&key) {
        Ok(value) => value?,
        Err(err) => {
            warn!(key = %key, error = %err, "Could not load filter preference");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(filter) => Some(filter),
        Err(err) => {
            warn!(key = %key, error = %err, "Ignoring corrupt filter preference");
            None
        }
    }
}

pub(crate) fn save_filter<S>(
    store: &S,
    actor_id: i64,
    view: &str,
    filter: &FilterSpec,
) -> Result<(), ProviderError>
where
    S: PreferenceStore + ?Sized,
{
    let encoded: String = serde_json::to_string(filter)
        .map_err(|err| ProviderError::InvalidDataset(err.to_string()))?;
    store.store(&filter_key(actor_id, view), encoded)
}

/// A process-local [`PreferenceStore`].
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferences {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<String>, ProviderError> {
        let entries = self.entries.read().map_err(|_| ProviderError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: String) -> Result<(), ProviderError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ProviderError::Unavailable)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
