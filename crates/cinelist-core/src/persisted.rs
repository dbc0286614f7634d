//! A value mirrored into a [`KeyValueStore`] on every change.
//!
//! Values are stored as a versioned JSON envelope:
//!
//! ```json
//! {"version": 1, "data": ...}
//! ```
//!
//! Hydration trusts a current envelope, accepts a bare (unversioned) value
//! written by older builds, and fails closed on anything else: the caller's
//! initial value is used and the unreadable raw value is copied to
//! `<key>.corrupt` (timestamped if that key is taken) so the next save does
//! not destroy it.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::KeyValueStore;

/// Envelope version written by this build.
pub const STATE_VERSION: u32 = 1;

/// Suffix of the key holding a value that could not be hydrated.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    data: serde_json::Value,
}

enum Hydrated<T> {
    Current(T),
    Legacy(T),
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<Hydrated<T>, String> {
    let json: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    match serde_json::from_value::<Envelope>(json.clone()) {
        Ok(env) if env.version == STATE_VERSION => serde_json::from_value(env.data)
            .map(Hydrated::Current)
            .map_err(|e| e.to_string()),
        Ok(env) => Err(format!("unsupported version {}", env.version)),
        Err(_) => serde_json::from_value(json)
            .map(Hydrated::Legacy)
            .map_err(|e| format!("unrecognized shape: {e}")),
    }
}

/// Persisted state container.
pub struct PersistedState<T, S> {
    store: S,
    key: String,
    value: T,
}

impl<T, S> PersistedState<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Hydrate from `store` under `key`, or start from `initial`.
    pub fn load(store: S, key: impl Into<String>, initial: T) -> Result<Self, CoreError> {
        let key = key.into();
        let value = match store.get(&key)? {
            None => initial,
            Some(raw) => match decode::<T>(&raw) {
                Ok(Hydrated::Current(value)) => value,
                Ok(Hydrated::Legacy(value)) => {
                    tracing::info!(key = %key, "upgrading unversioned persisted state");
                    value
                }
                Err(reason) => {
                    let backup = backup_key(&store, &key)?;
                    tracing::warn!(key = %key, %backup, %reason, "discarding unreadable persisted state");
                    store.set(&backup, &raw)?;
                    initial
                }
            },
        };

        Ok(Self { store, key, value })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `value`, then make it current. On a failed write the
    /// previous value stays.
    pub fn set(&mut self, value: T) -> Result<(), CoreError> {
        self.write(&value)?;
        self.value = value;
        Ok(())
    }

    /// Apply `f` to a copy of the value, persist the copy, then make it
    /// current. On a failed write nothing changes.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, CoreError>
    where
        T: Clone,
    {
        let mut next = self.value.clone();
        let out = f(&mut next);
        self.write(&next)?;
        self.value = next;
        Ok(out)
    }

    /// Write the current value to the store.
    pub fn save(&self) -> Result<(), CoreError> {
        self.write(&self.value)
    }

    fn write(&self, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(&EnvelopeRef {
            version: STATE_VERSION,
            data: value,
        })?;
        self.store.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, bytes = json.len(), "persisted state saved");
        Ok(())
    }
}

/// `<key>.corrupt`, or `<key>.corrupt.<unix millis>` when an earlier backup
/// already occupies it.
fn backup_key<S: KeyValueStore>(store: &S, key: &str) -> Result<String, CoreError> {
    let first = format!("{key}{CORRUPT_SUFFIX}");
    if store.get(&first)?.is_none() {
        return Ok(first);
    }
    Ok(format!("{first}.{}", Utc::now().timestamp_millis()))
}
