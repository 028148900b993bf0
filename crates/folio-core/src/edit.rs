//! Working copy of an entity under edit, tracked against its last-synced snapshot

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Snapshot plus working copy of one entity.
///
/// `is_dirty` is true iff the working copy differs structurally from the
/// snapshot. Both are frozen for the lifetime of the buffer: only `update`,
/// `set_path` and a successful `commit` change them.
#[derive(Debug, Clone)]
pub struct EditBuffer<T> {
    snapshot: T,
    working: T,
    dirty: bool,
}

impl<T: Clone + PartialEq> EditBuffer<T> {
    /// Start editing: the working copy is a clone of `snapshot`.
    #[must_use]
    pub fn begin(snapshot: T) -> Self {
        Self {
            working: snapshot.clone(),
            snapshot,
            dirty: false,
        }
    }

    pub const fn snapshot(&self) -> &T {
        &self.snapshot
    }

    pub const fn working(&self) -> &T {
        &self.working
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply a typed mutation to the working copy.
    pub fn update(&mut self, change: impl FnOnce(&mut T)) {
        change(&mut self.working);
        self.refresh();
    }

    /// Apply a fallible mutation; on error the working copy is left unchanged.
    pub fn try_update(&mut self, change: impl FnOnce(&mut T) -> Result<()>) -> Result<()> {
        let mut draft = self.working.clone();
        change(&mut draft)?;
        self.working = draft;
        self.refresh();
        Ok(())
    }

    /// Replace the working copy wholesale.
    pub fn replace(&mut self, working: T) {
        self.working = working;
        self.refresh();
    }

    /// Persist the working copy.
    ///
    /// On success the persisted value becomes both snapshot and working copy.
    /// On failure nothing changes and the error is returned.
    pub async fn commit<F, Fut>(&mut self, persist: F) -> Result<()>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let saved = persist(self.working.clone()).await?;
        self.snapshot = saved.clone();
        self.working = saved;
        self.dirty = false;
        Ok(())
    }

    /// Throw away the working copy, returning the last-synced snapshot.
    pub fn discard(self) -> T {
        self.snapshot
    }

    fn refresh(&mut self) {
        self.dirty = self.working != self.snapshot;
    }
}

impl<T: Clone + PartialEq + Serialize + DeserializeOwned> EditBuffer<T> {
    /// Set one field addressed by a dotted path such as `narrative.challenge`
    /// or `specs.colors.0`.
    ///
    /// Unknown paths and values of the wrong type are rejected without
    /// touching the working copy.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        let segments = path
            .split('.')
            .map(str::trim)
            .collect::<Vec<_>>();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::InvalidInput(format!("invalid field path '{path}'")));
        }

        let mut document = serde_json::to_value(&self.working)?;
        let slot = locate(&mut document, &segments)
            .ok_or_else(|| Error::InvalidInput(format!("unknown field '{path}'")))?;
        *slot = value.clone();

        let draft: T = serde_json::from_value(document).map_err(|e| {
            Error::InvalidInput(format!("invalid value for '{path}': {e}"))
        })?;

        // Fields the type does not know are dropped by the round trip.
        let echoed = serde_json::to_value(&draft)?;
        let stored = lookup(&echoed, &segments).unwrap_or(&Value::Null);
        if *stored != value {
            return Err(Error::InvalidInput(format!("unknown field '{path}'")));
        }

        self.working = draft;
        self.refresh();
        Ok(())
    }
}

/// Mutable slot for `segments`; the last object key may be new.
fn locate<'a>(root: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let (last, parents) = segments.split_last()?;
    let mut current = root;
    for segment in parents {
        current = match current {
            Value::Object(map) => map.get_mut(*segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Value::Object(map) => Some(map.entry((*last).to_string()).or_insert(Value::Null)),
        Value::Array(items) => items.get_mut(last.parse::<usize>().ok()?),
        _ => None,
    }
}

fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    })
}
