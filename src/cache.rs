//! Caller-owned cache of normalized tables.
//!
//! A dashboard view re-renders often, but should only query upstream when
//! the user explicitly asks for it. [`QueryCache`] keeps the last table of
//! each view and only refetches on [`Refresh::Requested`], on a miss or when
//! the view's query [`Fingerprint`] changes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    table::{SchemaKind, Table},
    types::Query,
};

/// Identity of a query: schema kind plus canonical JSON payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    kind: SchemaKind,
    payload: String,
}

impl Fingerprint {
    pub fn new<P: Serialize>(kind: SchemaKind, query: &Query<P>) -> Self {
        // objects are key-sorted, so equal queries serialize equally
        Self {
            kind,
            payload: query.to_json().to_string(),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }
}

/// Whether the triggering action asked for fresh data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Refresh {
    #[default]
    IfMissing,
    Requested,
}

impl From<bool> for Refresh {
    fn from(requested: bool) -> Self {
        if requested {
            Refresh::Requested
        } else {
            Refresh::IfMissing
        }
    }
}

/// Most recent table of a view and the query it answers.
#[derive(Debug)]
struct Entry {
    fingerprint: Fingerprint,
    table: Table,
}

/// Holds one table per view, keyed by [`SchemaKind`].
///
/// A query with a new fingerprint for the same view replaces the previous
/// entry once its fetch succeeds.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<SchemaKind, Entry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table of `fingerprint`, if it is the current query of its view.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Table> {
        self.entries
            .get(&fingerprint.kind)
            .filter(|entry| entry.fingerprint == *fingerprint)
            .map(|entry| &entry.table)
    }

    /// Latest table of a view, whatever query produced it.
    pub fn latest(&self, kind: SchemaKind) -> Option<&Table> {
        self.entries.get(&kind).map(|entry| &entry.table)
    }

    /// Returns the cached table, running `fetch` first on a miss, on a
    /// changed query or when a refresh is requested.
    ///
    /// A failed fetch leaves any previous entry in place.
    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        fingerprint: Fingerprint,
        refresh: Refresh,
        fetch: F,
    ) -> Result<&Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Table, E>>,
    {
        let kind = fingerprint.kind;
        let hit = self.get(&fingerprint).is_some();
        if refresh == Refresh::Requested || !hit {
            debug!(%kind, ?refresh, hit, "fetching table");
            let table = fetch().await?;
            self.entries.insert(kind, Entry { fingerprint, table });
        }
        Ok(&self.entries[&kind].table)
    }

    /// Drops the entry of the fingerprint's view, forcing the next lookup to
    /// fetch.
    pub fn invalidate(&mut self, fingerprint: &Fingerprint) -> Option<Table> {
        self.entries.remove(&fingerprint.kind).map(|entry| entry.table)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of views with a cached table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
