//! In-memory borg registry.
//!
//! Owned by the server and handed to the handlers that need it; nothing
//! here is process-global.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// A peer that announced itself via `POST /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borg {
    pub borgid: String,
    pub addr: String,
}

impl Borg {
    pub fn new(borgid: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            borgid: borgid.into(),
            addr: addr.into(),
        }
    }
}

/// Concurrent map of known borgs keyed by ID.
#[derive(Debug, Default)]
pub struct BorgRegistry {
    borgs: DashMap<String, Borg>,
}

impl BorgRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a borg. Returns the previous entry for the same ID.
    pub fn upsert(&self, ctx: &RequestContext, borg: Borg) -> Option<Borg> {
        let logger = ctx.logger();
        let previous = self.borgs.insert(borg.borgid.clone(), borg.clone());
        match &previous {
            Some(old) if old.addr != borg.addr => logger.info(format_args!(
                "Borg {} moved from {} to {}",
                borg.borgid, old.addr, borg.addr
            )),
            Some(_) => logger.debug(format_args!("Borg {} pinged again", borg.borgid)),
            None => logger.info(format_args!("Borg {} registered at {}", borg.borgid, borg.addr)),
        }
        previous
    }

    pub fn get(&self, borgid: &str) -> Option<Borg> {
        self.borgs.get(borgid).map(|entry| entry.value().clone())
    }

    /// Snapshot of all borgs, sorted by ID.
    pub fn list(&self) -> Vec<Borg> {
        let mut borgs: Vec<Borg> = self.borgs.iter().map(|entry| entry.value().clone()).collect();
        borgs.sort_by(|a, b| a.borgid.cmp(&b.borgid));
        borgs
    }

    pub fn len(&self) -> usize {
        self.borgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borgs.is_empty()
    }
}
