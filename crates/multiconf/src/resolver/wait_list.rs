//! Per-name pending dependencies.
//!
//! A dependency is either [`ENV_DEPENDENCY`] (the env files) or another config
//! name. Entries exist only while a name is being resolved.

use std::collections::{BTreeSet, HashMap};

use crate::constants::ENV_DEPENDENCY;

#[derive(Debug, Default)]
pub struct WaitList {
    pending: HashMap<String, BTreeSet<String>>,
}

impl WaitList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `deps` to the pending set of `name`, then report whether `name`
    /// still has to wait (see [`WaitList::need_wait`]).
    pub fn wait_for<I, S>(
        &mut self,
        name: &str,
        deps: I,
        env_loaded: bool,
        is_loaded: impl Fn(&str) -> bool,
    ) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending
            .entry(name.to_string())
            .or_default()
            .extend(deps.into_iter().map(Into::into));
        self.need_wait(name, env_loaded, is_loaded)
    }

    /// Whether any pending dependency of `name` is unsatisfied.
    ///
    /// Clears the entry for `name` when everything is satisfied, so a second
    /// call after a `false` answer sees no entry at all.
    pub fn need_wait(
        &mut self,
        name: &str,
        env_loaded: bool,
        is_loaded: impl Fn(&str) -> bool,
    ) -> bool {
        let Some(deps) = self.pending.get(name) else {
            return false;
        };
        let waiting = deps.iter().any(|dep| {
            if dep == ENV_DEPENDENCY {
                !env_loaded
            } else {
                !is_loaded(dep)
            }
        });
        if !waiting {
            self.pending.remove(name);
        }
        waiting
    }

    /// Remove and return the pending dependencies of `name`, in sorted order.
    pub fn take(&mut self, name: &str) -> Vec<String> {
        self.pending
            .remove(name)
            .map(|deps| deps.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.pending.get(name)
    }

    pub fn clear(&mut self, name: &str) {
        self.pending.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
