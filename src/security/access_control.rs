//! Blacklist admission check.
//!
//! Matching is exact string equality against the caller-supplied remote
//! address. CIDR ranges and prefixes are not interpreted.

use std::collections::HashSet;

/// Outcome of the admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Forbidden,
}

/// Set of literal remote addresses that are refused.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admit(&self, remote_addr: &str) -> Admission {
        if self.entries.contains(remote_addr) {
            Admission::Forbidden
        } else {
            Admission::Allowed
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
