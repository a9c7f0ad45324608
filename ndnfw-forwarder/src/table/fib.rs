//! Forwarding Information Base: prefix -> ordered next-hop list.
//!
//! Mutated only by a control-plane collaborator (`rib/main.cpp` in the
//! original source); the core only reads it via `longest_prefix_match`.

use ndnfw_common::ndn::{FaceId, Name};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHop {
    pub face: FaceId,
    pub cost: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FibEntry {
    pub prefix: Name,
    pub next_hops: Vec<NextHop>,
}

impl FibEntry {
    fn empty() -> Self {
        Self {
            prefix: Name::new(),
            next_hops: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct Fib {
    entries: HashMap<Name, FibEntry>,
}

impl Fib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the next-hop list for `prefix`.
    pub fn insert(&mut self, prefix: Name, next_hops: Vec<NextHop>) {
        self.entries.insert(
            prefix.clone(),
            FibEntry {
                prefix,
                next_hops,
            },
        );
    }

    pub fn remove(&mut self, prefix: &Name) -> Option<FibEntry> {
        self.entries.remove(prefix)
    }

    /// Longest-prefix match against the registered entries. Returns a
    /// default (empty next-hop list) entry when nothing matches -- callers
    /// never need an `Option`.
    pub fn longest_prefix_match(&self, name: &Name) -> FibEntry {
        let mut best: Option<&FibEntry> = None;
        for entry in self.entries.values() {
            if entry.prefix.is_prefix_of(name) {
                let better = match best {
                    None => true,
                    Some(b) => entry.prefix.len() > b.prefix.len(),
                };
                if better {
                    best = Some(entry);
                }
            }
        }
        best.cloned().unwrap_or_else(FibEntry::empty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FibEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins_over_shorter_match() {
        let mut fib = Fib::new();
        fib.insert(
            Name::from_string("/a"),
            vec![NextHop {
                face: FaceId(1),
                cost: 10,
            }],
        );
        fib.insert(
            Name::from_string("/a/b"),
            vec![NextHop {
                face: FaceId(2),
                cost: 5,
            }],
        );

        let m = fib.longest_prefix_match(&Name::from_string("/a/b/c"));
        assert_eq!(m.prefix, Name::from_string("/a/b"));
        assert_eq!(m.next_hops[0].face, FaceId(2));
    }

    #[test]
    fn no_match_returns_empty_entry() {
        let fib = Fib::new();
        let m = fib.longest_prefix_match(&Name::from_string("/nowhere"));
        assert!(m.next_hops.is_empty());
    }
}
