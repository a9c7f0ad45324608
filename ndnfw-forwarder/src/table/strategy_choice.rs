//! Strategy-Choice table, mirroring NFD's `StrategyChoice`: maps a name
//! prefix to an installed strategy instance, shared by one generic
//! definition across all three strategy families. The table never needs to
//! read a strategy's own name back out of the trait object -- callers
//! always supply the prefix they're installing under -- so a single
//! `StrategyChoiceTable<S: ?Sized>` serves `dyn Strategy`,
//! `dyn PitlessStrategy` and `dyn BridgeStrategy` without a shared
//! supertrait.

use ndnfw_common::ndn::Name;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct StrategyChoiceTable<S: ?Sized> {
    entries: RefCell<HashMap<Name, Rc<S>>>,
    default: RefCell<Option<Rc<S>>>,
}

impl<S: ?Sized> Default for StrategyChoiceTable<S> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            default: RefCell::new(None),
        }
    }
}

impl<S: ?Sized> StrategyChoiceTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `strategy` under `prefix`. `is_default` marks it as the
    /// fallback returned by `find_effective_strategy` when no prefix
    /// matches (the classical default is BestRoute2).
    pub fn install(&self, prefix: Name, strategy: Rc<S>, is_default: bool) {
        if is_default {
            *self.default.borrow_mut() = Some(strategy.clone());
        }
        self.entries.borrow_mut().insert(prefix, strategy);
    }

    pub fn has_strategy(&self, prefix: &Name, exact: bool) -> bool {
        if exact {
            self.entries.borrow().contains_key(prefix)
        } else {
            self.find_effective_strategy(prefix).is_some()
        }
    }

    /// Exact lookup, used by the bridge dispatch fallback.
    pub fn get_strategy(&self, name: &Name) -> Option<Rc<S>> {
        self.entries.borrow().get(name).cloned()
    }

    /// Longest proper prefix match against the installed prefixes, falling
    /// back to the default strategy when nothing matches.
    pub fn find_effective_strategy(&self, name: &Name) -> Option<Rc<S>> {
        let entries = self.entries.borrow();
        let mut best: Option<(usize, Rc<S>)> = None;
        for (prefix, strategy) in entries.iter() {
            if prefix.is_prefix_of(name) {
                let len = prefix.len();
                let better = match &best {
                    None => true,
                    Some((best_len, _)) => len > *best_len,
                };
                if better {
                    best = Some((len, strategy.clone()));
                }
            }
        }
        best.map(|(_, s)| s)
            .or_else(|| self.default.borrow().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Dummy: std::fmt::Debug {}

    #[derive(Debug)]
    struct D(&'static str);
    impl Dummy for D {}

    #[test]
    fn longest_prefix_wins_and_default_is_fallback() {
        let table: StrategyChoiceTable<dyn Dummy> = StrategyChoiceTable::new();
        table.install(Name::new(), Rc::new(D("default")), true);
        table.install(Name::from_string("/a"), Rc::new(D("a")), false);
        table.install(Name::from_string("/a/b"), Rc::new(D("ab")), false);

        let s = table.find_effective_strategy(&Name::from_string("/a/b/c"));
        assert_eq!(format!("{:?}", s.unwrap()), "D(\"ab\")");

        let s = table.find_effective_strategy(&Name::from_string("/unrelated"));
        assert_eq!(format!("{:?}", s.unwrap()), "D(\"default\")");
    }

    #[test]
    fn has_strategy_exact_vs_prefix() {
        let table: StrategyChoiceTable<dyn Dummy> = StrategyChoiceTable::new();
        table.install(Name::from_string("/a"), Rc::new(D("a")), false);

        assert!(table.has_strategy(&Name::from_string("/a"), true));
        assert!(!table.has_strategy(&Name::from_string("/a/b"), true));
        assert!(table.has_strategy(&Name::from_string("/a/b"), false));
    }
}
