//! Strategy registry. `strategy-registry.cpp` populates three process-wide
//! maps from static initializers; here it's an explicit, constructible
//! builder instead of a `static`/`Lazy` -- which also sidesteps the fact
//! that `Rc` is not `Sync` and so could never legally populate a `static`
//! map in the first place.
//!
//! Factories here take no arguments: strategies hold no reference to their
//! forwarder (see `strategy` module docs), so there is nothing for a
//! constructor to close over.

use crate::strategy::best_route2::BestRoute2;
use crate::strategy::bridge_best_route::BridgeBestRoute;
use crate::strategy::pitless_best_route::PitlessBestRoute;
use crate::strategy::pitless_multicast::PitlessMulticast;
use crate::strategy::{BridgeStrategy, PitlessStrategy, Strategy};
use crate::table::strategy_choice::StrategyChoiceTable;
use ndnfw_common::ndn::Name;
use std::rc::Rc;

type Factory<S> = Rc<dyn Fn() -> Rc<S>>;

struct Registration<S: ?Sized> {
    name: Name,
    is_default: bool,
    factory: Factory<S>,
}

#[derive(Default)]
pub struct StrategyRegistry {
    classical: Vec<Registration<dyn Strategy>>,
    pitless: Vec<Registration<dyn PitlessStrategy>>,
    bridge: Vec<Registration<dyn BridgeStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four strategies this workspace ships, pre-registered: a minimal
    /// set covering all three forwarder planes.
    pub fn with_default_strategies() -> Self {
        let mut registry = Self::new();
        registry.register_strategy(BestRoute2::strategy_name(), true, || Rc::new(BestRoute2));
        registry.register_pitless_strategy(PitlessBestRoute::strategy_name(), true, || {
            Rc::new(PitlessBestRoute)
        });
        registry.register_pitless_strategy(PitlessMulticast::strategy_name(), false, || {
            Rc::new(PitlessMulticast)
        });
        registry.register_bridge_strategy(BridgeBestRoute::strategy_name(), true, || {
            Rc::new(BridgeBestRoute)
        });
        registry
    }

    /// Idempotent by name: a second registration under the same name is a
    /// no-op, matching `strategy-registry.cpp`'s own registration guard.
    pub fn register_strategy<F>(&mut self, name: Name, is_default: bool, factory: F)
    where
        F: Fn() -> Rc<dyn Strategy> + 'static,
    {
        if self.classical.iter().any(|r| r.name == name) {
            return;
        }
        self.classical.push(Registration {
            name,
            is_default,
            factory: Rc::new(factory),
        });
    }

    pub fn register_pitless_strategy<F>(&mut self, name: Name, is_default: bool, factory: F)
    where
        F: Fn() -> Rc<dyn PitlessStrategy> + 'static,
    {
        if self.pitless.iter().any(|r| r.name == name) {
            return;
        }
        self.pitless.push(Registration {
            name,
            is_default,
            factory: Rc::new(factory),
        });
    }

    pub fn register_bridge_strategy<F>(&mut self, name: Name, is_default: bool, factory: F)
    where
        F: Fn() -> Rc<dyn BridgeStrategy> + 'static,
    {
        if self.bridge.iter().any(|r| r.name == name) {
            return;
        }
        self.bridge.push(Registration {
            name,
            is_default,
            factory: Rc::new(factory),
        });
    }

    pub fn install_strategies(&self, table: &StrategyChoiceTable<dyn Strategy>) {
        for r in &self.classical {
            if !table.has_strategy(&r.name, true) {
                table.install(r.name.clone(), (r.factory)(), r.is_default);
            }
        }
    }

    pub fn install_pitless_strategies(&self, table: &StrategyChoiceTable<dyn PitlessStrategy>) {
        for r in &self.pitless {
            if !table.has_strategy(&r.name, true) {
                table.install(r.name.clone(), (r.factory)(), r.is_default);
            }
        }
    }

    pub fn install_bridge_strategies(&self, table: &StrategyChoiceTable<dyn BridgeStrategy>) {
        for r in &self.bridge {
            if !table.has_strategy(&r.name, true) {
                table.install(r.name.clone(), (r.factory)(), r.is_default);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_registering_same_name_does_not_double_install() {
        let mut registry = StrategyRegistry::new();
        registry.register_strategy(BestRoute2::strategy_name(), true, || Rc::new(BestRoute2));
        registry.register_strategy(BestRoute2::strategy_name(), true, || Rc::new(BestRoute2));
        assert_eq!(registry.classical.len(), 1);

        let table: StrategyChoiceTable<dyn Strategy> = StrategyChoiceTable::new();
        registry.install_strategies(&table);
        registry.install_strategies(&table);
        assert_eq!(table.len(), 1);
    }
}
