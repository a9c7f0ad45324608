//! FIB administration against a throwaway in-process forwarder.
//!
//! There's no FIB population protocol in this workspace (see spec
//! Non-goals) -- each invocation builds its own forwarder, so `add`/`remove`
//! only demonstrate the table's behavior; `show --seed` takes a batch of
//! routes on the command line so there's something to list.

use anyhow::{Context, Result};
use log::info;
use ndnfw_common::metrics::UdcnMetrics;
use ndnfw_common::ndn::{FaceId, Name};
use ndnfw_forwarder::config::ForwarderConfig;
use ndnfw_forwarder::forwarder::Forwarder;
use ndnfw_forwarder::registry::StrategyRegistry;
use ndnfw_forwarder::table::fib::NextHop;
use std::rc::Rc;

use crate::FibCommands;

pub async fn handle_command(cmd: FibCommands) -> Result<()> {
    match cmd {
        FibCommands::Add { prefix, face, cost } => add_route(prefix, face, cost),
        FibCommands::Remove { prefix } => remove_route(prefix),
        FibCommands::Show { seed } => show_routes(seed),
    }
}

fn new_forwarder() -> Rc<Forwarder> {
    let registry = StrategyRegistry::with_default_strategies();
    Forwarder::new(
        ForwarderConfig::default(),
        Rc::new(UdcnMetrics::new()),
        &registry,
    )
}

fn add_route(prefix_str: String, face: u64, cost: u32) -> Result<()> {
    info!("adding route: prefix={}, face={}, cost={}", prefix_str, face, cost);
    let prefix = Name::from_string(&prefix_str);
    let forwarder = new_forwarder();
    forwarder
        .fib()
        .borrow_mut()
        .insert(prefix.clone(), vec![NextHop { face: FaceId(face), cost }]);

    let matched = forwarder.fib().borrow().longest_prefix_match(&prefix);
    println!("Added route: {} -> face {} (cost {})", prefix_str, face, cost);
    println!("Longest-prefix match for {}: {:?}", prefix_str, matched.next_hops);
    Ok(())
}

fn remove_route(prefix_str: String) -> Result<()> {
    info!("removing route: prefix={}", prefix_str);
    let prefix = Name::from_string(&prefix_str);
    let forwarder = new_forwarder();
    forwarder
        .fib()
        .borrow_mut()
        .insert(prefix.clone(), vec![NextHop { face: FaceId(1), cost: 1 }]);

    match forwarder.fib().borrow_mut().remove(&prefix) {
        Some(entry) => println!(
            "Removed route: {} ({} next-hop(s))",
            prefix_str,
            entry.next_hops.len()
        ),
        None => println!("No route for {}", prefix_str),
    }
    Ok(())
}

/// `--seed /a:2:10,/b:3:5` inserts those routes before printing the table.
fn show_routes(seed: Vec<String>) -> Result<()> {
    let forwarder = new_forwarder();

    for entry in &seed {
        let mut parts = entry.splitn(3, ':');
        let (prefix, face, cost) = (
            parts.next().context("empty --seed entry")?,
            parts.next().context("--seed entry missing face id")?,
            parts.next().context("--seed entry missing cost")?,
        );
        let face: u64 = face
            .parse()
            .with_context(|| format!("invalid face id in --seed entry {}", entry))?;
        let cost: u32 = cost
            .parse()
            .with_context(|| format!("invalid cost in --seed entry {}", entry))?;
        forwarder
            .fib()
            .borrow_mut()
            .insert(Name::from_string(prefix), vec![NextHop { face: FaceId(face), cost }]);
    }

    let fib = forwarder.fib().borrow();
    if fib.is_empty() {
        println!("FIB is empty. Pass --seed /a:2:10,/b:3:5 to populate it before listing.");
    } else {
        println!("FIB ({} entries):", fib.len());
        for entry in fib.iter() {
            println!("  {} -> {:?}", entry.prefix, entry.next_hops);
        }
    }
    Ok(())
}
