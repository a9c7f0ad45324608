//! Interest injection against an in-process forwarder.
//!
//! There's no transport in this workspace, so `interest` plays both ends:
//! it injects the Interest on a consumer face, and a task on the producer
//! face synthesizes a Data response for whatever arrives there.

use anyhow::Result;
use log::info;
use ndnfw_common::ndn::{Data, Interest, Name};
use ndnfw_face::FaceEvent;
use std::time::Duration;
use tokio::time::timeout;

use super::topology::{self, CONSUMER_FACE, PRODUCER_FACE};
use crate::utils::Timer;

pub async fn send_interest(name_str: String, timeout_ms: u64) -> Result<()> {
    let name = Name::from_string(&name_str);
    info!("injecting Interest: name={}, timeout={}ms", name_str, timeout_ms);
    println!("Sending Interest: {}", name_str);
    let _timer = Timer::new("interest round-trip");

    let topo = topology::build(name.clone());
    let forwarder = topo.forwarder.clone();
    let mut producer_events = topo.producer_events;
    let mut consumer_events = topo.consumer_events;

    tokio::task::spawn_local(async move {
        while let Some(event) = producer_events.recv().await {
            if let FaceEvent::InterestReceived(interest) = event {
                info!("synthetic producer: answering Interest for {}", interest.name);
                let data = Data::new(
                    interest.name.clone(),
                    format!("synthetic response for {}", interest.name).into_bytes(),
                );
                forwarder.on_incoming_data(PRODUCER_FACE, data);
            }
        }
    });

    topo.forwarder
        .on_incoming_interest(CONSUMER_FACE, Interest::new(name).with_must_be_fresh(true));

    match timeout(Duration::from_millis(timeout_ms), consumer_events.recv()).await {
        Ok(Some(FaceEvent::DataReceived(data))) => {
            println!("\nReceived Data:");
            println!("  Name: {}", data.name);
            println!("  Freshness: {:?}", data.freshness_period);
            match std::str::from_utf8(&data.content) {
                Ok(text) => println!("  Content: {}", text),
                Err(_) => println!("  Content: {} bytes (binary)", data.content.len()),
            }
        }
        Ok(Some(FaceEvent::InterestReceived(_))) => {
            println!("unexpected: consumer face received an Interest, not Data");
        }
        Ok(None) => println!("consumer face closed without a response"),
        Err(_) => println!("Timeout after {}ms", timeout_ms),
    }

    Ok(())
}
