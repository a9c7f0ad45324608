//! Serves one piece of Data under a fixed name against an in-process
//! forwarder until Ctrl+C, answering every Interest that reaches the
//! producer face.

use anyhow::{Context, Result};
use log::info;
use ndnfw_common::ndn::{Data, Interest, Name};
use ndnfw_face::FaceEvent;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;

use super::topology::{self, CONSUMER_FACE, PRODUCER_FACE};

pub async fn publish_data(name_str: String, content: String, freshness_ms: u64) -> Result<()> {
    let name = Name::from_string(&name_str);
    info!(
        "publishing: name={}, content_len={}, freshness={}ms",
        name_str,
        content.len(),
        freshness_ms
    );

    let data = Data::new(name.clone(), content.clone().into_bytes())
        .with_freshness_period(Some(Duration::from_millis(freshness_ms)));

    println!("Publishing Data:");
    println!("  Name: {}", name_str);
    println!("  Content ({} bytes): {}", content.len(), content);
    println!("  Freshness: {}ms", freshness_ms);

    let topo = topology::build(name.clone());
    let forwarder = topo.forwarder.clone();
    let mut producer_events = topo.producer_events;
    let mut consumer_events = topo.consumer_events;

    let served = data.clone();
    tokio::task::spawn_local(async move {
        while let Some(event) = producer_events.recv().await {
            if let FaceEvent::InterestReceived(interest) = event {
                info!("serving Interest for {}", interest.name);
                forwarder.on_incoming_data(PRODUCER_FACE, served.clone());
            }
        }
    });

    // Show one round trip immediately, as if a consumer had just asked.
    topo.forwarder
        .on_incoming_interest(CONSUMER_FACE, Interest::new(name));
    if let Ok(Some(FaceEvent::DataReceived(data))) =
        timeout(Duration::from_millis(200), consumer_events.recv()).await
    {
        println!("\nServed one Interest immediately:");
        match std::str::from_utf8(&data.content) {
            Ok(text) => println!("  Content: {}", text),
            Err(_) => println!("  Content: {} bytes (binary)", data.content.len()),
        }
    }

    println!(
        "\nServing further Interests on face {} (press Ctrl+C to stop)...",
        PRODUCER_FACE
    );
    signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    println!("Shutting down.");

    Ok(())
}
