//! Controller network configuration output.
//!
//! The controller reads a JSON document of the form
//!
//! ```text
//! {
//!   "name": ..., "type": "network",
//!   "network": {
//!     "<io_group>": { "<io_channel>": { "chips": [ ... ] } },
//!     "miso_us_uart_map": [...], "miso_ds_uart_map": [...], "mosi_uart_map": [...]
//!   }
//! }
//! ```
//!
//! where each chip lists the ids of its upstream children by `miso_us` slot,
//! and the root additionally marks the external link in its `miso_ds` slots.
//! Writing into an existing document replaces only the chips of the written
//! io channel.

use std::fs;
use std::path::Path;

use hydra_net::ports::PORT_COUNT;
use hydra_net::{Topology, UartMaps};
use log::{debug, warn};
use serde_json::{json, Map, Value};

/// Reads the document at `path` if it exists.
pub fn read_previous(path: &Path) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    if !value.is_object() {
        return Err(format!("{} is not a network configuration", path.display()).into());
    }
    debug!("updating existing {}", path.display());
    Ok(Some(value))
}

/// Builds the network document for `topology`, merged into `previous`.
///
/// Uart maps already present at the network level are kept; if they differ
/// from `maps`, `maps` is written next to the chips as an override.
pub fn network_config(
    topology: &Topology,
    name: &str,
    io_group: u32,
    io_channel: u32,
    maps: &UartMaps,
    previous: Option<Value>,
) -> Value {
    let mut config = take_object(previous);
    config.insert("name".to_string(), json!(name));
    config.insert("type".to_string(), json!("network"));

    let mut network = take_object(config.remove("network"));
    let group_key = io_group.to_string();
    let channel_key = io_channel.to_string();
    let mut group = take_object(network.remove(&group_key));
    let mut channel = take_object(group.remove(&channel_key));

    channel.insert("chips".to_string(), Value::Array(chip_records(topology, maps)));

    for (key, map) in [
        ("miso_us_uart_map", maps.miso_us),
        ("miso_ds_uart_map", maps.miso_ds),
        ("mosi_uart_map", maps.mosi),
    ] {
        let value = json!(map);
        match network.get(key) {
            None => {
                network.insert(key.to_string(), value);
                channel.remove(key);
            }
            Some(existing) if *existing == value => {
                channel.remove(key);
            }
            Some(_) => {
                channel.insert(key.to_string(), value);
            }
        }
    }

    group.insert(channel_key, Value::Object(channel));
    network.insert(group_key, Value::Object(group));
    config.insert("network".to_string(), Value::Object(network));
    Value::Object(config)
}

fn take_object(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// One record per chip, breadth first from the root.
fn chip_records(topology: &Topology, maps: &UartMaps) -> Vec<Value> {
    let mut records = Vec::with_capacity(topology.chip_count());
    for index in topology.breadth_first() {
        let node = topology.node(index);
        let Some(chip_id) = node.chip_id else {
            continue;
        };

        let mut miso_us = vec![Value::Null; PORT_COUNT];
        let mut miso_ds = vec![Value::Null; PORT_COUNT];
        for child in topology.children(index) {
            let child_node = topology.node(child);
            let port = topology
                .upstream
                .find_edge(index, child)
                .and_then(|edge| topology.upstream[edge].source_port);
            let Some(port) = port else {
                warn!(
                    "{} is not adjacent to {}; link left unwired",
                    child_node.coord, node.coord
                );
                continue;
            };
            match child_node.chip_id {
                Some(child_id) => {
                    if let Some(slot) = maps.miso_us_slot(port) {
                        miso_us[slot] = json!(child_id.as_raw());
                    }
                }
                None => {
                    if let Some(slot) = maps.miso_ds_slot(port) {
                        miso_ds[slot] = json!("ext");
                    }
                }
            }
        }

        let mut record = Map::new();
        record.insert("chip_id".to_string(), json!(chip_id.as_raw()));
        if miso_us.iter().any(|v| !v.is_null()) {
            record.insert("miso_us".to_string(), Value::Array(miso_us));
        }
        if node.is_root {
            record.insert("root".to_string(), json!(true));
            record.insert("miso_ds".to_string(), Value::Array(miso_ds));
        }
        records.push(Value::Object(record));
    }
    records
}
