//! Testbed inventory and host records.
//!
//! The testbed descriptor is an external YAML file naming each managed
//! device and how to reach it. The inventory is built once per run and
//! handed to every phase; hosts carry a mutable attribute bag that is
//! private to the host for the duration of the run.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{InventoryError, Result};

/// A managed device.
#[derive(Debug, Clone)]
pub struct Host {
    /// Device name, also the key for its declaration file.
    pub name: String,

    /// Address the executor tool connects to.
    pub address: String,

    /// Optional port override.
    pub port: Option<u16>,

    /// Optional platform hint, passed through for the executor's benefit.
    pub platform: Option<String>,

    /// Per-run attribute bag. Holds the loaded declaration and the
    /// rendered configuration text; discarded at process exit.
    pub data: IndexMap<String, Value>,
}

impl Host {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port: None,
            platform: None,
            data: IndexMap::new(),
        }
    }

    /// Connection target handed to the executor tool, `address[:port]`.
    pub fn target(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.address, port),
            None => self.address.clone(),
        }
    }

    /// Store a per-run attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Look up a per-run attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

#[derive(Debug, Deserialize)]
struct TestbedFile {
    #[serde(default)]
    devices: IndexMap<String, DeviceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceEntry {
    address: Option<String>,
    port: Option<u16>,
    platform: Option<String>,
}

/// The set of managed hosts, in testbed order.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub hosts: Vec<Host>,
}

impl Inventory {
    /// Load the inventory from a testbed descriptor.
    ///
    /// A device without an explicit `address` is reached by its name.
    /// An empty testbed is an error; reconciling nothing is always a
    /// misconfiguration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let testbed: TestbedFile =
            serde_yaml::from_str(&content).map_err(|source| InventoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if testbed.devices.is_empty() {
            return Err(InventoryError::Empty {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(Self::from_testbed(testbed))
    }

    fn from_testbed(testbed: TestbedFile) -> Self {
        let hosts = testbed
            .devices
            .into_iter()
            .map(|(name, entry)| {
                let address = entry.address.unwrap_or_else(|| name.clone());
                let mut host = Host::new(name, address);
                host.port = entry.port;
                host.platform = entry.platform;
                host
            })
            .collect();
        Self { hosts }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
