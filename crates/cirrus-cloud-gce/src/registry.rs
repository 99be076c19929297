//! Memoized network creation

use crate::api::ComputeApi;
use crate::domain::{Network, NetworkAndAddressRange};
use crate::error::{GceError, Result};
use crate::mutator::ResourceMutator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Creates networks at most once per key
///
/// Concurrent callers asking for the same key share one in-flight creation.
/// A successful result is kept until [`NetworkRegistry::forget`] is called
/// for its name; a failed creation is not cached, so the next caller retries.
pub struct NetworkRegistry {
    api: Arc<dyn ComputeApi>,
    mutator: ResourceMutator,
    networks: Mutex<HashMap<NetworkAndAddressRange, Arc<OnceCell<Network>>>>,
}

impl NetworkRegistry {
    pub fn new(api: Arc<dyn ComputeApi>, mutator: ResourceMutator) -> Self {
        Self {
            api,
            mutator,
            networks: Mutex::new(HashMap::new()),
        }
    }

    /// Return the network for `key`, creating it if the provider has none
    pub async fn get_or_create(&self, key: &NetworkAndAddressRange) -> Result<Network> {
        let cell = {
            let mut networks = self.networks.lock().unwrap_or_else(|e| e.into_inner());
            networks.entry(key.clone()).or_default().clone()
        };

        cell.get_or_try_init(|| self.create_if_needed(key))
            .await
            .cloned()
    }

    /// Drop every cached entry for a network name
    pub fn forget(&self, name: &str) {
        let mut networks = self.networks.lock().unwrap_or_else(|e| e.into_inner());
        networks.retain(|key, _| key.name != name);
    }

    async fn create_if_needed(&self, key: &NetworkAndAddressRange) -> Result<Network> {
        if let Some(network) = self.api.get_network(&key.name).await? {
            tracing::debug!("Network {} already exists", key.name);
            return Ok(network);
        }

        self.mutator.create_network(key).await?;

        self.api
            .get_network(&key.name)
            .await?
            .ok_or_else(|| GceError::NotFound(format!("network {}", key.name)))
    }
}
