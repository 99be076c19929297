//! Compute Engine API surface consumed by this provider
//!
//! The REST transport lives outside this crate; anything implementing these
//! traits (an HTTP client, a fake in tests) can back the provider.

use crate::domain::{Firewall, FirewallOptions, Instance, ListPage, Network, Operation};
use crate::error::Result;
use async_trait::async_trait;

/// Global networks
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn list_networks_page(&self, page_token: Option<&str>) -> Result<ListPage<Network>>;

    /// `None` when the network does not exist
    async fn get_network(&self, name: &str) -> Result<Option<Network>>;

    async fn create_network_in_range(
        &self,
        name: &str,
        ipv4_range: &str,
        gateway_ipv4: Option<&str>,
    ) -> Result<Operation>;

    async fn delete_network(&self, name: &str) -> Result<Operation>;

    /// Every network, following page tokens
    async fn list_networks(&self) -> Result<Vec<Network>> {
        let mut networks = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_networks_page(token.as_deref()).await?;
            networks.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(networks)
    }
}

/// Global firewalls
#[async_trait]
pub trait FirewallApi: Send + Sync {
    /// `filter` uses the list filter syntax, e.g. `network eq .*/default`
    async fn list_firewalls_page(
        &self,
        filter: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ListPage<Firewall>>;

    async fn create_firewall_in_network(
        &self,
        name: &str,
        network_uri: &str,
        options: &FirewallOptions,
    ) -> Result<Operation>;

    async fn delete_firewall(&self, name: &str) -> Result<Operation>;

    /// Every firewall matching `filter`, following page tokens
    async fn list_firewalls(&self, filter: Option<&str>) -> Result<Vec<Firewall>> {
        let mut firewalls = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_firewalls_page(filter, token.as_deref()).await?;
            firewalls.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(firewalls)
    }
}

#[async_trait]
pub trait OperationApi: Send + Sync {
    /// Current state of an operation, `None` once it no longer exists
    async fn get_operation(&self, self_link: &str) -> Result<Option<Operation>>;
}

#[async_trait]
pub trait InstanceApi: Send + Sync {
    async fn get_instance(&self, uri: &str) -> Result<Option<Instance>>;
}

/// Everything the security group provider needs from Compute Engine
pub trait ComputeApi: NetworkApi + FirewallApi + OperationApi + InstanceApi {}

impl<T> ComputeApi for T where T: NetworkApi + FirewallApi + OperationApi + InstanceApi {}

/// List filter selecting the firewalls of one network
pub fn network_filter(network_name: &str) -> String {
    format!("network eq .*/{}", network_name)
}

/// Last path segment of a resource URI
pub fn resource_name(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}
