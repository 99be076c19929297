//! Mutating calls driven to completion

use crate::api::ComputeApi;
use crate::domain::{FirewallOptions, NetworkAndAddressRange, Operation};
use crate::error::{GceError, Result};
use crate::poller::{PollOutcome, await_done};
use cirrus_cloud::PollConfig;
use std::sync::Arc;

/// Issues create/delete calls and waits for their operations
///
/// Every method returns only once the operation is DONE without an HTTP
/// error. It does not check that the resource exists beforehand.
#[derive(Clone)]
pub struct ResourceMutator {
    api: Arc<dyn ComputeApi>,
    poll: PollConfig,
}

impl ResourceMutator {
    pub fn new(api: Arc<dyn ComputeApi>, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    pub async fn delete_firewall(&self, name: &str) -> Result<Operation> {
        tracing::info!("Deleting firewall: {}", name);
        let operation = self.api.delete_firewall(name).await?;
        self.complete("delete firewall", operation).await
    }

    pub async fn delete_network(&self, name: &str) -> Result<Operation> {
        tracing::info!("Deleting network: {}", name);
        let operation = self.api.delete_network(name).await?;
        self.complete("delete network", operation).await
    }

    pub async fn create_firewall(&self, options: &FirewallOptions) -> Result<Operation> {
        tracing::info!(
            "Creating firewall {} in network {}",
            options.name,
            options.network
        );
        let operation = self
            .api
            .create_firewall_in_network(&options.name, &options.network, options)
            .await?;
        self.complete("insert firewall", operation).await
    }

    pub async fn create_network(&self, key: &NetworkAndAddressRange) -> Result<Operation> {
        tracing::info!("Creating network {} ({})", key.name, key.ipv4_range);
        let operation = self
            .api
            .create_network_in_range(&key.name, &key.ipv4_range, key.gateway_ipv4.as_deref())
            .await?;
        self.complete("insert network", operation).await
    }

    async fn complete(&self, action: &str, operation: Operation) -> Result<Operation> {
        match await_done(self.api.as_ref(), operation, &self.poll).await? {
            PollOutcome::Done(op) => match op.http_error_status_code {
                None => Ok(op),
                Some(status) => Err(GceError::OperationFailed {
                    action: action.to_string(),
                    operation: op.name.clone(),
                    status,
                    message: op.diagnostics(),
                }),
            },
            PollOutcome::TimedOut(op) => Err(GceError::OperationTimeout {
                action: action.to_string(),
                operation: op.name,
                timeout: self.poll.timeout,
            }),
        }
    }
}
