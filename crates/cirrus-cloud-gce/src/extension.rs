//! Compute Engine security group extension
//!
//! A security group is a network: its id and name are the network name, and
//! its permissions are the allow-rules of the firewalls on that network.
//! Creating a group creates a network, adding a permission creates one
//! firewall, and removing the group removes every firewall and then the
//! network.

use crate::api::{ComputeApi, network_filter, resource_name};
use crate::domain::{Firewall, Network, NetworkAndAddressRange};
use crate::error::{GceError, Result};
use crate::mapper::{to_firewall_options, to_security_group, unique_name_for_group};
use crate::mutator::ResourceMutator;
use crate::registry::NetworkRegistry;
use crate::rules::{applies_to_tags, equals_ip_permission, provides_ip_permission};
use async_trait::async_trait;
use cirrus_cloud::{
    IpPermission, IpProtocol, Location, PollConfig, SecurityGroup, SecurityGroupExtension,
    TenantIdGroupNamePairs,
};
use cirrus_config::GceSettings;
use std::sync::Arc;

/// Security groups backed by Compute Engine networks and firewalls
pub struct GceSecurityGroupExtension {
    api: Arc<dyn ComputeApi>,
    mutator: ResourceMutator,
    networks: NetworkRegistry,
    default_network_range: String,
}

impl GceSecurityGroupExtension {
    pub fn new(api: Arc<dyn ComputeApi>, settings: &GceSettings) -> Self {
        let poll = PollConfig::from_millis(
            settings.operation_complete_interval_ms,
            settings.operation_complete_timeout_ms,
        );
        Self::with_poll_config(api, poll, settings.default_network_range.clone())
    }

    pub fn with_poll_config(
        api: Arc<dyn ComputeApi>,
        poll: PollConfig,
        default_network_range: impl Into<String>,
    ) -> Self {
        let mutator = ResourceMutator::new(api.clone(), poll);
        let networks = NetworkRegistry::new(api.clone(), mutator.clone());
        Self {
            api,
            mutator,
            networks,
            default_network_range: default_network_range.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_groups(&self) -> Result<Vec<SecurityGroup>> {
        let mut groups = Vec::new();
        for network in self.api.list_networks().await? {
            groups.push(self.group_for_network(&network).await?);
        }
        Ok(groups)
    }

    /// Groups applying to the instance at `instance_uri`
    #[tracing::instrument(skip(self))]
    pub async fn groups_for_node(&self, instance_uri: &str) -> Result<Vec<SecurityGroup>> {
        require_non_empty(instance_uri, "id")?;

        let Some(instance) = self.api.get_instance(instance_uri).await? else {
            tracing::debug!("Instance {} not found", instance_uri);
            return Ok(Vec::new());
        };

        let mut groups: Vec<SecurityGroup> = Vec::new();
        for interface in &instance.network_interfaces {
            let network_name = resource_name(&interface.network);
            let Some(network) = self.api.get_network(network_name).await? else {
                tracing::warn!(
                    "Network {} of instance {} not found",
                    network_name,
                    instance.name
                );
                continue;
            };

            if let Some(group) = self
                .group_for_tags_in_network(&network, &instance.tags.items)
                .await?
            {
                if !groups.iter().any(|g| g.id == group.id) {
                    groups.push(group);
                }
            }
        }
        Ok(groups)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_group(&self, id: &str) -> Result<Option<SecurityGroup>> {
        require_non_empty(id, "id")?;

        match self.api.get_network(id).await? {
            Some(network) => Ok(Some(self.group_for_network(&network).await?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_group(&self, name: &str) -> Result<SecurityGroup> {
        require_non_empty(name, "name")?;

        let key = NetworkAndAddressRange::new(name, &self.default_network_range);
        let network = self.networks.get_or_create(&key).await?;
        self.group_for_network(&network).await
    }

    /// Delete every firewall of the network, then the network itself
    #[tracing::instrument(skip(self))]
    pub async fn remove_group(&self, id: &str) -> Result<bool> {
        require_non_empty(id, "id")?;

        if self.api.get_network(id).await?.is_none() {
            tracing::debug!("Network {} not found, nothing to delete", id);
            return Ok(false);
        }

        for firewall in self.firewalls_of(id).await? {
            self.mutator.delete_firewall(&firewall.name).await?;
        }
        self.mutator.delete_network(id).await?;
        self.networks.forget(id);

        Ok(true)
    }

    #[tracing::instrument(skip(self, group), fields(group = %group.id))]
    pub async fn add_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> Result<SecurityGroup> {
        validate_permission(permission)?;
        let network = self.require_network(group).await?;

        let firewalls = self.firewalls_of(&network.name).await?;
        if let Some(existing) = firewalls
            .iter()
            .find(|fw| provides_ip_permission(fw, permission))
        {
            tracing::debug!("Permission already granted by firewall {}", existing.name);
            return Ok(group.clone());
        }

        let name = unique_name_for_group(&network.name);
        let options = to_firewall_options(permission, &name, &network.self_link);
        self.mutator.create_firewall(&options).await?;

        self.refreshed(group).await
    }

    #[tracing::instrument(skip(self, group), fields(group = %group.id))]
    pub async fn remove_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> Result<SecurityGroup> {
        validate_permission(permission)?;
        let network = self.require_network(group).await?;

        for firewall in self.firewalls_of(&network.name).await? {
            if equals_ip_permission(&firewall, permission) {
                self.mutator.delete_firewall(&firewall.name).await?;
            }
        }

        self.refreshed(group).await
    }

    async fn firewalls_of(&self, network_name: &str) -> Result<Vec<Firewall>> {
        let filter = network_filter(network_name);
        self.api.list_firewalls(Some(&filter)).await
    }

    async fn group_for_network(&self, network: &Network) -> Result<SecurityGroup> {
        let firewalls = self.firewalls_of(&network.name).await?;
        Ok(to_security_group(network, &firewalls))
    }

    /// The group of `network` if any of its firewalls applies to `tags`
    async fn group_for_tags_in_network(
        &self,
        network: &Network,
        tags: &[String],
    ) -> Result<Option<SecurityGroup>> {
        let firewalls = self.firewalls_of(&network.name).await?;
        if !firewalls.iter().any(|fw| applies_to_tags(fw, tags)) {
            return Ok(None);
        }
        Ok(Some(to_security_group(network, &firewalls)))
    }

    async fn require_network(&self, group: &SecurityGroup) -> Result<Network> {
        require_non_empty(&group.id, "group id")?;
        self.api
            .get_network(&group.id)
            .await?
            .ok_or_else(|| GceError::NotFound(format!("network for group {}", group.id)))
    }

    async fn refreshed(&self, group: &SecurityGroup) -> Result<SecurityGroup> {
        self.get_group(&group.id)
            .await?
            .ok_or_else(|| GceError::NotFound(format!("network for group {}", group.id)))
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GceError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}

fn validate_permission(permission: &IpPermission) -> Result<()> {
    if permission.protocol == IpProtocol::Unrecognized {
        return Err(GceError::InvalidArgument(
            "protocol is not recognized by Compute Engine".to_string(),
        ));
    }
    if permission.has_ports() && permission.from_port > permission.to_port {
        return Err(GceError::InvalidArgument(format!(
            "port range {}-{} is reversed",
            permission.from_port, permission.to_port
        )));
    }
    Ok(())
}

fn permission_from_parts(
    protocol: IpProtocol,
    from_port: i32,
    to_port: i32,
    tenant_id_group_name_pairs: &TenantIdGroupNamePairs,
    cidr_blocks: &[String],
    group_ids: &[String],
) -> IpPermission {
    if !tenant_id_group_name_pairs.is_empty() {
        tracing::debug!("Ignoring tenant id/group name pairs, not supported by Compute Engine");
    }
    IpPermission::new(protocol)
        .with_ports(from_port, to_port)
        .with_cidr_blocks(cidr_blocks.iter().cloned())
        .with_group_ids(group_ids.iter().cloned())
}

#[async_trait]
impl SecurityGroupExtension for GceSecurityGroupExtension {
    async fn list_security_groups(&self) -> cirrus_cloud::Result<Vec<SecurityGroup>> {
        Ok(self.list_groups().await?)
    }

    async fn list_security_groups_in_location(
        &self,
        _location: &Location,
    ) -> cirrus_cloud::Result<Vec<SecurityGroup>> {
        // networks are global
        Ok(self.list_groups().await?)
    }

    async fn list_security_groups_for_node(
        &self,
        node_id: &str,
    ) -> cirrus_cloud::Result<Vec<SecurityGroup>> {
        Ok(self.groups_for_node(node_id).await?)
    }

    async fn get_security_group_by_id(
        &self,
        id: &str,
    ) -> cirrus_cloud::Result<Option<SecurityGroup>> {
        Ok(self.get_group(id).await?)
    }

    async fn create_security_group(&self, name: &str) -> cirrus_cloud::Result<SecurityGroup> {
        Ok(self.create_group(name).await?)
    }

    async fn create_security_group_in_location(
        &self,
        name: &str,
        _location: &Location,
    ) -> cirrus_cloud::Result<SecurityGroup> {
        Ok(self.create_group(name).await?)
    }

    async fn remove_security_group(&self, id: &str) -> cirrus_cloud::Result<bool> {
        Ok(self.remove_group(id).await?)
    }

    async fn add_ip_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> cirrus_cloud::Result<SecurityGroup> {
        Ok(self.add_permission(permission, group).await?)
    }

    async fn add_ip_permission_from_parts(
        &self,
        protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        tenant_id_group_name_pairs: &TenantIdGroupNamePairs,
        cidr_blocks: &[String],
        group_ids: &[String],
        group: &SecurityGroup,
    ) -> cirrus_cloud::Result<SecurityGroup> {
        let permission = permission_from_parts(
            protocol,
            from_port,
            to_port,
            tenant_id_group_name_pairs,
            cidr_blocks,
            group_ids,
        );
        Ok(self.add_permission(&permission, group).await?)
    }

    async fn remove_ip_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> cirrus_cloud::Result<SecurityGroup> {
        Ok(self.remove_permission(permission, group).await?)
    }

    async fn remove_ip_permission_from_parts(
        &self,
        protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        tenant_id_group_name_pairs: &TenantIdGroupNamePairs,
        cidr_blocks: &[String],
        group_ids: &[String],
        group: &SecurityGroup,
    ) -> cirrus_cloud::Result<SecurityGroup> {
        let permission = permission_from_parts(
            protocol,
            from_port,
            to_port,
            tenant_id_group_name_pairs,
            cidr_blocks,
            group_ids,
        );
        Ok(self.remove_permission(&permission, group).await?)
    }

    fn supports_tenant_id_group_name_pairs(&self) -> bool {
        false
    }

    fn supports_tenant_id_group_id_pairs(&self) -> bool {
        false
    }

    fn supports_group_ids(&self) -> bool {
        true
    }

    fn supports_port_ranges_for_groups(&self) -> bool {
        true
    }

    fn supports_exclusion_cidr_blocks(&self) -> bool {
        false
    }
}
