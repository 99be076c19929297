//! Security group extension trait definition

use crate::error::Result;
use crate::security_group::{
    IpPermission, IpProtocol, Location, SecurityGroup, TenantIdGroupNamePairs,
};
use async_trait::async_trait;
use std::time::Duration;

/// Security group management abstraction
///
/// Each cloud provider maps its own firewall model onto [`SecurityGroup`]
/// and [`IpPermission`] by implementing this trait.
#[async_trait]
pub trait SecurityGroupExtension: Send + Sync {
    /// List every security group visible to the account
    async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>>;

    /// List security groups in a location
    async fn list_security_groups_in_location(
        &self,
        location: &Location,
    ) -> Result<Vec<SecurityGroup>>;

    /// List the security groups that apply to a node
    ///
    /// An unknown node yields an empty list.
    async fn list_security_groups_for_node(&self, node_id: &str) -> Result<Vec<SecurityGroup>>;

    /// Look up a group, `None` if it does not exist
    async fn get_security_group_by_id(&self, id: &str) -> Result<Option<SecurityGroup>>;

    /// Create a group, or return the existing one with this name
    async fn create_security_group(&self, name: &str) -> Result<SecurityGroup>;

    async fn create_security_group_in_location(
        &self,
        name: &str,
        location: &Location,
    ) -> Result<SecurityGroup>;

    /// Remove a group and everything referencing it
    ///
    /// Returns `false` when the group did not exist.
    async fn remove_security_group(&self, id: &str) -> Result<bool>;

    /// Grant a permission and return the updated group
    async fn add_ip_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> Result<SecurityGroup>;

    #[allow(clippy::too_many_arguments)]
    async fn add_ip_permission_from_parts(
        &self,
        protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        tenant_id_group_name_pairs: &TenantIdGroupNamePairs,
        cidr_blocks: &[String],
        group_ids: &[String],
        group: &SecurityGroup,
    ) -> Result<SecurityGroup>;

    /// Revoke a permission and return the updated group
    async fn remove_ip_permission(
        &self,
        permission: &IpPermission,
        group: &SecurityGroup,
    ) -> Result<SecurityGroup>;

    #[allow(clippy::too_many_arguments)]
    async fn remove_ip_permission_from_parts(
        &self,
        protocol: IpProtocol,
        from_port: i32,
        to_port: i32,
        tenant_id_group_name_pairs: &TenantIdGroupNamePairs,
        cidr_blocks: &[String],
        group_ids: &[String],
        group: &SecurityGroup,
    ) -> Result<SecurityGroup>;

    fn supports_tenant_id_group_name_pairs(&self) -> bool;

    fn supports_tenant_id_group_id_pairs(&self) -> bool;

    fn supports_group_ids(&self) -> bool;

    fn supports_port_ranges_for_groups(&self) -> bool;

    fn supports_exclusion_cidr_blocks(&self) -> bool;
}

/// Polling configuration for long-running provider operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two status checks
    pub interval: Duration,

    /// Give up watching after this long
    pub timeout: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
        }
    }
}
