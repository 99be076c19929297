//! Google Compute Engine provider for Cirrus
//!
//! This crate implements the SecurityGroupExtension trait for Compute
//! Engine, where a security group is a network and its permissions are the
//! firewalls attached to that network.
//!
//! # Features
//!
//! - Security group lifecycle (list, get, create, delete)
//! - Permission grant/revoke through firewalls
//! - Group lookup for an instance via its network interfaces and tags
//! - Long-running operation polling for every mutation
//!
//! # Requirements
//!
//! - A [`ComputeApi`] implementation (REST client) for the target project
//! - Poll interval, timeout and default network range from `cirrus-config`
//!
//! # Example
//!
//! ```ignore
//! use cirrus_cloud::{IpPermission, IpProtocol, SecurityGroupExtension};
//! use cirrus_cloud_gce::GceSecurityGroupExtension;
//! use cirrus_config::CirrusConfig;
//!
//! let config = CirrusConfig::load()?;
//! let extension = GceSecurityGroupExtension::new(api, &config.gce);
//!
//! let group = extension.create_security_group("web").await?;
//! let ssh = IpPermission::new(IpProtocol::Tcp).with_ports(22, 22);
//! let group = extension.add_ip_permission(&ssh, &group).await?;
//! ```

pub mod api;
pub mod domain;
pub mod error;
pub mod extension;
pub mod mapper;
pub mod mutator;
pub mod poller;
pub mod registry;
pub mod rules;

pub use api::{ComputeApi, FirewallApi, InstanceApi, NetworkApi, OperationApi};
pub use domain::{
    Firewall, FirewallOptions, FirewallRule, Instance, ListPage, Network, NetworkAndAddressRange,
    NetworkInterface, Operation, OperationStatus, Tags,
};
pub use error::{GceError, Result};
pub use extension::GceSecurityGroupExtension;
pub use mutator::ResourceMutator;
pub use poller::{PollOutcome, await_done};
pub use registry::NetworkRegistry;
