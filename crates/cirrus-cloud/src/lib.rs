//! Cirrus Cloud Security Groups
//!
//! This crate provides the provider-neutral security group model for Cirrus,
//! so that firewall-style resources of different clouds can be managed
//! through one interface.
//!
//! # Supported Providers
//!
//! - **Google Compute Engine**: networks and firewalls (`cirrus-cloud-gce`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 cirrus-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        Security Group Abstraction         │   │
//! │  │  trait SecurityGroupExtension { ... }     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ SecurityGroup│  │  PollConfig  │            │
//! │  │ IpPermission │  │              │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ compute-engine│
//! │   provider    │
//! └───────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod security_group;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{PollConfig, SecurityGroupExtension};
pub use security_group::{
    IpPermission, IpProtocol, Location, SecurityGroup, TenantIdGroupNamePairs,
};
