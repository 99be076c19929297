//! Provider-neutral security group model

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tenant id to group names, for providers that pair groups across tenants
pub type TenantIdGroupNamePairs = BTreeMap<String, BTreeSet<String>>;

/// IP protocol of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpProtocol {
    Tcp,
    Udp,
    Icmp,
    /// Every protocol (`-1` on the wire)
    All,
    Unrecognized,
}

impl IpProtocol {
    /// Canonical string value of the protocol
    pub fn value(&self) -> &'static str {
        match self {
            IpProtocol::Tcp => "tcp",
            IpProtocol::Udp => "udp",
            IpProtocol::Icmp => "icmp",
            IpProtocol::All => "-1",
            IpProtocol::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Parse a provider protocol string, case-insensitively.
    ///
    /// Unknown values map to [`IpProtocol::Unrecognized`] rather than failing,
    /// since providers accept protocols the neutral model has no name for.
    pub fn from_value(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tcp" => IpProtocol::Tcp,
            "udp" => IpProtocol::Udp,
            "icmp" => IpProtocol::Icmp,
            "-1" | "all" => IpProtocol::All,
            _ => IpProtocol::Unrecognized,
        }
    }
}

impl std::fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A unit of allowed inbound traffic
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IpPermission {
    pub protocol: IpProtocol,

    /// First port of the range, `0` when the protocol has no ports
    pub from_port: i32,

    /// Last port of the range (inclusive)
    pub to_port: i32,

    /// Source CIDR blocks
    #[serde(default)]
    pub cidr_blocks: BTreeSet<String>,

    /// Source group identifiers
    #[serde(default)]
    pub group_ids: BTreeSet<String>,
}

impl IpPermission {
    pub fn new(protocol: IpProtocol) -> Self {
        Self {
            protocol,
            from_port: 0,
            to_port: 0,
            cidr_blocks: BTreeSet::new(),
            group_ids: BTreeSet::new(),
        }
    }

    pub fn with_ports(mut self, from_port: i32, to_port: i32) -> Self {
        self.from_port = from_port;
        self.to_port = to_port;
        self
    }

    pub fn with_cidr_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cidr_blocks.extend(blocks.into_iter().map(Into::into));
        self
    }

    pub fn with_group_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Whether the permission restricts ports at all
    pub fn has_ports(&self) -> bool {
        self.from_port > 0
    }
}

/// A security group and the permissions it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    /// Identity used for lookups and deletion
    pub id: String,

    pub name: String,

    /// Identifier assigned by the provider, if different from `id`
    pub provider_id: Option<String>,

    /// Canonical resource URI
    pub uri: String,

    pub ip_permissions: BTreeSet<IpPermission>,
}

impl SecurityGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider_id: None,
            uri: uri.into(),
            ip_permissions: BTreeSet::new(),
        }
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_permissions<I>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = IpPermission>,
    {
        self.ip_permissions.extend(permissions);
        self
    }
}

/// Where a group lives. Providers with global groups ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub description: Option<String>,
}

impl Location {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
        }
    }
}
