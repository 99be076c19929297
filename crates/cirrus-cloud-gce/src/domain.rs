//! Compute Engine resource types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A global VPC network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,

    #[serde(default)]
    pub creation_timestamp: Option<DateTime<Utc>>,

    pub self_link: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Address range of a legacy network
    #[serde(default, rename = "IPv4Range")]
    pub range_ipv4: Option<String>,

    #[serde(default, rename = "gatewayIPv4")]
    pub gateway_ipv4: Option<String>,
}

/// Firewall attached to exactly one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firewall {
    pub id: String,

    pub self_link: String,

    pub name: String,

    /// URI of the network this firewall belongs to
    pub network: String,

    #[serde(default)]
    pub source_ranges: Vec<String>,

    #[serde(default)]
    pub source_tags: Vec<String>,

    /// Instances the firewall applies to; empty means every instance
    #[serde(default)]
    pub target_tags: Vec<String>,

    #[serde(default)]
    pub allowed: Vec<FirewallRule>,
}

/// One allow-rule of a firewall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,

    /// Single ports (`"22"`) or inclusive ranges (`"1000-2000"`)
    #[serde(default)]
    pub ports: Vec<String>,
}

impl FirewallRule {
    pub fn new(ip_protocol: impl Into<String>, ports: Vec<String>) -> Self {
        Self {
            ip_protocol: ip_protocol.into(),
            ports,
        }
    }
}

/// Parameters for inserting a firewall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallOptions {
    pub name: String,

    /// Network URI
    pub network: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub allowed: Vec<FirewallRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ranges: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_tags: Vec<String>,
}

impl FirewallOptions {
    pub fn new(name: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            network: network.into(),
            ..Default::default()
        }
    }

    pub fn with_allowed_rule(mut self, rule: FirewallRule) -> Self {
        self.allowed.push(rule);
        self
    }

    pub fn with_source_ranges(mut self, ranges: Vec<String>) -> Self {
        self.source_ranges = ranges;
        self
    }

    pub fn with_source_tags(mut self, tags: Vec<String>) -> Self {
        self.source_tags = tags;
        self
    }

    pub fn with_target_tags(mut self, tags: Vec<String>) -> Self {
        self.target_tags = tags;
        self
    }
}

/// Status of a long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Pending => write!(f, "PENDING"),
            OperationStatus::Running => write!(f, "RUNNING"),
            OperationStatus::Done => write!(f, "DONE"),
        }
    }
}

/// Error detail attached to a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationErrorDetail {
    pub code: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Handle of an asynchronous mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,

    pub name: String,

    pub self_link: String,

    /// URI of the resource being mutated
    #[serde(default)]
    pub target_link: Option<String>,

    /// e.g. "insert", "delete"
    #[serde(default)]
    pub operation_type: String,

    pub status: OperationStatus,

    /// Set once a DONE operation has failed
    #[serde(default)]
    pub http_error_status_code: Option<u16>,

    #[serde(default)]
    pub http_error_message: Option<String>,

    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    /// Human-readable failure payload of the operation
    pub fn diagnostics(&self) -> String {
        let message = self
            .http_error_message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        if self.errors.is_empty() {
            return message;
        }
        match serde_json::to_string(&self.errors) {
            Ok(details) => format!("{message} {details}"),
            Err(_) => message,
        }
    }
}

/// Compute instance, reduced to what group lookup needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,

    pub name: String,

    pub self_link: String,

    #[serde(default)]
    pub tags: Tags,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub items: Vec<String>,

    #[serde(default)]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub name: Option<String>,

    /// URI of the attached network
    pub network: String,

    #[serde(default, rename = "networkIP")]
    pub network_ip: Option<String>,
}

/// One page of a list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Key of a network created on behalf of a security group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkAndAddressRange {
    pub name: String,

    pub ipv4_range: String,

    #[serde(default)]
    pub gateway_ipv4: Option<String>,
}

impl NetworkAndAddressRange {
    pub fn new(name: impl Into<String>, ipv4_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ipv4_range: ipv4_range.into(),
            gateway_ipv4: None,
        }
    }

    pub fn with_gateway(mut self, gateway_ipv4: impl Into<String>) -> Self {
        self.gateway_ipv4 = Some(gateway_ipv4.into());
        self
    }
}
