//! Translation between networks/firewalls and security groups
//!
//! A security group is a network seen through its firewalls: the group id
//! and name are the network name, and every (protocol, port range) of every
//! allow-rule becomes one [`IpPermission`]. Source ranges become CIDR blocks
//! and source tags become group ids, in both directions.

use crate::api::resource_name;
use crate::domain::{Firewall, FirewallOptions, FirewallRule, Network};
use cirrus_cloud::{IpPermission, IpProtocol, SecurityGroup};
use rand::Rng;

/// Parse `"22"` or `"1000-2000"` into an inclusive port span
pub fn parse_port_range(spec: &str) -> Option<(i32, i32)> {
    match spec.split_once('-') {
        Some((from, to)) => Some((from.trim().parse().ok()?, to.trim().parse().ok()?)),
        None => {
            let port = spec.trim().parse().ok()?;
            Some((port, port))
        }
    }
}

/// Port list for a firewall rule; empty when the permission has no ports
pub fn render_ports(from_port: i32, to_port: i32) -> Vec<String> {
    if from_port <= 0 {
        Vec::new()
    } else if from_port == to_port {
        vec![from_port.to_string()]
    } else {
        vec![format!("{}-{}", from_port, to_port)]
    }
}

/// One permission per (protocol, port range) of the firewall's rules
pub fn firewall_to_ip_permissions(firewall: &Firewall) -> Vec<IpPermission> {
    let base = |protocol: &str| {
        IpPermission::new(IpProtocol::from_value(protocol))
            .with_cidr_blocks(firewall.source_ranges.iter().cloned())
            .with_group_ids(firewall.source_tags.iter().cloned())
    };

    let mut permissions = Vec::new();
    for rule in &firewall.allowed {
        if rule.ports.is_empty() {
            permissions.push(base(&rule.ip_protocol));
            continue;
        }
        for spec in &rule.ports {
            match parse_port_range(spec) {
                Some((from, to)) => permissions.push(base(&rule.ip_protocol).with_ports(from, to)),
                None => tracing::warn!(
                    "Skipping unparsable port spec '{}' on firewall {}",
                    spec,
                    firewall.name
                ),
            }
        }
    }
    permissions
}

/// Build the security group backed by `network`
///
/// Firewalls attached to other networks are ignored.
pub fn to_security_group(network: &Network, firewalls: &[Firewall]) -> SecurityGroup {
    let permissions = firewalls
        .iter()
        .filter(|fw| resource_name(&fw.network) == network.name)
        .flat_map(firewall_to_ip_permissions);

    SecurityGroup::new(&network.name, &network.name, &network.self_link)
        .with_provider_id(&network.id)
        .with_permissions(permissions)
}

/// Protocol name as Compute Engine spells it
pub fn firewall_protocol(protocol: IpProtocol) -> String {
    match protocol {
        IpProtocol::All => "all".to_string(),
        other => other.value().to_lowercase(),
    }
}

/// Options for the single firewall granting `permission`
pub fn to_firewall_options(
    permission: &IpPermission,
    unique_name: &str,
    network_uri: &str,
) -> FirewallOptions {
    let rule = FirewallRule::new(
        firewall_protocol(permission.protocol),
        render_ports(permission.from_port, permission.to_port),
    );

    let mut options = FirewallOptions::new(unique_name, network_uri).with_allowed_rule(rule);
    if !permission.group_ids.is_empty() {
        options = options.with_source_tags(permission.group_ids.iter().cloned().collect());
    }
    if !permission.cidr_blocks.is_empty() {
        options = options.with_source_ranges(permission.cidr_blocks.iter().cloned().collect());
    }
    options
}

/// `<group>-<3 hex digits>`, unique enough to add several firewalls per group
pub fn unique_name_for_group(group: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..0x1000);
    format!("{}-{:03x}", group, suffix)
}
