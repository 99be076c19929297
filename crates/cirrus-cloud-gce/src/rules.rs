//! Firewall comparisons against permissions and instance tags

use crate::domain::{Firewall, FirewallRule};
use crate::mapper::{parse_port_range, render_ports};
use cirrus_cloud::{IpPermission, IpProtocol};
use std::collections::BTreeSet;

const ANY_SOURCE: &str = "0.0.0.0/0";

/// Whether the firewall applies to an instance carrying `tags`
///
/// A firewall without target tags applies to every instance on its network.
pub fn applies_to_tags(firewall: &Firewall, tags: &[String]) -> bool {
    firewall.target_tags.is_empty() || firewall.target_tags.iter().any(|t| tags.contains(t))
}

fn same_protocol(rule: &FirewallRule, protocol: IpProtocol) -> bool {
    IpProtocol::from_value(&rule.ip_protocol) == protocol
}

/// A rule without ports allows every port of its protocol
fn rule_covers_ports(rule: &FirewallRule, from_port: i32, to_port: i32) -> bool {
    if rule.ports.is_empty() {
        return true;
    }
    if from_port <= 0 {
        return false;
    }
    rule.ports.iter().any(|spec| {
        parse_port_range(spec).is_some_and(|(from, to)| from <= from_port && to_port <= to)
    })
}

fn port_spans(ports: &[String]) -> Vec<Option<(i32, i32)>> {
    ports.iter().map(|spec| parse_port_range(spec)).collect()
}

/// Port specs compared as spans, so `"22-22"` equals `"22"`
fn rule_equals(rule: &FirewallRule, permission: &IpPermission) -> bool {
    let expected = render_ports(permission.from_port, permission.to_port);
    same_protocol(rule, permission.protocol) && port_spans(&rule.ports) == port_spans(&expected)
}

fn as_set(values: &[String]) -> BTreeSet<String> {
    values.iter().cloned().collect()
}

/// The firewall grants exactly `permission` and nothing else
///
/// Every allow-rule must match the permission's protocol and port spec, and
/// the source tags and ranges must equal its group ids and CIDR blocks.
pub fn equals_ip_permission(firewall: &Firewall, permission: &IpPermission) -> bool {
    !firewall.allowed.is_empty()
        && firewall.allowed.iter().all(|rule| rule_equals(rule, permission))
        && as_set(&firewall.source_tags) == permission.group_ids
        && as_set(&firewall.source_ranges) == permission.cidr_blocks
}

/// A permission without sources allows traffic from anywhere
fn sources_cover(firewall: &Firewall, permission: &IpPermission) -> bool {
    if permission.group_ids.is_empty() && permission.cidr_blocks.is_empty() {
        return firewall.source_tags.is_empty()
            && (firewall.source_ranges.is_empty()
                || firewall.source_ranges.iter().any(|r| r == ANY_SOURCE));
    }
    as_set(&firewall.source_tags).is_superset(&permission.group_ids)
        && as_set(&firewall.source_ranges).is_superset(&permission.cidr_blocks)
}

/// The firewall already allows at least what `permission` asks for
///
/// Only firewalls without target tags qualify: a permission is granted to
/// the whole group, not to a subset of its instances.
pub fn provides_ip_permission(firewall: &Firewall, permission: &IpPermission) -> bool {
    if !firewall.target_tags.is_empty() {
        return false;
    }

    let rule_match = firewall.allowed.iter().any(|rule| {
        same_protocol(rule, permission.protocol)
            && rule_covers_ports(rule, permission.from_port, permission.to_port)
    });

    rule_match && sources_cover(firewall, permission)
}
