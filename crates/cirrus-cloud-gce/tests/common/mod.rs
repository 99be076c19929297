use async_trait::async_trait;
use cirrus_cloud::PollConfig;
use cirrus_cloud_gce::{
    Firewall, FirewallApi, FirewallOptions, GceError, GceSecurityGroupExtension, Instance,
    InstanceApi, ListPage, Network, NetworkApi, NetworkInterface, Operation, OperationApi,
    OperationStatus, Result, Tags,
};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const PROJECT: &str = "https://www.googleapis.com/compute/v1/projects/party";

pub fn network_uri(name: &str) -> String {
    format!("{}/global/networks/{}", PROJECT, name)
}

#[allow(dead_code)]
pub fn poll_config() -> PollConfig {
    PollConfig::new(Duration::from_millis(100), Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn extension(api: &Arc<FakeCompute>) -> GceSecurityGroupExtension {
    GceSecurityGroupExtension::with_poll_config(api.clone(), poll_config(), "10.0.0.0/8")
}

enum Effect {
    InsertNetwork(Network),
    DeleteNetwork(String),
    InsertFirewall(Firewall),
    DeleteFirewall(String),
}

struct PendingOperation {
    operation: Operation,
    polls_left: u32,
    effect: Option<Effect>,
    failure: Option<u16>,
}

#[derive(Default)]
struct State {
    networks: BTreeMap<String, Network>,
    firewalls: BTreeMap<String, Firewall>,
    instances: HashMap<String, Instance>,
    operations: HashMap<String, PendingOperation>,
    calls: Vec<String>,
    next_id: u64,
    polls_until_done: u32,
    page_size: usize,
    failing: HashMap<String, u16>,
    failing_calls: Vec<(String, u16)>,
}

/// In-memory Compute Engine whose operations finish after a number of polls
///
/// Mutations only take effect once their operation reaches DONE, and a
/// failing operation never applies its effect.
pub struct FakeCompute {
    state: Mutex<State>,
}

#[allow(dead_code)]
impl FakeCompute {
    pub fn new() -> Arc<Self> {
        Self::with_polls_until_done(2)
    }

    pub fn with_polls_until_done(polls: u32) -> Arc<Self> {
        let state = State {
            polls_until_done: polls,
            page_size: usize::MAX,
            ..Default::default()
        };
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_page_size(&self, size: usize) {
        self.state().page_size = size;
    }

    /// Operations targeting `name` end DONE with `status` and no effect
    pub fn fail_operations_on(&self, name: &str, status: u16) {
        self.state().failing.insert(name.to_string(), status);
    }

    /// Operations of calls starting with `prefix` end DONE with `status`
    pub fn fail_calls_starting_with(&self, prefix: &str, status: u16) {
        self.state()
            .failing_calls
            .push((prefix.to_string(), status));
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing.clear();
        state.failing_calls.clear();
    }

    pub fn add_network(&self, name: &str) -> Network {
        let mut state = self.state();
        let network = new_network(&mut state, name, "10.0.0.0/8", None);
        state.networks.insert(name.to_string(), network.clone());
        network
    }

    pub fn add_firewall(&self, firewall: Firewall) {
        self.state()
            .firewalls
            .insert(firewall.name.clone(), firewall);
    }

    pub fn add_instance(&self, name: &str, networks: &[&str], tags: &[&str]) -> String {
        let self_link = format!("{}/zones/us-central1-a/instances/{}", PROJECT, name);
        let instance = Instance {
            id: format!("{}-id", name),
            name: name.to_string(),
            self_link: self_link.clone(),
            tags: Tags {
                items: tags.iter().map(|t| t.to_string()).collect(),
                fingerprint: None,
            },
            network_interfaces: networks
                .iter()
                .enumerate()
                .map(|(i, n)| NetworkInterface {
                    name: Some(format!("nic{}", i)),
                    network: network_uri(n),
                    network_ip: Some(format!("10.0.0.{}", i + 2)),
                })
                .collect(),
        };
        self.state().instances.insert(self_link.clone(), instance);
        self_link
    }

    pub fn has_network(&self, name: &str) -> bool {
        self.state().networks.contains_key(name)
    }

    pub fn firewalls(&self) -> Vec<Firewall> {
        self.state().firewalls.values().cloned().collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn start(&self, call: String, target: &str, operation_type: &str, effect: Effect) -> Operation {
        let mut state = self.state();
        let failure = state.failing.get(target).copied().or_else(|| {
            state
                .failing_calls
                .iter()
                .find(|(prefix, _)| call.starts_with(prefix.as_str()))
                .map(|(_, status)| *status)
        });
        state.calls.push(call);
        state.next_id += 1;

        let name = format!("operation-{}", state.next_id);
        let mut pending = PendingOperation {
            operation: Operation {
                id: state.next_id.to_string(),
                name: name.clone(),
                self_link: format!("{}/global/operations/{}", PROJECT, name),
                target_link: Some(target.to_string()),
                operation_type: operation_type.to_string(),
                status: OperationStatus::Pending,
                http_error_status_code: None,
                http_error_message: None,
                errors: vec![],
            },
            polls_left: state.polls_until_done,
            effect: Some(effect),
            failure,
        };

        if pending.polls_left == 0 {
            finish(&mut state, &mut pending);
        }
        let operation = pending.operation.clone();
        state.operations.insert(operation.self_link.clone(), pending);
        operation
    }
}

fn new_network(state: &mut State, name: &str, range: &str, gateway: Option<&str>) -> Network {
    state.next_id += 1;
    Network {
        id: state.next_id.to_string(),
        creation_timestamp: None,
        self_link: network_uri(name),
        name: name.to_string(),
        description: None,
        range_ipv4: Some(range.to_string()),
        gateway_ipv4: gateway.map(str::to_string),
    }
}

fn finish(state: &mut State, pending: &mut PendingOperation) {
    pending.operation.status = OperationStatus::Done;
    if let Some(status) = pending.failure {
        pending.operation.http_error_status_code = Some(status);
        pending.operation.http_error_message = Some("BAD REQUEST".to_string());
        return;
    }
    match pending.effect.take() {
        Some(Effect::InsertNetwork(network)) => {
            state.networks.insert(network.name.clone(), network);
        }
        Some(Effect::DeleteNetwork(name)) => {
            state.networks.remove(&name);
        }
        Some(Effect::InsertFirewall(firewall)) => {
            state.firewalls.insert(firewall.name.clone(), firewall);
        }
        Some(Effect::DeleteFirewall(name)) => {
            state.firewalls.remove(&name);
        }
        None => {}
    }
}

fn page<T: Clone>(items: Vec<T>, page_size: usize, token: Option<&str>) -> ListPage<T> {
    let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
    let end = start.saturating_add(page_size).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    ListPage::new(items[start..end].to_vec(), next)
}

/// Evaluate `network eq <regex>` against a firewall's network URI
fn matches_filter(filter: Option<&str>, firewall: &Firewall) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let pattern = filter
        .strip_prefix("network eq ")
        .expect("unsupported filter");
    let regex = Regex::new(&format!("^(?:{})$", pattern)).unwrap();
    regex.is_match(&firewall.network)
}

#[async_trait]
impl NetworkApi for FakeCompute {
    async fn list_networks_page(&self, page_token: Option<&str>) -> Result<ListPage<Network>> {
        let state = self.state();
        let networks = state.networks.values().cloned().collect();
        Ok(page(networks, state.page_size, page_token))
    }

    async fn get_network(&self, name: &str) -> Result<Option<Network>> {
        Ok(self.state().networks.get(name).cloned())
    }

    async fn create_network_in_range(
        &self,
        name: &str,
        ipv4_range: &str,
        gateway_ipv4: Option<&str>,
    ) -> Result<Operation> {
        let network = new_network(&mut self.state(), name, ipv4_range, gateway_ipv4);
        Ok(self.start(
            format!("insert network {}", name),
            name,
            "insert",
            Effect::InsertNetwork(network),
        ))
    }

    async fn delete_network(&self, name: &str) -> Result<Operation> {
        if !self.state().networks.contains_key(name) {
            return Err(GceError::NotFound(format!("network {}", name)));
        }
        Ok(self.start(
            format!("delete network {}", name),
            name,
            "delete",
            Effect::DeleteNetwork(name.to_string()),
        ))
    }
}

#[async_trait]
impl FirewallApi for FakeCompute {
    async fn list_firewalls_page(
        &self,
        filter: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ListPage<Firewall>> {
        let state = self.state();
        let firewalls = state
            .firewalls
            .values()
            .filter(|fw| matches_filter(filter, fw))
            .cloned()
            .collect();
        Ok(page(firewalls, state.page_size, page_token))
    }

    async fn create_firewall_in_network(
        &self,
        name: &str,
        network_uri: &str,
        options: &FirewallOptions,
    ) -> Result<Operation> {
        let id = {
            let mut state = self.state();
            state.next_id += 1;
            state.next_id
        };
        let firewall = Firewall {
            id: id.to_string(),
            self_link: format!("{}/global/firewalls/{}", PROJECT, name),
            name: name.to_string(),
            network: network_uri.to_string(),
            source_ranges: options.source_ranges.clone(),
            source_tags: options.source_tags.clone(),
            target_tags: options.target_tags.clone(),
            allowed: options.allowed.clone(),
        };
        Ok(self.start(
            format!("insert firewall {}", name),
            name,
            "insert",
            Effect::InsertFirewall(firewall),
        ))
    }

    async fn delete_firewall(&self, name: &str) -> Result<Operation> {
        if !self.state().firewalls.contains_key(name) {
            return Err(GceError::NotFound(format!("firewall {}", name)));
        }
        Ok(self.start(
            format!("delete firewall {}", name),
            name,
            "delete",
            Effect::DeleteFirewall(name.to_string()),
        ))
    }
}

#[async_trait]
impl OperationApi for FakeCompute {
    async fn get_operation(&self, self_link: &str) -> Result<Option<Operation>> {
        let mut guard = self.state();
        let state = &mut *guard;
        let Some(mut pending) = state.operations.remove(self_link) else {
            return Ok(None);
        };

        if !pending.operation.is_done() {
            pending.polls_left = pending.polls_left.saturating_sub(1);
            if pending.polls_left == 0 {
                finish(state, &mut pending);
            } else {
                pending.operation.status = OperationStatus::Running;
            }
        }
        let operation = pending.operation.clone();
        state.operations.insert(self_link.to_string(), pending);
        Ok(Some(operation))
    }
}

#[async_trait]
impl InstanceApi for FakeCompute {
    async fn get_instance(&self, uri: &str) -> Result<Option<Instance>> {
        Ok(self.state().instances.get(uri).cloned())
    }
}
