mod common;

use cirrus_cloud::CloudError;
use cirrus_cloud_gce::{
    FirewallOptions, FirewallRule, GceError, NetworkAndAddressRange, ResourceMutator,
};
use common::{FakeCompute, network_uri, poll_config};

#[tokio::test(start_paused = true)]
async fn test_create_and_delete_network() {
    let api = FakeCompute::new();
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let key = NetworkAndAddressRange::new("party", "10.0.0.0/8");
    let operation = mutator.create_network(&key).await.unwrap();
    assert!(operation.is_done());
    assert!(api.has_network("party"));

    mutator.delete_network("party").await.unwrap();
    assert!(!api.has_network("party"));
    assert_eq!(api.calls(), vec!["insert network party", "delete network party"]);
}

#[tokio::test(start_paused = true)]
async fn test_create_and_delete_firewall() {
    let api = FakeCompute::new();
    api.add_network("party");
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let options = FirewallOptions::new("party-0a1", network_uri("party"))
        .with_allowed_rule(FirewallRule::new("tcp", vec!["22".to_string()]))
        .with_source_ranges(vec!["0.0.0.0/0".to_string()]);
    mutator.create_firewall(&options).await.unwrap();

    let firewalls = api.firewalls();
    assert_eq!(firewalls.len(), 1);
    assert_eq!(firewalls[0].name, "party-0a1");
    assert_eq!(firewalls[0].network, network_uri("party"));

    mutator.delete_firewall("party-0a1").await.unwrap();
    assert!(api.firewalls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_operation_is_error() {
    let api = FakeCompute::new();
    api.add_network("party");
    api.fail_operations_on("party", 400);
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let err = mutator.delete_network("party").await.unwrap_err();

    match &err {
        GceError::OperationFailed {
            action, status, message, ..
        } => {
            assert_eq!(action, "delete network");
            assert_eq!(*status, 400);
            assert!(message.contains("BAD REQUEST"));
        }
        other => panic!("expected OperationFailed, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Could not delete network"));
    assert!(api.has_network("party"));

    assert!(matches!(CloudError::from(err), CloudError::OperationFailed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_unfinished_operation_times_out() {
    let api = FakeCompute::with_polls_until_done(u32::MAX);
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let key = NetworkAndAddressRange::new("slow", "10.0.0.0/8");
    let err = mutator.create_network(&key).await.unwrap_err();

    assert!(matches!(err, GceError::OperationTimeout { .. }));
    assert!(!api.has_network("slow"));
    assert!(matches!(CloudError::from(err), CloudError::Timeout(_)));
}

#[tokio::test(start_paused = true)]
async fn test_immediately_done_operation() {
    let api = FakeCompute::with_polls_until_done(0);
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let key = NetworkAndAddressRange::new("fast", "192.168.0.0/16").with_gateway("192.168.0.1");
    mutator.create_network(&key).await.unwrap();

    assert!(api.has_network("fast"));
}

#[tokio::test]
async fn test_submit_error_propagates() {
    let api = FakeCompute::new();
    let mutator = ResourceMutator::new(api.clone(), poll_config());

    let err = mutator.delete_firewall("missing").await.unwrap_err();

    assert!(matches!(err, GceError::NotFound(_)));
    assert!(api.calls().is_empty());
}
