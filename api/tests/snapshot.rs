use kvq_api::{ApiState, MemorySnapshotStore, ServerConfig, SnapshotStore};
use kvq_common::ManualClock;
use kvq_queue::MessageId;
use std::sync::Arc;
use std::time::Duration;

const LEASE: Duration = Duration::from_secs(30);

#[tokio::test]
async fn restore_preserves_tenants_entries_and_leases() {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let before = ApiState::new(ServerConfig::default(), clock.clone());

    let (token, tenant) = before.registry.create_user();
    before.kv.set(tenant, "keep", "v", None).unwrap();
    before.kv.set(tenant, "short", "v", Some(Duration::from_millis(10))).unwrap();
    let leased = before.queue.send(tenant, "jobs", "first").unwrap();
    let waiting = before.queue.send(tenant, "jobs", "second").unwrap();
    before.queue.receive(tenant, "jobs", LEASE).unwrap();

    clock.advance(Duration::from_millis(10));
    let store = MemorySnapshotStore::new();
    store.save(&before.snapshot()).await.unwrap();

    let after = ApiState::new(ServerConfig::default(), clock.clone());
    after.restore(store.load().await.unwrap().unwrap());

    assert_eq!(after.registry.resolve(token.as_str()), Ok(tenant));
    assert_eq!(after.kv.get(tenant, "keep").unwrap().value, "v");
    assert!(after.kv.get(tenant, "short").is_none());

    // The lease survived: the second message is next
    assert_eq!(after.queue.receive(tenant, "jobs", LEASE).unwrap().id, waiting);
    let fresh = after.queue.send(tenant, "jobs", "third").unwrap();

    clock.advance(LEASE);
    let order: Vec<MessageId> = (0..3)
        .map(|_| after.queue.receive(tenant, "jobs", LEASE).unwrap().id)
        .collect();
    assert_eq!(order, vec![leased, waiting, fresh]);
}
