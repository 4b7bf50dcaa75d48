//! Queue engine

use crate::message::{Message, MessageId, MessageRecord, ReceivedMessage, Visibility};
use crate::namespace::Namespace;
use dashmap::DashMap;
use kvq_common::clock::deadline_after;
use kvq_common::{Clock, EpochMillis, KvqError, KvqResult};
use kvq_tenant::TenantId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

type NamespaceKey = (TenantId, String);

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Live namespaces across all tenants
    pub namespaces: usize,
    /// Messages a receive could return right now
    pub visible: usize,
    /// Messages under an active lease
    pub leased: usize,
}

/// Per-tenant, per-namespace message queues
///
/// Each namespace is its own mutex; unrelated namespaces never contend on a
/// queue lock. Namespaces are created by the first `send` and dropped by
/// [`QueueEngine::release_expired_leases`] once empty.
#[derive(Debug)]
pub struct QueueEngine {
    namespaces: DashMap<NamespaceKey, Mutex<Namespace>>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl QueueEngine {
    /// Create an empty engine
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            namespaces: DashMap::new(),
            next_seq: AtomicU64::new(0),
            clock,
        }
    }

    /// Enqueue `body`; the message is immediately visible
    pub fn send(
        &self,
        tenant: TenantId,
        namespace: &str,
        body: impl Into<String>,
    ) -> KvqResult<MessageId> {
        if namespace.is_empty() {
            return Err(KvqError::validation("namespace must not be empty or missing"));
        }

        let message = Message {
            id: MessageId::generate(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            body: body.into(),
            enqueued_at: self.clock.now_ms(),
            visibility: Visibility::Visible,
            receive_count: 0,
        };
        let id = message.id.clone();
        self.push(tenant, namespace.to_owned(), message);

        tracing::debug!(%tenant, namespace, %id, "queue send");
        Ok(id)
    }

    fn push(&self, tenant: TenantId, namespace: String, message: Message) {
        let key = (tenant, namespace);
        match self.namespaces.get(&key) {
            Some(ns) => ns.lock().push(message),
            None => self.namespaces.entry(key).or_default().get_mut().push(message),
        }
    }

    /// Lease the oldest eligible message for `visibility_timeout`
    ///
    /// Returns `None` when the namespace does not exist, is drained, or every
    /// message is under an active lease.
    pub fn receive(
        &self,
        tenant: TenantId,
        namespace: &str,
        visibility_timeout: Duration,
    ) -> Option<ReceivedMessage> {
        let now = self.clock.now_ms();
        let until = deadline_after(now, visibility_timeout);

        let ns = self.namespaces.get(&(tenant, namespace.to_owned()))?;
        let mut ns = ns.lock();
        let message = ns.lease_next(now, until)?;

        tracing::debug!(
            %tenant,
            namespace,
            id = %message.id,
            until,
            receive_count = message.receive_count,
            "queue lease"
        );
        Some(ReceivedMessage {
            id: message.id.clone(),
            namespace: namespace.to_owned(),
            body: message.body.clone(),
            receive_count: message.receive_count,
        })
    }

    /// Acknowledge a message
    ///
    /// Idempotent: unknown ids, already deleted ids and ids from other
    /// namespaces are a no-op. Returns whether something was removed.
    pub fn delete(&self, tenant: TenantId, namespace: &str, id: &MessageId) -> bool {
        let Some(ns) = self.namespaces.get(&(tenant, namespace.to_owned())) else {
            return false;
        };
        let removed = ns.lock().remove(id);
        tracing::debug!(%tenant, namespace, %id, removed, "queue delete");
        removed
    }

    /// Make lapsed leases visible again and drop empty namespaces
    ///
    /// Returns the number of leases released.
    pub fn release_expired_leases(&self, now: EpochMillis) -> usize {
        let mut released = 0;
        self.namespaces.retain(|_, ns| {
            let ns = ns.get_mut();
            released += ns.release_expired(now);
            !ns.is_empty()
        });
        released
    }

    /// Current counts across every namespace
    pub fn stats(&self) -> QueueStats {
        let now = self.clock.now_ms();
        let mut stats = QueueStats::default();
        for ns in self.namespaces.iter() {
            let (visible, leased) = ns.lock().counts(now);
            stats.namespaces += 1;
            stats.visible += visible;
            stats.leased += leased;
        }
        stats
    }

    /// Dump every message for a snapshot
    pub fn export(&self) -> Vec<MessageRecord> {
        let mut records = Vec::new();
        for ns in self.namespaces.iter() {
            let (tenant_id, namespace) = ns.key().clone();
            records.extend(ns.lock().iter().map(|message| MessageRecord {
                tenant_id,
                namespace: namespace.clone(),
                id: message.id.clone(),
                seq: message.seq,
                body: message.body.clone(),
                enqueued_at: message.enqueued_at,
                visibility: message.visibility,
                receive_count: message.receive_count,
            }));
        }
        records.sort_by_key(|record| record.seq);
        records
    }

    /// Load messages from a snapshot
    ///
    /// Sequence numbering continues after the highest restored sequence, so
    /// restored messages stay ahead of anything sent afterwards.
    pub fn restore(&self, records: impl IntoIterator<Item = MessageRecord>) -> usize {
        let mut count = 0;
        for record in records {
            if record.namespace.is_empty() {
                continue;
            }
            self.next_seq.fetch_max(record.seq + 1, Ordering::Relaxed);
            self.push(
                record.tenant_id,
                record.namespace,
                Message {
                    id: record.id,
                    seq: record.seq,
                    body: record.body,
                    enqueued_at: record.enqueued_at,
                    visibility: record.visibility,
                    receive_count: record.receive_count,
                },
            );
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvq_common::ManualClock;
    use std::collections::HashSet;
    use std::sync::Barrier;
    use uuid::Uuid;

    const T0: EpochMillis = 1_700_000_000_000;
    const LEASE: Duration = Duration::from_secs(20);

    fn engine() -> (QueueEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        (QueueEngine::new(clock.clone()), clock)
    }

    #[test]
    fn test_send_receive_delete() {
        let (queue, _) = engine();
        let tenant = Uuid::new_v4();

        let id = queue.send(tenant, "a", "b").unwrap();
        let got = queue.receive(tenant, "a", LEASE).unwrap();
        assert_eq!(got.id, id);
        assert_eq!(got.namespace, "a");
        assert_eq!(got.body, "b");
        assert_eq!(got.receive_count, 1);

        assert!(queue.delete(tenant, "a", &id));
        assert!(queue.receive(tenant, "a", LEASE).is_none());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let (queue, _) = engine();
        let err = queue.send(Uuid::new_v4(), "", "b").unwrap_err();
        assert!(matches!(err, KvqError::Validation(_)));
    }

    #[test]
    fn test_receive_unknown_namespace_does_not_create_it() {
        let (queue, _) = engine();
        assert!(queue.receive(Uuid::new_v4(), "ghost", LEASE).is_none());
        assert_eq!(queue.stats().namespaces, 0);
    }

    #[test]
    fn test_lease_hides_message() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        queue.send(tenant, "a", "b").unwrap();

        assert!(queue.receive(tenant, "a", LEASE).is_some());
        assert!(queue.receive(tenant, "a", LEASE).is_none());

        clock.advance(LEASE - Duration::from_millis(1));
        assert!(queue.receive(tenant, "a", LEASE).is_none());
    }

    #[test]
    fn test_redelivery_after_lease_lapses() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        let id = queue.send(tenant, "a", "b").unwrap();

        queue.receive(tenant, "a", LEASE).unwrap();
        clock.advance(LEASE + Duration::from_millis(1));

        let again = queue.receive(tenant, "a", LEASE).unwrap();
        assert_eq!(again.id, id);
        assert_eq!(again.receive_count, 2);
    }

    #[test]
    fn test_zero_timeout_is_immediately_eligible() {
        let (queue, _) = engine();
        let tenant = Uuid::new_v4();
        let id = queue.send(tenant, "a", "b").unwrap();

        assert_eq!(queue.receive(tenant, "a", Duration::ZERO).unwrap().id, id);
        assert_eq!(queue.receive(tenant, "a", Duration::ZERO).unwrap().id, id);
    }

    #[test]
    fn test_fifo_among_eligible() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        let first = queue.send(tenant, "a", "1").unwrap();
        let second = queue.send(tenant, "a", "2").unwrap();
        let third = queue.send(tenant, "a", "3").unwrap();

        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().id, first);
        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().id, second);

        // first's lease lapses; it is older than third so it goes out first
        clock.advance(LEASE);
        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().id, first);
        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().id, second);
        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().id, third);
    }

    #[test]
    fn test_delete_is_idempotent_and_survives_redelivery() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        let id = queue.send(tenant, "a", "b").unwrap();

        queue.receive(tenant, "a", LEASE).unwrap();
        clock.advance(LEASE);
        // Redelivered to a second consumer before the first acks
        queue.receive(tenant, "a", LEASE).unwrap();

        assert!(queue.delete(tenant, "a", &id));
        assert!(!queue.delete(tenant, "a", &id));

        clock.advance(LEASE * 2);
        assert!(queue.receive(tenant, "a", LEASE).is_none());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (queue, _) = engine();
        let tenant = Uuid::new_v4();
        queue.send(tenant, "a", "b").unwrap();

        assert!(!queue.delete(tenant, "a", &MessageId::from_raw("missing")));
        assert!(!queue.delete(tenant, "nowhere", &MessageId::from_raw("missing")));
        assert!(queue.receive(tenant, "a", LEASE).is_some());
    }

    #[test]
    fn test_isolation_between_tenants_and_namespaces() {
        let (queue, _) = engine();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let id = queue.send(a, "jobs", "secret").unwrap();

        assert!(queue.receive(b, "jobs", LEASE).is_none());
        assert!(queue.receive(a, "other", LEASE).is_none());
        // Deleting with the wrong tenant or namespace leaves it alone
        assert!(!queue.delete(b, "jobs", &id));
        assert!(!queue.delete(a, "other", &id));
        assert_eq!(queue.receive(a, "jobs", LEASE).unwrap().id, id);
    }

    #[test]
    fn test_concurrent_receivers_single_message() {
        let (queue, _) = engine();
        let tenant = Uuid::new_v4();
        queue.send(tenant, "a", "b").unwrap();

        const RECEIVERS: usize = 16;
        let barrier = Barrier::new(RECEIVERS);
        let hits: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..RECEIVERS)
                .map(|_| {
                    let (queue, barrier) = (&queue, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        queue.receive(tenant, "a", LEASE).is_some() as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(hits, 1);
    }

    #[test]
    fn test_concurrent_receivers_never_share_a_lease() {
        let (queue, _) = engine();
        let tenant = Uuid::new_v4();
        for i in 0..200 {
            queue.send(tenant, "a", format!("m{i}")).unwrap();
        }

        let received: Vec<MessageId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let queue = &queue;
                    s.spawn(move || {
                        let mut mine = Vec::new();
                        while let Some(msg) = queue.receive(tenant, "a", LEASE) {
                            mine.push(msg.id);
                        }
                        mine
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = received.iter().cloned().collect();
        assert_eq!(received.len(), 200);
        assert_eq!(unique.len(), 200);
    }

    #[test]
    fn test_sweep_racing_send_receive_delete_loses_nothing() {
        const ROUNDS: usize = 5_000;
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();

        std::thread::scope(|s| {
            let worker = s.spawn(|| {
                for i in 0..ROUNDS {
                    let id = queue.send(tenant, "race", format!("m{i}")).unwrap();
                    let got = queue.receive(tenant, "race", LEASE);
                    assert_eq!(got.map(|m| m.id).as_ref(), Some(&id), "round {i}");
                    assert!(queue.delete(tenant, "race", &id), "round {i}");
                }
            });
            // Each delete empties the namespace, so the sweep keeps dropping it
            while !worker.is_finished() {
                queue.release_expired_leases(clock.now_ms());
            }
            worker.join().unwrap();
        });

        let stats = queue.stats();
        assert_eq!(stats.visible + stats.leased, 0);
    }

    #[test]
    fn test_release_expired_leases() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        queue.send(tenant, "a", "1").unwrap();
        queue.send(tenant, "a", "2").unwrap();
        queue.receive(tenant, "a", Duration::from_millis(100)).unwrap();
        queue.receive(tenant, "a", Duration::from_secs(100)).unwrap();

        assert_eq!(queue.release_expired_leases(clock.now_ms()), 0);
        clock.advance(Duration::from_millis(100));
        assert_eq!(queue.release_expired_leases(clock.now_ms()), 1);

        let stats = queue.stats();
        assert_eq!(
            stats,
            QueueStats {
                namespaces: 1,
                visible: 1,
                leased: 1,
            }
        );
    }

    #[test]
    fn test_sweep_drops_empty_namespaces() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        let id = queue.send(tenant, "a", "b").unwrap();
        queue.delete(tenant, "a", &id);

        assert_eq!(queue.stats().namespaces, 1);
        queue.release_expired_leases(clock.now_ms());
        assert_eq!(queue.stats().namespaces, 0);

        // Recreated lazily
        queue.send(tenant, "a", "c").unwrap();
        assert_eq!(queue.receive(tenant, "a", LEASE).unwrap().body, "c");
    }

    #[test]
    fn test_export_restore_keeps_order_and_leases() {
        let (queue, clock) = engine();
        let tenant = Uuid::new_v4();
        let first = queue.send(tenant, "a", "1").unwrap();
        let second = queue.send(tenant, "a", "2").unwrap();
        queue.receive(tenant, "a", LEASE).unwrap();

        let records = queue.export();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first);

        let (fresh, fresh_clock) = engine();
        fresh_clock.set(clock.now_ms());
        assert_eq!(fresh.restore(records), 2);

        // first is still leased, so second comes out
        assert_eq!(fresh.receive(tenant, "a", LEASE).unwrap().id, second);
        let third = fresh.send(tenant, "a", "3").unwrap();

        fresh_clock.advance(LEASE);
        assert_eq!(fresh.receive(tenant, "a", LEASE).unwrap().id, first);
        let next = fresh.receive(tenant, "a", LEASE).unwrap();
        assert_eq!(next.id, second);
        assert_eq!(next.receive_count, 2);
        assert_eq!(fresh.receive(tenant, "a", LEASE).unwrap().id, third);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tasks_drain_shared_engine() {
        let (queue, _) = engine();
        let queue = Arc::new(queue);
        let tenant = Uuid::new_v4();

        let mut senders = Vec::new();
        for i in 0..10 {
            let queue = queue.clone();
            senders.push(tokio::spawn(async move {
                for j in 0..10 {
                    queue.send(tenant, "jobs", format!("{i}-{j}")).unwrap();
                }
            }));
        }
        for sender in senders {
            sender.await.unwrap();
        }

        let mut consumers = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            consumers.push(tokio::spawn(async move {
                let mut acked = 0;
                while let Some(msg) = queue.receive(tenant, "jobs", LEASE) {
                    assert!(queue.delete(tenant, "jobs", &msg.id));
                    acked += 1;
                }
                acked
            }));
        }
        let mut total = 0;
        for consumer in consumers {
            total += consumer.await.unwrap();
        }

        assert_eq!(total, 100);
        assert_eq!(
            queue.stats(),
            QueueStats {
                namespaces: 1,
                visible: 0,
                leased: 0,
            }
        );
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Send,
            Receive(u64),
            DeleteLast,
            Advance(u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Send),
                (0u64..50).prop_map(Op::Receive),
                Just(Op::DeleteLast),
                (0u64..60).prop_map(Op::Advance),
            ]
        }

        proptest! {
            #[test]
            fn leases_never_overlap(ops in proptest::collection::vec(op(), 1..80)) {
                let (queue, clock) = engine();
                let tenant = Uuid::new_v4();
                let mut sent = HashSet::new();
                let mut deleted = HashSet::new();
                // id -> lease deadline held by the model
                let mut leases = std::collections::HashMap::new();
                let mut last = None;

                for op in ops {
                    match op {
                        Op::Send => {
                            sent.insert(queue.send(tenant, "p", "x").unwrap());
                        }
                        Op::Receive(ms) => {
                            let now = clock.now_ms();
                            let lease = Duration::from_millis(ms);
                            if let Some(msg) = queue.receive(tenant, "p", lease) {
                                prop_assert!(sent.contains(&msg.id));
                                prop_assert!(!deleted.contains(&msg.id));
                                if let Some(until) = leases.get(&msg.id) {
                                    prop_assert!(now >= *until);
                                }
                                leases.insert(msg.id.clone(), now + ms);
                                last = Some(msg.id);
                            }
                        }
                        Op::DeleteLast => {
                            if let Some(id) = last.take() {
                                queue.delete(tenant, "p", &id);
                                deleted.insert(id);
                            }
                        }
                        Op::Advance(ms) => {
                            clock.advance(Duration::from_millis(ms));
                            if ms % 2 == 0 {
                                queue.release_expired_leases(clock.now_ms());
                            }
                        }
                    }
                }

                let stats = queue.stats();
                prop_assert_eq!(stats.visible + stats.leased, sent.len() - deleted.len());
            }
        }
    }
}
