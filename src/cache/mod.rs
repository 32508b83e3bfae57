//! Last-known device status, served when the device cannot be reached.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::models::{RelayId, RELAY_COUNT};

const RELAYS_KEY: &str = "relays";

#[derive(Debug)]
struct CachedStatus {
    status: Map<String, Value>,
    /// Last time the device answered successfully.
    last_device_contact: Option<DateTime<Utc>>,
}

/// Shared status cache. Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct StatusCache {
    inner: Arc<RwLock<CachedStatus>>,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCache {
    /// All relays off, device never contacted.
    pub fn new() -> Self {
        let mut status = Map::new();
        status.insert(RELAYS_KEY.to_string(), all_off());

        Self {
            inner: Arc::new(RwLock::new(CachedStatus {
                status,
                last_device_contact: None,
            })),
        }
    }

    /// Current cached status object.
    pub async fn snapshot(&self) -> Value {
        Value::Object(self.inner.read().await.status.clone())
    }

    /// Overwrite cached keys with those reported by the device.
    ///
    /// Keys the device did not report keep their previous value.
    pub async fn merge(&self, status: &Map<String, Value>) {
        let mut cached = self.inner.write().await;
        for (key, value) in status {
            cached.status.insert(key.clone(), value.clone());
        }
        cached.last_device_contact = Some(Utc::now());
    }

    /// Record the state the device reported for a single relay.
    pub async fn set_relay(&self, relay: RelayId, state: bool) {
        let mut cached = self.inner.write().await;

        let relays = cached
            .status
            .entry(RELAYS_KEY.to_string())
            .or_insert_with(all_off);
        if !relays.is_array() {
            tracing::warn!("Cached relays field is not an array ({}), resetting", relays);
            *relays = all_off();
        }
        if let Value::Array(items) = relays {
            if items.len() < RELAY_COUNT {
                items.resize(RELAY_COUNT, Value::Bool(false));
            }
            items[relay.index()] = Value::Bool(state);
        }

        cached.last_device_contact = Some(Utc::now());
    }

    /// Cached state of one relay, if it is a boolean.
    #[cfg(test)]
    pub async fn relay(&self, relay: RelayId) -> Option<bool> {
        self.inner
            .read()
            .await
            .status
            .get(RELAYS_KEY)
            .and_then(|v| v.get(relay.index()))
            .and_then(|v| v.as_bool())
    }

    pub async fn last_device_contact(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_device_contact
    }
}

fn all_off() -> Value {
    Value::Array(vec![Value::Bool(false); RELAY_COUNT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn relay(idx: i64) -> RelayId {
        RelayId::try_from(idx).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_initial_state_all_off() {
        let cache = StatusCache::new();
        assert_eq!(
            cache.snapshot().await,
            json!({"relays": [false, false, false, false]})
        );
        assert!(cache.last_device_contact().await.is_none());
    }

    #[tokio::test]
    async fn test_merge_replaces_reported_keys() {
        let cache = StatusCache::new();
        cache
            .merge(&object(json!({"relays": [true, false, true, false], "rssi": -61})))
            .await;

        assert_eq!(
            cache.snapshot().await,
            json!({"relays": [true, false, true, false], "rssi": -61})
        );
        assert!(cache.last_device_contact().await.is_some());

        // A later payload without rssi leaves it in place
        cache
            .merge(&object(json!({"relays": [false, false, false, true]})))
            .await;
        assert_eq!(
            cache.snapshot().await,
            json!({"relays": [false, false, false, true], "rssi": -61})
        );
    }

    #[tokio::test]
    async fn test_set_relay_updates_single_index() {
        let cache = StatusCache::new();
        cache.set_relay(relay(2), true).await;

        assert_eq!(cache.relay(relay(2)).await, Some(true));
        assert_eq!(
            cache.snapshot().await,
            json!({"relays": [false, false, true, false]})
        );

        cache.set_relay(relay(2), false).await;
        assert_eq!(cache.relay(relay(2)).await, Some(false));
    }

    #[tokio::test]
    async fn test_set_relay_repairs_malformed_relays() {
        let cache = StatusCache::new();
        cache.merge(&object(json!({"relays": [true]}))).await;
        cache.set_relay(relay(3), true).await;
        assert_eq!(
            cache.snapshot().await["relays"],
            json!([true, false, false, true])
        );

        cache.merge(&object(json!({"relays": "broken"}))).await;
        cache.set_relay(relay(0), true).await;
        assert_eq!(
            cache.snapshot().await["relays"],
            json!([true, false, false, false])
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = StatusCache::new();
        let other = cache.clone();
        other.set_relay(relay(1), true).await;
        assert_eq!(cache.relay(relay(1)).await, Some(true));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_relay_writes_all_kept() {
        let cache = StatusCache::new();

        let tasks: Vec<_> = (0..RELAY_COUNT as i64)
            .map(|idx| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.set_relay(relay(idx), true).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(
            cache.snapshot().await["relays"],
            json!([true, true, true, true])
        );

        let (a, b) = (cache.clone(), cache.clone());
        tokio::join!(a.set_relay(relay(0), false), b.set_relay(relay(3), false));
        assert_eq!(
            cache.snapshot().await["relays"],
            json!([false, true, true, false])
        );
    }
}
