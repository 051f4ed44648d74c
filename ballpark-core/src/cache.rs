//! Per-stadium forecast cache with a fixed time-to-live.
//!
//! The cache never fails: storage or decoding problems are logged and
//! behave like a miss.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{model::ForecastEntry, storage::Storage};

/// Entries older than this are never served.
pub const CACHE_TTL_MS: i64 = 30 * 60 * 1000;

pub const KEY_PREFIX: &str = "ballpark-weather:forecast:";

/// Stored record: `{"data": [...], "timestamp": <epoch ms>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub data: Vec<ForecastEntry>,
    pub timestamp: i64,
}

#[derive(Debug)]
pub struct ForecastCache<S: Storage> {
    storage: S,
}

impl<S: Storage> ForecastCache<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key_for(stadium_full_name: &str) -> String {
        format!("{KEY_PREFIX}{stadium_full_name}")
    }

    pub fn get(&mut self, stadium_full_name: &str) -> Option<Vec<ForecastEntry>> {
        self.get_at(stadium_full_name, Utc::now().timestamp_millis())
    }

    /// Cached entries if the record is at most [`CACHE_TTL_MS`] old at `now_ms`.
    /// A stale record is removed.
    pub fn get_at(&mut self, stadium_full_name: &str, now_ms: i64) -> Option<Vec<ForecastEntry>> {
        let key = Self::key_for(stadium_full_name);

        let raw = match self.storage.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(stadium = stadium_full_name, "forecast cache miss");
                return None;
            }
            Err(err) => {
                warn!(stadium = stadium_full_name, error = %err, "forecast cache read failed");
                return None;
            }
        };

        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(stadium = stadium_full_name, error = %err, "discarding unreadable cache record");
                self.remove_quietly(&key);
                return None;
            }
        };

        let age_ms = now_ms - record.timestamp;
        if age_ms > CACHE_TTL_MS {
            debug!(stadium = stadium_full_name, age_ms, "forecast cache entry expired");
            self.remove_quietly(&key);
            return None;
        }

        debug!(stadium = stadium_full_name, age_ms, "forecast cache hit");
        Some(record.data)
    }

    pub fn set(&mut self, stadium_full_name: &str, entries: &[ForecastEntry]) {
        self.set_at(stadium_full_name, entries, Utc::now().timestamp_millis());
    }

    /// Store `entries` stamped with `now_ms`, replacing any previous record.
    pub fn set_at(&mut self, stadium_full_name: &str, entries: &[ForecastEntry], now_ms: i64) {
        let record = CacheRecord { data: entries.to_vec(), timestamp: now_ms };

        let raw = match serde_json::to_string(&record) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(stadium = stadium_full_name, error = %err, "failed to encode cache record");
                return;
            }
        };

        if let Err(err) = self.storage.set_item(&Self::key_for(stadium_full_name), &raw) {
            warn!(stadium = stadium_full_name, error = %err, "forecast cache write failed");
        }
    }

    pub fn clear(&mut self, stadium_full_name: &str) {
        self.remove_quietly(&Self::key_for(stadium_full_name));
    }

    /// Drop every forecast record. Keys outside the cache namespace are left alone.
    pub fn clear_all(&mut self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to list cache keys");
                return;
            }
        };

        for key in keys.iter().filter(|k| k.starts_with(KEY_PREFIX)) {
            self.remove_quietly(key);
        }
    }

    fn remove_quietly(&mut self, key: &str) {
        if let Err(err) = self.storage.remove_item(key) {
            warn!(key, error = %err, "failed to evict cache record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use anyhow::{Result, anyhow};

    const T0: i64 = 1_760_000_000_000;

    fn entries() -> Vec<ForecastEntry> {
        vec![
            ForecastEntry {
                time: "2026-10-18T12:00:00".into(),
                temp: 19.4,
                weather: "구름 조금".into(),
                pop: Some(0.2),
                rain: None,
            },
            ForecastEntry {
                time: "2026-10-18T15:00:00".into(),
                temp: 20.1,
                weather: "약한 비".into(),
                pop: Some(0.74),
                rain: Some(2.31),
            },
        ]
    }

    #[test]
    fn round_trip_within_ttl() {
        let mut cache = ForecastCache::new(MemoryStorage::new());
        cache.set_at("대전한화생명볼파크", &entries(), T0);

        assert_eq!(cache.get_at("대전한화생명볼파크", T0), Some(entries()));
        assert_eq!(cache.get_at("대전한화생명볼파크", T0 + CACHE_TTL_MS), Some(entries()));
    }

    #[test]
    fn expired_entry_is_not_served_and_is_evicted() {
        let mut cache = ForecastCache::new(MemoryStorage::new());
        cache.set_at("창원NC파크", &entries(), T0);

        assert_eq!(cache.get_at("창원NC파크", T0 + CACHE_TTL_MS + 1), None);
        assert_eq!(cache.storage().get_item(&ForecastCache::<MemoryStorage>::key_for("창원NC파크")).unwrap(), None);
        // Still gone even if asked with an earlier clock.
        assert_eq!(cache.get_at("창원NC파크", T0), None);
    }

    #[test]
    fn set_overwrites_previous_record() {
        let mut cache = ForecastCache::new(MemoryStorage::new());
        cache.set_at("고척스카이돔", &entries(), T0);
        cache.set_at("고척스카이돔", &entries()[..1], T0 + 1000);

        let got = cache.get_at("고척스카이돔", T0 + 1000).unwrap();
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn clear_and_clear_all() {
        let mut storage = MemoryStorage::new();
        storage.set_item("unrelated", "keep me").unwrap();

        let mut cache = ForecastCache::new(storage);
        cache.set_at("부산사직구장", &entries(), T0);
        cache.set_at("대구삼성라이온즈파크", &entries(), T0);

        cache.clear("부산사직구장");
        assert_eq!(cache.get_at("부산사직구장", T0), None);
        assert!(cache.get_at("대구삼성라이온즈파크", T0).is_some());

        cache.clear_all();
        assert_eq!(cache.get_at("대구삼성라이온즈파크", T0), None);
        assert_eq!(cache.storage().get_item("unrelated").unwrap().as_deref(), Some("keep me"));
    }

    #[test]
    fn unreadable_record_is_a_miss() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(&ForecastCache::<MemoryStorage>::key_for("광주기아챔피언스필드"), "{broken")
            .unwrap();

        let mut cache = ForecastCache::new(storage);
        assert_eq!(cache.get_at("광주기아챔피언스필드", T0), None);
    }

    #[test]
    fn record_layout_matches_stored_format() {
        let mut cache = ForecastCache::new(MemoryStorage::new());
        cache.set_at("인천SSG랜더스필드", &entries(), T0);

        let raw = cache
            .storage()
            .get_item(&ForecastCache::<MemoryStorage>::key_for("인천SSG랜더스필드"))
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["timestamp"], T0);
        assert_eq!(value["data"][1]["rain"], 2.31);
    }

    #[derive(Debug)]
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }
        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
        fn remove_item(&mut self, _key: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
        fn keys(&self) -> Result<Vec<String>> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn storage_failures_fail_open() {
        let mut cache = ForecastCache::new(BrokenStorage);
        cache.set("잠실", &entries());
        assert_eq!(cache.get("잠실"), None);
        cache.clear("잠실");
        cache.clear_all();
    }
}
