//! Key-value state store with expiry.
//!
//! Playback state lives in a small set of keys per room: the current song
//! (expiring when it finishes), the playlist list, the remaining time of a
//! paused song, and the vote-skip set. [`MemoryStore`] keeps them in process;
//! another backend can implement [`StateStore`].

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tokio::time::Instant;

/// Time-to-live of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Missing,
    /// The key exists without expiry.
    Persistent,
    Expires(Duration),
}

/// Wrong value kind stored under a key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key {key} does not hold a {expected}")]
pub struct WrongType {
    pub key: String,
    pub expected: &'static str,
}

pub type StoreResult<T> = Result<T, WrongType>;

pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: String);
    fn set_ex(&self, key: &str, value: String, ttl: Duration);
    fn ttl(&self, key: &str) -> Ttl;
    /// Drop the expiry. Returns false when the key is missing.
    fn persist(&self, key: &str) -> bool;
    /// Set the expiry. Returns false when the key is missing.
    fn expire(&self, key: &str, ttl: Duration) -> bool;
    fn del(&self, key: &str) -> bool;
    fn incr(&self, key: &str) -> StoreResult<i64>;

    fn rpush(&self, key: &str, value: String) -> StoreResult<usize>;
    fn lpop(&self, key: &str) -> StoreResult<Option<String>>;
    fn lrange(&self, key: &str) -> StoreResult<Vec<String>>;
    /// Remove the last element equal to `value`.
    fn lrem_last(&self, key: &str, value: &str) -> StoreResult<bool>;

    fn sadd(&self, key: &str, member: String) -> StoreResult<bool>;
    fn scard(&self, key: &str) -> StoreResult<usize>;
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self { value, expires_at: None }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process [`StateStore`]. Expired keys are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn purge_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }

    fn wrong_type(key: &str, expected: &'static str) -> WrongType {
        WrongType {
            key: key.to_string(),
            expected,
        }
    }

    /// Apply `f` to the list under `key`, creating it when `create` is set.
    fn with_list<T>(
        &self,
        key: &str,
        create: bool,
        missing: T,
        f: impl FnOnce(&mut VecDeque<String>) -> T,
    ) -> StoreResult<T> {
        self.purge_expired(key);
        let mut entry = match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(entry) => entry.into_ref(),
            MapEntry::Vacant(entry) if create => entry.insert(Entry::new(Value::List(VecDeque::new()))),
            MapEntry::Vacant(_) => return Ok(missing),
        };
        let Value::List(list) = &mut entry.value else {
            return Err(Self::wrong_type(key, "list"));
        };
        let result = f(list);
        let now_empty = list.is_empty();
        drop(entry);
        if now_empty {
            self.entries.remove(key);
        }
        Ok(result)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.purge_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Str(value) => Ok(Some(value.clone())),
                _ => Err(Self::wrong_type(key, "string")),
            },
        }
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), Entry::new(Value::Str(value)));
    }

    fn set_ex(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value),
                expires_at: Some(Instant::now() + ttl),
            },
        );
    }

    fn ttl(&self, key: &str) -> Ttl {
        self.purge_expired(key);
        match self.entries.get(key) {
            None => Ttl::Missing,
            Some(entry) => match entry.expires_at {
                None => Ttl::Persistent,
                Some(at) => Ttl::Expires(at.saturating_duration_since(Instant::now())),
            },
        }
    }

    fn persist(&self, key: &str) -> bool {
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = None;
                true
            }
            None => false,
        }
    }

    fn expire(&self, key: &str, ttl: Duration) -> bool {
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                true
            }
            None => false,
        }
    }

    fn del(&self, key: &str) -> bool {
        self.purge_expired(key);
        self.entries.remove(key).is_some()
    }

    fn incr(&self, key: &str) -> StoreResult<i64> {
        self.purge_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Str("0".to_string())));
        let Value::Str(raw) = &mut entry.value else {
            return Err(Self::wrong_type(key, "counter"));
        };
        let next = raw
            .parse::<i64>()
            .map_err(|_| Self::wrong_type(key, "counter"))?
            .saturating_add(1);
        *raw = next.to_string();
        Ok(next)
    }

    fn rpush(&self, key: &str, value: String) -> StoreResult<usize> {
        self.with_list(key, true, 0, |list| {
            list.push_back(value);
            list.len()
        })
    }

    fn lpop(&self, key: &str) -> StoreResult<Option<String>> {
        self.with_list(key, false, None, |list| list.pop_front())
    }

    fn lrange(&self, key: &str) -> StoreResult<Vec<String>> {
        self.with_list(key, false, Vec::new(), |list| list.iter().cloned().collect())
    }

    fn lrem_last(&self, key: &str, value: &str) -> StoreResult<bool> {
        self.with_list(key, false, false, |list| match list.iter().rposition(|item| item == value) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        })
    }

    fn sadd(&self, key: &str, member: String) -> StoreResult<bool> {
        self.purge_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Set(HashSet::new())));
        match &mut entry.value {
            Value::Set(set) => Ok(set.insert(member)),
            _ => Err(Self::wrong_type(key, "set")),
        }
    }

    fn scard(&self, key: &str) -> StoreResult<usize> {
        self.purge_expired(key);
        match self.entries.get(key) {
            None => Ok(0),
            Some(entry) => match &entry.value {
                Value::Set(set) => Ok(set.len()),
                _ => Err(Self::wrong_type(key, "set")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expiring_key() {
        let store = MemoryStore::new();
        store.set_ex("room:current", "song".into(), Duration::from_secs(10));
        assert_eq!(store.ttl("room:current"), Ttl::Expires(Duration::from_secs(10)));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(store.ttl("room:current"), Ttl::Expires(Duration::from_secs(6)));

        // Paused songs keep their key until resumed
        assert!(store.persist("room:current"));
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.ttl("room:current"), Ttl::Persistent);

        assert!(store.expire("room:current", Duration::from_secs(6)));
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.ttl("room:current"), Ttl::Missing);
        assert_eq!(store.get("room:current").unwrap(), None);
        assert!(!store.persist("room:current"));
    }

    #[test]
    fn test_list_operations() {
        let store = MemoryStore::new();
        assert_eq!(store.lpop("list").unwrap(), None);

        store.rpush("list", "a".into()).unwrap();
        store.rpush("list", "b".into()).unwrap();
        store.rpush("list", "a".into()).unwrap();
        assert_eq!(store.lrange("list").unwrap(), vec!["a", "b", "a"]);

        assert!(store.lrem_last("list", "a").unwrap());
        assert_eq!(store.lrange("list").unwrap(), vec!["a", "b"]);
        assert!(!store.lrem_last("list", "zzz").unwrap());

        assert_eq!(store.lpop("list").unwrap().as_deref(), Some("a"));
        assert_eq!(store.lpop("list").unwrap().as_deref(), Some("b"));
        // Emptied lists disappear
        assert_eq!(store.ttl("list"), Ttl::Missing);
    }

    #[test]
    fn test_sets_counters_and_types() {
        let store = MemoryStore::new();
        assert!(store.sadd("votes", "a".into()).unwrap());
        assert!(!store.sadd("votes", "a".into()).unwrap());
        assert!(store.sadd("votes", "b".into()).unwrap());
        assert_eq!(store.scard("votes").unwrap(), 2);

        assert_eq!(store.incr("count").unwrap(), 1);
        assert_eq!(store.incr("count").unwrap(), 2);
        assert_eq!(store.get("count").unwrap().as_deref(), Some("2"));

        let err = store.rpush("votes", "x".into()).unwrap_err();
        assert_eq!(err.to_string(), "key votes does not hold a list");
        assert!(store.get("votes").is_err());
    }
}
