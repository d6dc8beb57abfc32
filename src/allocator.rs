use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::AllocatorConfig;

type ParamKey = (String, String, String);

struct AllocatorState {
    next: u64,
    cache: Option<LruCache<ParamKey, String>>,
}

/// Issues query aliases and bound-parameter names.
///
/// Aliases and parameters share one monotonically increasing sequence, so two
/// names minted by the same allocator never collide, whichever thread asked
/// for them. Share one allocator (behind an `Arc`) between all fragments that
/// end up in the same query.
///
/// With a cache configured, [`NameAllocator::param_for_value`] hands back the
/// previously minted name when the same alias, property and value are bound
/// again. The cache is an LRU bounded by its capacity.
pub struct NameAllocator {
    state: Mutex<AllocatorState>,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameAllocator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AllocatorState {
                next: 0,
                cache: None,
            }),
        }
    }

    pub fn with_cache(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(AllocatorState {
                next: 0,
                cache: Some(LruCache::new(capacity)),
            }),
        }
    }

    pub fn from_config(config: &AllocatorConfig) -> Self {
        match config.param_cache_capacity.and_then(NonZeroUsize::new) {
            Some(capacity) => Self::with_cache(capacity),
            None => Self::new(),
        }
    }

    /// `<snake_case type>_<n>`
    pub fn alias(&self, type_name: &str) -> String {
        let n = self.next();
        format!("{}_{n}", snake_case(type_name))
    }

    /// `param_<alias>_<property>_<n>`, always freshly minted.
    pub fn param(&self, alias: &str, property: &str) -> String {
        let n = self.next();
        format!("param_{alias}_{}_{n}", sanitize(property))
    }

    /// Like [`NameAllocator::param`], but reuses a cached name for an identical
    /// `(alias, property, value)` binding when the cache is enabled.
    pub fn param_for_value(&self, alias: &str, property: &str, value: &Value) -> String {
        let mut state = self.state.lock();
        let key = match state.cache {
            Some(_) => Some((alias.to_string(), property.to_string(), value.to_string())),
            None => None,
        };
        if let (Some(cache), Some(key)) = (state.cache.as_mut(), key.as_ref()) {
            if let Some(name) = cache.get(key) {
                return name.clone();
            }
        }
        let n = state.next;
        state.next += 1;
        let name = format!("param_{alias}_{}_{n}", sanitize(property));
        if let (Some(cache), Some(key)) = (state.cache.as_mut(), key) {
            cache.put(key, name.clone());
        }
        name
    }

    /// Number of names issued since creation or the last reset.
    pub fn issued(&self) -> u64 {
        self.state.lock().next
    }

    pub fn cached_entries(&self) -> usize {
        self.state
            .lock()
            .cache
            .as_ref()
            .map(|cache| cache.len())
            .unwrap_or(0)
    }

    /// Restarts the sequence and clears the cache. Only safe once no fragment
    /// minted by this allocator will be composed with new ones.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.next = 0;
        if let Some(cache) = state.cache.as_mut() {
            cache.clear();
        }
    }

    fn next(&self) -> u64 {
        let mut state = self.state.lock();
        let n = state.next;
        state.next += 1;
        n
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_lower = true;
        } else {
            out.push('_');
            prev_lower = false;
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'n');
    }
    out
}

fn sanitize(property: &str) -> String {
    property
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
