//! Per-namespace round-robin dispatch over a discovered service list
//! (§4.7 "Balance").
//!
//! Grounded on `dmp/balance.go`: one mutex guards a cursor per namespace;
//! each dispatch advances it and wraps back to zero once it runs past the
//! current candidate count. The original indexes unconditionally and
//! panics on an empty slice; here an empty candidate list is the caller's
//! concern (`Router::request` already returns `NamespaceNotFound` before
//! ever reaching `Balance`), so `dispatch` returns `None` instead.

use dmp_discovery::Service;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct Balance {
    cursors: Mutex<HashMap<String, usize>>,
}

impl Default for Balance {
    fn default() -> Self {
        Self::new()
    }
}

impl Balance {
    pub fn new() -> Self {
        Balance {
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Pick the next candidate for `namespace`, advancing its cursor.
    pub fn dispatch<'a>(&self, namespace: &str, services: &'a [Service]) -> Option<&'a Service> {
        if services.is_empty() {
            return None;
        }

        let mut cursors = self.cursors.lock().unwrap();
        let index = cursors.entry(namespace.to_string()).or_insert(0);

        if *index >= services.len() {
            *index = 0;
        }

        let chosen = &services[*index];
        *index += 1;
        Some(chosen)
    }
}
