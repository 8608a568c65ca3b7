use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, VecDeque},
    fmt,
    str::FromStr,
};
use uuid::Uuid;

use crate::model::Route;

pub const DEFAULT_CAPACITY: usize = 1024;

/// Identifier handed to the client with a submitted route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(Uuid);

impl RouteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RouteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<RouteId, Route>,
    order: VecDeque<RouteId>,
}

/// Submitted routes by id, so chart updates resolve the route they were
/// rendered for. Holds at most `capacity` routes; the oldest go first.
#[derive(Debug)]
pub struct RouteStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RouteStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&self, route: Route) -> RouteId {
        let id = RouteId::new();
        let mut inner = self.inner.write();

        while inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.routes.remove(&oldest);
                tracing::debug!(route = %oldest, "evicted route");
            }
        }

        inner.routes.insert(id, route);
        inner.order.push_back(id);
        id
    }

    pub fn get(&self, id: &RouteId) -> Option<Route> {
        self.inner.read().routes.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
