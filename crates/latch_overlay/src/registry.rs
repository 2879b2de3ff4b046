//! Dismiss Registry - document-level outside-click and Escape listeners
//!
//! Every open overlay holds exactly one [`DismissSubscription`]. The
//! subscription is a guard: dropping it removes the listener, so an overlay
//! that closes, is closed by its host, or is dropped while open can never
//! leave a stale listener behind.
//!
//! Entries are kept in registration order; the last registered overlay is the
//! topmost one. A host that owns many overlays can ask the registry which of
//! them a pointer-down or Escape should close via [`DismissRegistryExt::route`].
//!
//! # Example
//!
//! ```rust
//! use latch_core::NodeTree;
//! use latch_overlay::registry::{dismiss_registry, DismissEvent, DismissPolicy, DismissRegion, DismissRegistryExt};
//!
//! let mut tree = NodeTree::new();
//! let root = tree.create_root();
//! let panel = tree.create_child(root).unwrap();
//!
//! let registry = dismiss_registry();
//! let sub = registry.subscribe(DismissRegion::from_nodes([panel]), DismissPolicy::default());
//! assert_eq!(registry.listener_count(), 1);
//!
//! let closing = registry.route(DismissEvent::PointerDown(root), &tree);
//! assert_eq!(closing.as_slice(), &[sub.handle()]);
//!
//! drop(sub);
//! assert_eq!(registry.listener_count(), 0);
//! ```

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use smallvec::SmallVec;

use latch_core::{Containment, NodeId};

// =============================================================================
// DismissHandle
// =============================================================================

/// Handle to a registered dismiss listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DismissHandle(u64);

impl DismissHandle {
    /// Reconstruct a handle from a raw ID
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID
    pub fn id(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// DismissRegion / DismissPolicy
// =============================================================================

/// Nodes that count as "inside" an overlay
///
/// Usually the anchor (trigger) and the floating panel. Nested submenus also
/// carry their ancestors' nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DismissRegion {
    nodes: SmallVec<[NodeId; 4]>,
}

impl DismissRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut region = Self::new();
        for node in nodes {
            region.insert(node);
        }
        region
    }

    /// Add a node (duplicates are ignored)
    pub fn insert(&mut self, node: NodeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    /// Add every node of another region
    pub fn extend_from(&mut self, other: &DismissRegion) {
        for node in &other.nodes {
            self.insert(*node);
        }
    }

    pub fn remove(&mut self, node: NodeId) {
        self.nodes.retain(|n| *n != node);
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when `target` lies in the subtree of any region node
    ///
    /// An empty region contains nothing, so every pointer-down is outside.
    pub fn contains<C: Containment + ?Sized>(&self, target: NodeId, containment: &C) -> bool {
        self.nodes
            .iter()
            .any(|node| containment.contains(*node, target))
    }
}

/// Which dismissal sources an overlay listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DismissPolicy {
    /// Close on Escape
    pub escape: bool,
    /// Close on pointer-down outside the region
    pub outside_pointer: bool,
}

impl Default for DismissPolicy {
    fn default() -> Self {
        Self {
            escape: true,
            outside_pointer: true,
        }
    }
}

impl DismissPolicy {
    /// Neither Escape nor outside clicks close the overlay (inline panels)
    pub fn none() -> Self {
        Self {
            escape: false,
            outside_pointer: false,
        }
    }
}

/// An event the registry can route
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissEvent {
    PointerDown(NodeId),
    Escape,
}

// =============================================================================
// DismissRegistryInner
// =============================================================================

#[derive(Debug)]
struct DismissEntry {
    region: DismissRegion,
    policy: DismissPolicy,
    label: &'static str,
}

/// Inner state of the dismiss registry
#[derive(Debug)]
pub struct DismissRegistryInner {
    /// Live listeners in registration order (last = topmost)
    entries: IndexMap<DismissHandle, DismissEntry>,
    /// Next handle ID
    next_id: u64,
}

impl DismissRegistryInner {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Add a listener
    pub fn register(
        &mut self,
        region: DismissRegion,
        policy: DismissPolicy,
        label: &'static str,
    ) -> DismissHandle {
        let handle = DismissHandle(self.next_id);
        self.next_id += 1;

        self.entries.insert(
            handle,
            DismissEntry {
                region,
                policy,
                label,
            },
        );

        tracing::debug!(
            "DismissRegistry::register - {} listener {:?}, now {} active",
            label,
            handle,
            self.entries.len()
        );

        handle
    }

    /// Remove a listener
    pub fn unregister(&mut self, handle: DismissHandle) -> bool {
        match self.entries.shift_remove(&handle) {
            Some(entry) => {
                tracing::debug!(
                    "DismissRegistry::unregister - {} listener {:?}, {} remaining",
                    entry.label,
                    handle,
                    self.entries.len()
                );
                true
            }
            None => false,
        }
    }

    /// Replace a listener's region (anchor or panel moved)
    pub fn set_region(&mut self, handle: DismissHandle, region: DismissRegion) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.region = region;
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, handle: DismissHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Topmost listener that accepts Escape
    pub fn top_escape(&self) -> Option<DismissHandle> {
        self.entries
            .iter()
            .rev()
            .find(|(_, e)| e.policy.escape)
            .map(|(h, _)| *h)
    }

    /// Overlays that must close for `event`, topmost first
    pub fn route<C: Containment + ?Sized>(
        &self,
        event: DismissEvent,
        containment: &C,
    ) -> SmallVec<[DismissHandle; 4]> {
        match event {
            DismissEvent::PointerDown(target) => self
                .entries
                .iter()
                .rev()
                .filter(|(_, e)| e.policy.outside_pointer && !e.region.contains(target, containment))
                .map(|(h, _)| *h)
                .collect(),
            DismissEvent::Escape => self.top_escape().into_iter().collect(),
        }
    }
}

impl Default for DismissRegistryInner {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// DismissRegistry
// =============================================================================

/// Thread-safe dismiss registry, one per host document
pub type DismissRegistry = Arc<Mutex<DismissRegistryInner>>;

/// Create a new dismiss registry
pub fn dismiss_registry() -> DismissRegistry {
    Arc::new(Mutex::new(DismissRegistryInner::new()))
}

/// Extension trait for [`DismissRegistry`]
pub trait DismissRegistryExt {
    /// Register a listener and return its guard
    fn subscribe(&self, region: DismissRegion, policy: DismissPolicy) -> DismissSubscription;
    /// Register a listener with a label used in logs
    fn subscribe_labeled(
        &self,
        region: DismissRegion,
        policy: DismissPolicy,
        label: &'static str,
    ) -> DismissSubscription;
    /// Overlays that must close for `event`
    fn route(&self, event: DismissEvent, containment: &dyn Containment)
        -> SmallVec<[DismissHandle; 4]>;
    /// Number of live listeners
    fn listener_count(&self) -> usize;
    /// Check if a listener is still registered
    fn is_registered(&self, handle: DismissHandle) -> bool;
}

impl DismissRegistryExt for DismissRegistry {
    fn subscribe(&self, region: DismissRegion, policy: DismissPolicy) -> DismissSubscription {
        self.subscribe_labeled(region, policy, "overlay")
    }

    fn subscribe_labeled(
        &self,
        region: DismissRegion,
        policy: DismissPolicy,
        label: &'static str,
    ) -> DismissSubscription {
        let handle = self.lock().unwrap().register(region, policy, label);
        DismissSubscription {
            registry: Arc::clone(self),
            handle,
        }
    }

    fn route(
        &self,
        event: DismissEvent,
        containment: &dyn Containment,
    ) -> SmallVec<[DismissHandle; 4]> {
        self.lock().unwrap().route(event, containment)
    }

    fn listener_count(&self) -> usize {
        self.lock().unwrap().len()
    }

    fn is_registered(&self, handle: DismissHandle) -> bool {
        self.lock().unwrap().is_registered(handle)
    }
}

// =============================================================================
// DismissSubscription
// =============================================================================

/// Scoped listener registration
///
/// Removes its registry entry when dropped.
#[derive(Debug)]
pub struct DismissSubscription {
    registry: DismissRegistry,
    handle: DismissHandle,
}

impl DismissSubscription {
    pub fn handle(&self) -> DismissHandle {
        self.handle
    }

    /// Update the region this listener tests against
    pub fn set_region(&self, region: DismissRegion) {
        self.registry.lock().unwrap().set_region(self.handle, region);
    }
}

impl Drop for DismissSubscription {
    fn drop(&mut self) {
        // A poisoned registry is already broken; don't panic again in drop
        if let Ok(mut inner) = self.registry.lock() {
            inner.unregister(self.handle);
        }
    }
}
