//! Overlay Disclosure - open/closed state with outside-click and Escape dismissal
//!
//! ```text
//!            Open
//!   Closed ────────▶ Open
//!     ▲                │ Close / Escape / OutsidePointer / Commit
//!     └────────────────┘
//! ```
//!
//! Entering `Open` acquires a [`DismissSubscription`]; every path back to
//! `Closed` releases it. Dropping an open disclosure releases it too.
//!
//! The open flag may be controlled by the host (see [`ValueSource`]). In that
//! case transitions only *propose* a new flag through `on_open_change`, and
//! the subscription follows whatever the host's flag says afterwards.
//!
//! # Example
//!
//! ```rust
//! use latch_core::NodeTree;
//! use latch_overlay::disclosure::{CloseReason, OverlayDisclosure};
//! use latch_overlay::registry::{dismiss_registry, DismissRegistryExt};
//!
//! let mut tree = NodeTree::new();
//! let body = tree.create_root();
//! let trigger = tree.create_child(body).unwrap();
//! let panel = tree.create_child(body).unwrap();
//!
//! let registry = dismiss_registry();
//! let mut overlay = OverlayDisclosure::new(registry.clone())
//!     .anchor(trigger)
//!     .panel(panel);
//!
//! overlay.open();
//! assert_eq!(registry.listener_count(), 1);
//!
//! assert!(!overlay.handle_pointer_down(panel, &tree));
//! assert!(overlay.handle_pointer_down(body, &tree));
//! assert_eq!(overlay.last_close_reason(), Some(CloseReason::OutsidePointer));
//! assert_eq!(registry.listener_count(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use latch_core::{ChangeCallback, Containment, NodeId, StateTransitions, ValueSource};

use crate::registry::{
    DismissHandle, DismissPolicy, DismissRegion, DismissRegistry, DismissRegistryExt,
    DismissSubscription,
};

// =============================================================================
// State machine
// =============================================================================

/// Disclosure state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DisclosureState {
    #[default]
    Closed,
    Open,
}

impl DisclosureState {
    pub fn is_open(&self) -> bool {
        matches!(self, DisclosureState::Open)
    }

    fn from_flag(open: bool) -> Self {
        if open {
            DisclosureState::Open
        } else {
            DisclosureState::Closed
        }
    }
}

/// Disclosure events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisclosureEvent {
    Open,
    Close(CloseReason),
}

/// Why an overlay closed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Programmatic close or trigger toggle
    Explicit,
    /// Escape key
    Escape,
    /// Pointer-down outside the dismiss region
    OutsidePointer,
    /// A single-value commit
    Commit,
}

impl StateTransitions for DisclosureState {
    type Event = DisclosureEvent;

    fn on_event(&self, event: DisclosureEvent) -> Option<Self> {
        use DisclosureState::*;

        match (self, event) {
            (Closed, DisclosureEvent::Open) => Some(Open),
            (Open, DisclosureEvent::Close(_)) => Some(Closed),
            _ => None,
        }
    }
}

// =============================================================================
// OverlayDisclosure
// =============================================================================

/// Open/closed state of one floating panel
pub struct OverlayDisclosure {
    registry: DismissRegistry,
    open: ValueSource<bool>,
    on_open_change: Option<ChangeCallback<bool>>,
    region: DismissRegion,
    policy: DismissPolicy,
    label: &'static str,
    subscription: Option<DismissSubscription>,
    last_close: Option<CloseReason>,
}

impl OverlayDisclosure {
    /// Create a closed, uncontrolled disclosure
    pub fn new(registry: DismissRegistry) -> Self {
        Self {
            registry,
            open: ValueSource::owned(false),
            on_open_change: None,
            region: DismissRegion::new(),
            policy: DismissPolicy::default(),
            label: "overlay",
            subscription: None,
            last_close: None,
        }
    }

    /// Start open (uncontrolled)
    pub fn default_open(mut self, open: bool) -> Self {
        self.open = ValueSource::owned(open);
        self.reconcile();
        self
    }

    /// Read the open flag from the host
    pub fn controlled<F>(mut self, read: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.open = ValueSource::external(read);
        self.reconcile();
        self
    }

    /// Use an explicit value source for the open flag
    pub fn open_source(mut self, source: ValueSource<bool>) -> Self {
        self.open = source;
        self.reconcile();
        self
    }

    /// Set the callback receiving proposed open flags
    pub fn on_open_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.on_open_change = Some(Arc::new(callback));
        self
    }

    /// Add the trigger node to the dismiss region
    pub fn anchor(mut self, node: NodeId) -> Self {
        self.include(node);
        self
    }

    /// Add the panel node to the dismiss region
    pub fn panel(mut self, node: NodeId) -> Self {
        self.include(node);
        self
    }

    /// Include another region (a parent menu's nodes)
    pub fn within(mut self, parent: &DismissRegion) -> Self {
        let mut region = self.region.clone();
        region.extend_from(parent);
        self.set_region(region);
        self
    }

    pub fn policy(mut self, policy: DismissPolicy) -> Self {
        self.policy = policy;
        // Re-register so the registry sees the new policy
        self.subscription = None;
        self.reconcile();
        self
    }

    /// Label used in log output
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn state(&self) -> DisclosureState {
        DisclosureState::from_flag(self.open.read())
    }

    pub fn is_open(&self) -> bool {
        self.open.read()
    }

    pub fn is_controlled(&self) -> bool {
        self.open.is_controlled()
    }

    pub fn region(&self) -> &DismissRegion {
        &self.region
    }

    pub fn dismiss_policy(&self) -> DismissPolicy {
        self.policy
    }

    /// Handle of the live listener, if open
    pub fn subscription_handle(&self) -> Option<DismissHandle> {
        self.subscription.as_ref().map(|s| s.handle())
    }

    /// Reason for the most recent close
    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close
    }

    pub fn registry(&self) -> &DismissRegistry {
        &self.registry
    }

    // -------------------------------------------------------------------------
    // Region updates
    // -------------------------------------------------------------------------

    /// Replace the dismiss region
    pub fn set_region(&mut self, region: DismissRegion) {
        self.region = region;
        if let Some(ref sub) = self.subscription {
            sub.set_region(self.region.clone());
        }
    }

    /// Add a node to the dismiss region
    pub fn include(&mut self, node: NodeId) {
        let mut region = self.region.clone();
        region.insert(node);
        self.set_region(region);
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Open the overlay; no-op when already open
    pub fn open(&mut self) -> bool {
        self.send(DisclosureEvent::Open)
    }

    /// Close the overlay; no-op when already closed
    pub fn close(&mut self, reason: CloseReason) -> bool {
        self.send(DisclosureEvent::Close(reason))
    }

    /// Trigger activation
    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.close(CloseReason::Explicit)
        } else {
            self.open()
        }
    }

    /// Document pointer-down
    ///
    /// Closes when the target is outside every node of the region. Returns
    /// whether a close was requested.
    pub fn handle_pointer_down<C: Containment + ?Sized>(
        &mut self,
        target: NodeId,
        containment: &C,
    ) -> bool {
        self.reconcile();
        if !self.is_open() || !self.policy.outside_pointer {
            return false;
        }
        if self.region.contains(target, containment) {
            return false;
        }
        self.close(CloseReason::OutsidePointer)
    }

    /// Escape key
    pub fn handle_escape(&mut self) -> bool {
        self.reconcile();
        if !self.policy.escape {
            return false;
        }
        self.close(CloseReason::Escape)
    }

    /// Re-read a controlled flag and acquire or release the listener to match
    ///
    /// Hosts that change a controlled flag outside of a widget event call this
    /// (widgets call it before handling every event).
    pub fn sync(&mut self) {
        self.reconcile();
    }

    fn send(&mut self, event: DisclosureEvent) -> bool {
        self.reconcile();
        let current = self.state();
        let Some(next) = current.on_event(event) else {
            return false;
        };

        let open = next.is_open();
        if let DisclosureEvent::Close(reason) = event {
            self.last_close = Some(reason);
        }

        tracing::debug!(
            "OverlayDisclosure::{:?} - {} {:?} -> {:?}{}",
            event,
            self.label,
            current,
            next,
            if self.open.is_controlled() {
                " (proposed)"
            } else {
                ""
            }
        );

        self.open.write(open);
        if let Some(ref cb) = self.on_open_change {
            cb(&open);
        }
        self.reconcile();
        true
    }

    /// Make the subscription match the effective open flag
    fn reconcile(&mut self) {
        let open = self.open.read();
        match (open, self.subscription.is_some()) {
            (true, false) => {
                self.subscription = Some(self.registry.subscribe_labeled(
                    self.region.clone(),
                    self.policy,
                    self.label,
                ));
            }
            (false, true) => {
                self.subscription = None;
            }
            _ => {}
        }
    }
}

impl fmt::Debug for OverlayDisclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayDisclosure")
            .field("label", &self.label)
            .field("open", &self.open)
            .field("region", &self.region)
            .field("policy", &self.policy)
            .field("subscription", &self.subscription_handle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::dismiss_registry;
    use latch_core::NodeTree;
    use std::sync::Mutex;

    struct Fixture {
        tree: NodeTree,
        body: NodeId,
        trigger: NodeId,
        panel: NodeId,
        row: NodeId,
        registry: DismissRegistry,
    }

    fn fixture() -> Fixture {
        let mut tree = NodeTree::new();
        let body = tree.create_root();
        let trigger = tree.create_child(body).unwrap();
        let panel = tree.create_child(body).unwrap();
        let row = tree.create_child(panel).unwrap();
        Fixture {
            tree,
            body,
            trigger,
            panel,
            row,
            registry: dismiss_registry(),
        }
    }

    fn disclosure(f: &Fixture) -> OverlayDisclosure {
        OverlayDisclosure::new(f.registry.clone())
            .anchor(f.trigger)
            .panel(f.panel)
    }

    #[test]
    fn test_open_is_idempotent() {
        let f = fixture();
        let mut overlay = disclosure(&f);

        assert!(overlay.open());
        assert!(!overlay.open());
        assert_eq!(f.registry.listener_count(), 1);
    }

    #[test]
    fn test_inside_pointer_keeps_open() {
        let f = fixture();
        let mut overlay = disclosure(&f);
        overlay.open();

        assert!(!overlay.handle_pointer_down(f.row, &f.tree));
        assert!(!overlay.handle_pointer_down(f.trigger, &f.tree));
        assert!(overlay.is_open());
    }

    #[test]
    fn test_outside_pointer_closes_and_releases() {
        let f = fixture();
        let mut overlay = disclosure(&f);
        overlay.open();

        assert!(overlay.handle_pointer_down(f.body, &f.tree));
        assert!(!overlay.is_open());
        assert_eq!(f.registry.listener_count(), 0);
    }

    #[test]
    fn test_escape_and_commit_close() {
        let f = fixture();
        let mut overlay = disclosure(&f);

        overlay.open();
        assert!(overlay.handle_escape());
        assert_eq!(overlay.last_close_reason(), Some(CloseReason::Escape));
        assert!(!overlay.handle_escape());

        overlay.open();
        assert!(overlay.close(CloseReason::Commit));
        assert_eq!(overlay.last_close_reason(), Some(CloseReason::Commit));
        assert_eq!(f.registry.listener_count(), 0);
    }

    #[test]
    fn test_drop_while_open_releases_listener() {
        let f = fixture();
        {
            let mut overlay = disclosure(&f);
            overlay.open();
            assert_eq!(f.registry.listener_count(), 1);
        }
        assert_eq!(f.registry.listener_count(), 0);
    }

    #[test]
    fn test_toggle_cycles_listener_count() {
        let f = fixture();
        let mut overlay = disclosure(&f);

        for _ in 0..5 {
            overlay.toggle();
            assert_eq!(f.registry.listener_count(), 1);
            overlay.toggle();
            assert_eq!(f.registry.listener_count(), 0);
        }
    }

    #[test]
    fn test_controlled_open_follows_host() {
        let f = fixture();
        let host = Arc::new(Mutex::new(false));
        let proposals = Arc::new(Mutex::new(Vec::new()));

        let host_read = Arc::clone(&host);
        let sink = Arc::clone(&proposals);
        let mut overlay = disclosure(&f)
            .controlled(move || *host_read.lock().unwrap())
            .on_open_change(move |open| sink.lock().unwrap().push(*open));

        // Host ignores the proposal: still closed, no listener
        assert!(overlay.open());
        assert!(!overlay.is_open());
        assert_eq!(f.registry.listener_count(), 0);
        assert_eq!(*proposals.lock().unwrap(), vec![true]);

        // Host opens: listener appears on next sync
        *host.lock().unwrap() = true;
        overlay.sync();
        assert_eq!(f.registry.listener_count(), 1);

        // Escape proposes close; host accepts; listener released
        overlay.handle_escape();
        assert_eq!(*proposals.lock().unwrap(), vec![true, false]);
        *host.lock().unwrap() = false;
        overlay.sync();
        assert_eq!(f.registry.listener_count(), 0);
    }

    #[test]
    fn test_controlled_callback_updates_host_synchronously() {
        let f = fixture();
        let host = Arc::new(Mutex::new(false));
        let read = Arc::clone(&host);
        let write = Arc::clone(&host);
        let mut overlay = disclosure(&f)
            .controlled(move || *read.lock().unwrap())
            .on_open_change(move |open| *write.lock().unwrap() = *open);

        overlay.open();
        assert!(overlay.is_open());
        assert_eq!(f.registry.listener_count(), 1);

        overlay.handle_pointer_down(f.body, &f.tree);
        assert!(!overlay.is_open());
        assert_eq!(f.registry.listener_count(), 0);
    }

    #[test]
    fn test_region_update_reaches_registry() {
        let mut f = fixture();
        let portal = f.tree.create_child(f.body).unwrap();
        let mut overlay = disclosure(&f);
        overlay.open();

        overlay.include(portal);
        assert!(!overlay.handle_pointer_down(portal, &f.tree));
        assert!(f
            .registry
            .route(crate::registry::DismissEvent::PointerDown(portal), &f.tree)
            .is_empty());
    }

    #[test]
    fn test_policy_none_ignores_dismissal() {
        let f = fixture();
        let mut overlay = disclosure(&f).policy(DismissPolicy::none()).default_open(true);

        assert!(!overlay.handle_pointer_down(f.body, &f.tree));
        assert!(!overlay.handle_escape());
        assert!(overlay.is_open());
    }
}
