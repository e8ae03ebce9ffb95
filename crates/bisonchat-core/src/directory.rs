//! Shared directory of users, rooms and DM-links.
//!
//! The directory is the single piece of state every session worker touches.
//! It maintains three related registries: users (display name, outbound
//! handle, DM adjacency), rooms (name to member set, created lazily and
//! never deleted), and the DM-links implied by the per-user adjacency sets.
//!
//! Access is governed by a readers-writer discipline: every public
//! operation acquires exactly one read or write section on the inner lock,
//! and composite mutations (a DM edge touches two users) commit inside a
//! single write section so readers never observe a half-applied edge.
//! Operations are synchronous and never hold the lock across an await
//! point; outbound delivery goes through unbounded queues, so enqueueing
//! under a read guard cannot block.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::handle::{ClientHandle, UserId};

/// Room every user is joined to on registration. Created when the
/// directory is constructed and recreated on demand if a shutdown cleared
/// it.
pub const DEFAULT_ROOM: &str = "Lobby";

/// One registered user.
#[derive(Debug)]
struct User {
    /// Display name. Not unique: `login` performs no uniqueness check.
    name: String,
    /// Outbound handle for replies, fan-out and forced close.
    handle: ClientHandle,
    /// DM adjacency. An edge exists iff both endpoints list each other.
    dm_peers: HashSet<UserId>,
}

/// Registries behind the lock.
#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Registration order for `list_users`.
    user_order: Vec<UserId>,
    rooms: HashMap<String, HashSet<UserId>>,
    /// Creation order for `list_rooms`. Append-only: rooms are never
    /// deleted outside `shutdown_all`.
    room_order: Vec<String>,
}

impl State {
    /// Idempotent room insert.
    fn ensure_room(&mut self, name: &str) {
        if !self.rooms.contains_key(name) {
            self.rooms.insert(name.to_string(), HashSet::new());
            self.room_order.push(name.to_string());
        }
    }
}

/// The shared aggregate of users, rooms and DM-links plus the
/// synchronization discipline guarding them.
///
/// All mutation funnels through this operation set, so the chat semantics
/// are unit-testable without a network layer.
#[derive(Debug)]
pub struct Directory {
    inner: RwLock<State>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Create a directory with the default room already present.
    pub fn new() -> Self {
        let mut state = State::default();
        state.ensure_room(DEFAULT_ROOM);
        Self { inner: RwLock::new(state) }
    }

    /// Register a user for a freshly accepted connection and auto-join it
    /// to the default room. Never fails; the connection handle is assumed
    /// unique.
    pub fn register(&self, handle: ClientHandle, default_name: impl Into<String>) -> UserId {
        let id = handle.id();
        let name = default_name.into();
        let mut state = self.inner.write();

        state.users.insert(id, User { name: name.clone(), handle, dm_peers: HashSet::new() });
        state.user_order.push(id);
        state.ensure_room(DEFAULT_ROOM);
        if let Some(members) = state.rooms.get_mut(DEFAULT_ROOM) {
            members.insert(id);
        }

        tracing::debug!(id, %name, "user registered");
        id
    }

    /// Remove a user from every room, sever every DM-link referencing it
    /// and drop its record. Unregistering an absent id is a no-op, so
    /// exactly one removal takes effect per disconnect even when a session
    /// worker races the shutdown coordinator.
    pub fn unregister(&self, id: UserId) {
        let mut state = self.inner.write();

        let Some(user) = state.users.remove(&id) else {
            return;
        };
        state.user_order.retain(|&uid| uid != id);

        for members in state.rooms.values_mut() {
            members.remove(&id);
        }
        for peer in user.dm_peers {
            if let Some(other) = state.users.get_mut(&peer) {
                other.dm_peers.remove(&id);
            }
        }

        tracing::debug!(id, "user unregistered");
    }

    /// Set a user's display name. No uniqueness check: two connections may
    /// present the same name, and name lookups then resolve to the
    /// longest-registered match.
    pub fn rename(&self, id: UserId, new_name: impl Into<String>) {
        let mut state = self.inner.write();
        if let Some(user) = state.users.get_mut(&id) {
            user.name = new_name.into();
        }
    }

    /// Find a user id by display name, scanning in registration order.
    pub fn find_by_name(&self, name: &str) -> Option<UserId> {
        let state = self.inner.read();
        state
            .user_order
            .iter()
            .copied()
            .find(|id| state.users.get(id).is_some_and(|u| u.name == name))
    }

    /// Display name for an id. `None` if the user is gone.
    pub fn name_of(&self, id: UserId) -> Option<String> {
        self.inner.read().users.get(&id).map(|u| u.name.clone())
    }

    /// Create a room. Re-creating an existing name is a no-op.
    pub fn create_room(&self, name: &str) {
        self.inner.write().ensure_room(name);
    }

    /// Add a user to a room, creating the room if absent. Joining a room
    /// the user is already in is a no-op.
    pub fn join_room(&self, id: UserId, room: &str) {
        let mut state = self.inner.write();
        if !state.users.contains_key(&id) {
            return;
        }
        state.ensure_room(room);
        if let Some(members) = state.rooms.get_mut(room) {
            members.insert(id);
        }
    }

    /// Remove a user's membership in a room. Returns whether the user was
    /// a member. The room record itself persists.
    pub fn leave_room(&self, id: UserId, room: &str) -> bool {
        let mut state = self.inner.write();
        state.rooms.get_mut(room).is_some_and(|members| members.remove(&id))
    }

    /// Room names in creation order.
    pub fn list_rooms(&self) -> Vec<String> {
        self.inner.read().room_order.clone()
    }

    /// `(name, id)` pairs in registration order.
    pub fn list_users(&self) -> Vec<(String, UserId)> {
        let state = self.inner.read();
        state
            .user_order
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (u.name.clone(), *id)))
            .collect()
    }

    /// Establish a DM-link between two users. Both directions commit in
    /// one write section. No-op if either user is absent or `a == b`.
    pub fn connect_dm(&self, a: UserId, b: UserId) {
        if a == b {
            return;
        }
        let mut state = self.inner.write();
        if !state.users.contains_key(&a) || !state.users.contains_key(&b) {
            return;
        }
        if let Some(user) = state.users.get_mut(&a) {
            user.dm_peers.insert(b);
        }
        if let Some(user) = state.users.get_mut(&b) {
            user.dm_peers.insert(a);
        }
    }

    /// Remove a DM-link, both directions in one write section. No-op if
    /// either user is absent.
    pub fn disconnect_dm(&self, a: UserId, b: UserId) {
        let mut state = self.inner.write();
        if let Some(user) = state.users.get_mut(&a) {
            user.dm_peers.remove(&b);
        }
        if let Some(user) = state.users.get_mut(&b) {
            user.dm_peers.remove(&a);
        }
    }

    /// Whether a DM-link exists between two users.
    pub fn is_dm_connected(&self, a: UserId, b: UserId) -> bool {
        self.inner.read().users.get(&a).is_some_and(|u| u.dm_peers.contains(&b))
    }

    /// Whether some room has both users as members.
    pub fn share_room(&self, a: UserId, b: UserId) -> bool {
        self.inner
            .read()
            .rooms
            .values()
            .any(|members| members.contains(&a) && members.contains(&b))
    }

    /// Fan out a chat message from `sender` to every other user reachable
    /// over a DM-link or a shared room. The recipient set is computed and
    /// the message enqueued under one read section, so delivery reflects
    /// only fully committed relationship writes. A user reachable by both
    /// channels receives the message exactly once. Returns the number of
    /// recipients reached.
    pub fn broadcast(&self, sender: UserId, text: &str) -> usize {
        let state = self.inner.read();
        let Some(from) = state.users.get(&sender) else {
            return 0;
        };
        let message = format!("\n::{}> {}\nchat>", from.name, text);

        let mut delivered = 0;
        for (&id, user) in &state.users {
            if id == sender {
                continue;
            }
            let dm_linked = from.dm_peers.contains(&id);
            let shares_room = state
                .rooms
                .values()
                .any(|members| members.contains(&sender) && members.contains(&id));
            if (dm_linked || shares_room) && user.handle.send(message.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver text to one user's connection. Best-effort.
    pub fn send_to(&self, id: UserId, text: impl Into<String>) -> bool {
        self.inner.read().users.get(&id).is_some_and(|u| u.handle.send(text.into()))
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Shutdown coordinator path: under exclusive access, close every live
    /// connection handle and clear all three registries. Session workers
    /// blocked on reads observe the close as a normal disconnect.
    pub fn shutdown_all(&self) {
        let mut state = self.inner.write();
        let count = state.users.len();
        for user in state.users.values() {
            user.handle.close();
        }
        state.users.clear();
        state.user_order.clear();
        state.rooms.clear();
        state.room_order.clear();

        tracing::info!(connections = count, "directory cleared for shutdown");
    }
}
