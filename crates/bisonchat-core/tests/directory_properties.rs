//! Property-based tests for the directory.
//!
//! These check invariants that must hold for every sequence of operations:
//! DM edges stay symmetric, unregistering leaves no references behind, and
//! room creation is idempotent.

use bisonchat_core::{ClientHandle, DEFAULT_ROOM, Directory, UserId};
use proptest::prelude::*;

const USER_POOL: u64 = 6;
const ROOMS: [&str; 4] = ["atrium", "devs", "ops", "random"];

/// One step applied to the directory. Ids index into a small pool so the
/// generated sequences actually collide on users and rooms.
#[derive(Debug, Clone)]
enum Op {
    Join(u64, usize),
    Leave(u64, usize),
    Connect(u64, u64),
    Disconnect(u64, u64),
    Rename(u64, String),
    Unregister(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let user = 1..=USER_POOL;
    let room = 0..ROOMS.len();
    prop_oneof![
        (user.clone(), room.clone()).prop_map(|(u, r)| Op::Join(u, r)),
        (user.clone(), room).prop_map(|(u, r)| Op::Leave(u, r)),
        (user.clone(), 1..=USER_POOL).prop_map(|(a, b)| Op::Connect(a, b)),
        (user.clone(), 1..=USER_POOL).prop_map(|(a, b)| Op::Disconnect(a, b)),
        (user.clone(), "[a-z]{1,8}").prop_map(|(u, n)| Op::Rename(u, n)),
        user.prop_map(Op::Unregister),
    ]
}

/// Build a directory with the whole user pool registered. The receivers
/// are returned so the outbound queues stay alive during the run.
fn populated() -> (Directory, Vec<tokio::sync::mpsc::UnboundedReceiver<bisonchat_core::Outbound>>)
{
    let dir = Directory::new();
    let mut receivers = Vec::new();
    for id in 1..=USER_POOL {
        let (handle, rx) = ClientHandle::new(id);
        dir.register(handle, format!("guest{id}"));
        receivers.push(rx);
    }
    (dir, receivers)
}

fn apply(dir: &Directory, op: &Op) {
    match op {
        Op::Join(u, r) => dir.join_room(*u, ROOMS[*r]),
        Op::Leave(u, r) => {
            dir.leave_room(*u, ROOMS[*r]);
        },
        Op::Connect(a, b) => dir.connect_dm(*a, *b),
        Op::Disconnect(a, b) => dir.disconnect_dm(*a, *b),
        Op::Rename(u, name) => dir.rename(*u, name.clone()),
        Op::Unregister(u) => dir.unregister(*u),
    }
}

fn live_users(dir: &Directory) -> Vec<UserId> {
    dir.list_users().into_iter().map(|(_, id)| id).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a DM edge is always observed from both ends or neither.
    #[test]
    fn prop_dm_links_stay_symmetric(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (dir, _receivers) = populated();

        for op in &ops {
            apply(&dir, op);
            for a in 1..=USER_POOL {
                for b in 1..=USER_POOL {
                    prop_assert_eq!(
                        dir.is_dm_connected(a, b),
                        dir.is_dm_connected(b, a),
                        "asymmetric edge between {} and {}", a, b
                    );
                }
            }
        }
    }

    /// Property: after unregistering, nothing in the directory references
    /// the user: not the listing, no room membership, no DM edge.
    #[test]
    fn prop_unregister_leaves_no_references(
        ops in prop::collection::vec(op_strategy(), 0..40),
        target in 1..=USER_POOL,
    ) {
        let (dir, _receivers) = populated();
        for op in &ops {
            apply(&dir, op);
        }

        dir.unregister(target);

        prop_assert!(!live_users(&dir).contains(&target));
        for room in dir.list_rooms() {
            prop_assert!(!dir.leave_room(target, &room), "membership left in {}", room);
        }
        for other in 1..=USER_POOL {
            prop_assert!(!dir.is_dm_connected(other, target));
            prop_assert!(!dir.is_dm_connected(target, other));
        }
    }

    /// Property: room creation is idempotent and rooms are never deleted,
    /// so the listing holds exactly one entry per distinct name ever
    /// referenced, in first-reference order.
    #[test]
    fn prop_room_listing_is_duplicate_free(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (dir, _receivers) = populated();
        for op in &ops {
            apply(&dir, op);
        }

        let listed = dir.list_rooms();
        let mut deduped = listed.clone();
        deduped.dedup();
        prop_assert_eq!(&listed, &deduped);
        prop_assert!(listed.first().map(String::as_str) == Some(DEFAULT_ROOM));

        let before = listed.len();
        for room in &listed {
            dir.create_room(room);
        }
        prop_assert_eq!(dir.list_rooms().len(), before);
    }

    /// Property: the user listing tracks exactly the registered-and-not-
    /// unregistered pool, in registration order.
    #[test]
    fn prop_user_listing_matches_survivors(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (dir, _receivers) = populated();
        let mut gone = Vec::new();
        for op in &ops {
            apply(&dir, op);
            if let Op::Unregister(u) = op {
                if !gone.contains(u) {
                    gone.push(*u);
                }
            }
        }

        let expected: Vec<UserId> = (1..=USER_POOL).filter(|id| !gone.contains(id)).collect();
        prop_assert_eq!(live_users(&dir), expected);
    }
}
