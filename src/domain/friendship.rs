use chrono::{DateTime, Utc};
use std::fmt;

use crate::db::models::{Account, FriendEdge};

/// Relationship between an ordered pair of accounts, derived from both
/// edge lists. A pending request lives as a single edge on the
/// recipient's list; a confirmed friendship as one edge on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipState {
    None,
    /// `a` sent a request; the pending edge sits on `b`'s list.
    PendingFromA,
    /// `b` sent a request; the pending edge sits on `a`'s list.
    PendingFromB,
    Friends,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendshipError {
    AlreadyLinked,
    NoPendingRequest,
    NotLinked,
}

impl fmt::Display for FriendshipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyLinked => write!(f, "already notified or already friends"),
            Self::NoPendingRequest => write!(f, "no pending request from this account"),
            Self::NotLinked => write!(f, "not friends and no pending request"),
        }
    }
}

impl std::error::Error for FriendshipError {}

/// What `reject_or_remove` actually deleted, so callers persist only the
/// accounts that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub from_me: bool,
    pub from_other: bool,
}

pub fn relationship(a: &Account, b: &Account) -> RelationshipState {
    let on_a = a.friends.iter().find(|e| e.identifier == b.id);
    let on_b = b.friends.iter().find(|e| e.identifier == a.id);

    match (on_a, on_b) {
        (None, None) => RelationshipState::None,
        (Some(edge), None) if !edge.friend => RelationshipState::PendingFromB,
        (None, Some(edge)) if !edge.friend => RelationshipState::PendingFromA,
        // Anything else is at least half-confirmed; the only way out is
        // reject_or_remove, so classify it as Friends.
        _ => RelationshipState::Friends,
    }
}

/// Send a friend request: prepend a pending edge to the recipient's list
/// with a snapshot of the sender's display fields. Requires no edge on
/// either side.
pub fn send_notification(
    from: &Account,
    to: &mut Account,
    now: DateTime<Utc>,
) -> Result<(), FriendshipError> {
    if relationship(from, to) != RelationshipState::None {
        return Err(FriendshipError::AlreadyLinked);
    }

    to.friends.insert(
        0,
        FriendEdge {
            identifier: from.id.clone(),
            name: from.name.clone(),
            profile_image: from.profile_image.clone(),
            notification: true,
            friend: false,
            created_at: now,
        },
    );

    Ok(())
}

/// Accept a pending request from `from`: the pending edge on `me` flips
/// to a confirmed friendship in place, and `from` gains the mirror edge.
/// Both accounts must be persisted by the caller.
pub fn accept_notification(
    me: &mut Account,
    from: &mut Account,
    now: DateTime<Utc>,
) -> Result<(), FriendshipError> {
    let pending_idx = me
        .friends
        .iter()
        .position(|e| e.identifier == from.id && !e.friend)
        .ok_or(FriendshipError::NoPendingRequest)?;

    from.friends.insert(
        0,
        FriendEdge {
            identifier: me.id.clone(),
            name: me.name.clone(),
            profile_image: me.profile_image.clone(),
            notification: true,
            friend: true,
            created_at: now,
        },
    );

    let edge = &mut me.friends[pending_idx];
    edge.notification = false;
    edge.friend = true;

    Ok(())
}

/// Decline a pending request or dissolve a friendship. Each side is
/// inspected independently; whichever edges exist are removed (first
/// match only). Fails when neither side references the other.
pub fn reject_or_remove(me: &mut Account, other: &mut Account) -> Result<Removed, FriendshipError> {
    let on_me = me.friends.iter().position(|e| e.identifier == other.id);
    let on_other = other.friends.iter().position(|e| e.identifier == me.id);

    if on_me.is_none() && on_other.is_none() {
        return Err(FriendshipError::NotLinked);
    }

    if let Some(idx) = on_me {
        me.friends.remove(idx);
    }
    if let Some(idx) = on_other {
        other.friends.remove(idx);
    }

    Ok(Removed {
        from_me: on_me.is_some(),
        from_other: on_other.is_some(),
    })
}

/// Refresh the profile snapshot on every edge of `owner` that references
/// `account_id`. Returns true when something changed, so the caller can
/// skip the save otherwise.
pub fn refresh_edge_snapshots(
    owner: &mut Account,
    account_id: &str,
    profile_image: Option<&str>,
) -> bool {
    let mut changed = false;
    for edge in owner
        .friends
        .iter_mut()
        .filter(|e| e.identifier == account_id)
    {
        if edge.profile_image.as_deref() != profile_image {
            edge.profile_image = profile_image.map(str::to_string);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
            profile_image: None,
            banner_image: None,
            friends: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_accounts_have_no_relationship() {
        let a = account("a1", "Ana");
        let b = account("b1", "Beto");
        assert_eq!(relationship(&a, &b), RelationshipState::None);
    }

    #[test]
    fn send_notification_adds_one_pending_edge_to_recipient() {
        let a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();

        assert_eq!(b.friends.len(), 1);
        let edge = &b.friends[0];
        assert_eq!(edge.identifier, "a1");
        assert_eq!(edge.name, "Ana");
        assert!(edge.notification);
        assert!(!edge.friend);

        // The sender's own list is untouched
        assert!(a.friends.is_empty());
        assert_eq!(relationship(&a, &b), RelationshipState::PendingFromA);
    }

    #[test]
    fn send_notification_twice_is_a_conflict() {
        let a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();
        let result = send_notification(&a, &mut b, Utc::now());
        assert_eq!(result, Err(FriendshipError::AlreadyLinked));
        assert_eq!(b.friends.len(), 1);
    }

    #[test]
    fn send_notification_rejected_when_roles_reverse() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();

        // Beto asking Ana back hits the same precondition
        let result = send_notification(&b, &mut a, Utc::now());
        assert_eq!(result, Err(FriendshipError::AlreadyLinked));
    }

    #[test]
    fn accept_confirms_both_sides() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();
        accept_notification(&mut b, &mut a, Utc::now()).unwrap();

        // Ana's list gained the mirror edge
        assert_eq!(a.friends.len(), 1);
        assert_eq!(a.friends[0].identifier, "b1");
        assert!(a.friends[0].friend);

        // Beto's pending edge flipped in place
        assert_eq!(b.friends.len(), 1);
        assert_eq!(b.friends[0].identifier, "a1");
        assert!(b.friends[0].friend);
        assert!(!b.friends[0].notification);

        assert_eq!(relationship(&a, &b), RelationshipState::Friends);
    }

    #[test]
    fn accept_without_request_is_a_conflict() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        let result = accept_notification(&mut b, &mut a, Utc::now());
        assert_eq!(result, Err(FriendshipError::NoPendingRequest));
    }

    #[test]
    fn accept_twice_is_a_conflict() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();
        accept_notification(&mut b, &mut a, Utc::now()).unwrap();

        let result = accept_notification(&mut b, &mut a, Utc::now());
        assert_eq!(result, Err(FriendshipError::NoPendingRequest));
    }

    #[test]
    fn reject_pending_request_removes_the_single_edge() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();

        let removed = reject_or_remove(&mut b, &mut a).unwrap();
        assert_eq!(
            removed,
            Removed {
                from_me: true,
                from_other: false
            }
        );
        assert!(a.friends.is_empty());
        assert!(b.friends.is_empty());
        assert_eq!(relationship(&a, &b), RelationshipState::None);
    }

    #[test]
    fn unfriend_removes_one_edge_from_each_side() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();
        accept_notification(&mut b, &mut a, Utc::now()).unwrap();

        let removed = reject_or_remove(&mut a, &mut b).unwrap();
        assert_eq!(
            removed,
            Removed {
                from_me: true,
                from_other: true
            }
        );
        assert!(a.friends.is_empty());
        assert!(b.friends.is_empty());
    }

    #[test]
    fn reject_with_no_edges_is_a_conflict() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        let result = reject_or_remove(&mut a, &mut b);
        assert_eq!(result, Err(FriendshipError::NotLinked));
    }

    #[test]
    fn reject_removes_only_the_first_matching_edge() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        // Duplicate edges are not supposed to exist, but removal still
        // takes only the first match.
        send_notification(&a, &mut b, Utc::now()).unwrap();
        let duplicate = b.friends[0].clone();
        b.friends.push(duplicate);

        reject_or_remove(&mut b, &mut a).unwrap();
        assert_eq!(b.friends.len(), 1);
    }

    #[test]
    fn request_then_removal_can_restart() {
        let mut a = account("a1", "Ana");
        let mut b = account("b1", "Beto");

        send_notification(&a, &mut b, Utc::now()).unwrap();
        reject_or_remove(&mut b, &mut a).unwrap();

        // Back to None, so a fresh request goes through
        send_notification(&b, &mut a, Utc::now()).unwrap();
        assert_eq!(relationship(&a, &b), RelationshipState::PendingFromB);
    }

    #[test]
    fn refresh_edge_snapshots_updates_matching_edges_only() {
        let a = account("a1", "Ana");
        let mut b = account("b1", "Beto");
        let c = account("c1", "Carla");

        send_notification(&c, &mut b, Utc::now()).unwrap();
        send_notification(&a, &mut b, Utc::now()).unwrap();

        let changed = refresh_edge_snapshots(&mut b, "a1", Some("images/ana-v2.png"));
        assert!(changed);

        let ana_edge = b.friends.iter().find(|e| e.identifier == "a1").unwrap();
        assert_eq!(ana_edge.profile_image.as_deref(), Some("images/ana-v2.png"));

        let carla_edge = b.friends.iter().find(|e| e.identifier == "c1").unwrap();
        assert_eq!(carla_edge.profile_image, None);

        // Already current: nothing to save
        assert!(!refresh_edge_snapshots(&mut b, "a1", Some("images/ana-v2.png")));
    }
}
