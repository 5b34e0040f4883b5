//! Chat rooms, memberships and the role hierarchy.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Room ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
  /// A permanent pairing of exactly two users.
  Individual,
  Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
  pub room_id:      Uuid,
  pub kind:         RoomKind,
  pub name:         String,
  pub announcement: String,
  pub avatar_url:   Option<String>,
  pub created_at:   DateTime<Utc>,
}

impl ChatRoom {
  pub fn new(kind: RoomKind, name: impl Into<String>, announcement: impl Into<String>) -> Self {
    Self {
      room_id: Uuid::new_v4(),
      kind,
      name: name.into(),
      announcement: announcement.into(),
      avatar_url: None,
      created_at: Utc::now(),
    }
  }

  pub fn is_individual(&self) -> bool { self.kind == RoomKind::Individual }
}

/// Room-level settings an admin may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomPatch {
  pub name:         Option<String>,
  pub announcement: Option<String>,
  pub avatar_url:   Option<String>,
}

impl RoomPatch {
  pub fn apply(self, room: &mut ChatRoom) {
    if let Some(name) = self.name {
      room.name = name;
    }
    if let Some(announcement) = self.announcement {
      room.announcement = announcement;
    }
    if let Some(avatar_url) = self.avatar_url {
      room.avatar_url = Some(avatar_url);
    }
  }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

/// Membership role. Strictly ordered `Owner > Admin > Member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Owner,
  Admin,
  Member,
}

impl Role {
  fn rank(self) -> u8 {
    match self {
      Role::Owner => 2,
      Role::Admin => 1,
      Role::Member => 0,
    }
  }

  /// Strict precedence; a role never outranks itself.
  pub fn outranks(self, other: Role) -> bool { self.rank() > other.rank() }

  /// Owners and admins may manage room settings and membership.
  pub fn can_manage(self) -> bool { self.rank() >= Role::Admin.rank() }
}

impl PartialOrd for Role {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Role {
  fn cmp(&self, other: &Self) -> Ordering { self.rank().cmp(&other.rank()) }
}

// ─── Membership ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoomMember {
  pub room_id:              Uuid,
  pub user_id:              Uuid,
  pub role:                 Role,
  /// Per-room display name; defaults to the user's profile nickname.
  pub nickname:             String,
  pub is_muted:             bool,
  /// Read cursor. Never moves backwards.
  pub last_read_message_id: i64,
  pub joined_at:            DateTime<Utc>,
}

impl ChatRoomMember {
  pub fn new(room_id: Uuid, user_id: Uuid, role: Role, nickname: impl Into<String>) -> Self {
    Self {
      room_id,
      user_id,
      role,
      nickname: nickname.into(),
      is_muted: false,
      last_read_message_id: 0,
      joined_at: Utc::now(),
    }
  }
}

/// Member fields an operator may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPatch {
  pub role:     Option<Role>,
  pub nickname: Option<String>,
  pub is_muted: Option<bool>,
}

impl MemberPatch {
  pub fn is_empty(&self) -> bool {
    self.role.is_none() && self.nickname.is_none() && self.is_muted.is_none()
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A room together with its full member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetail {
  pub room:    ChatRoom,
  pub members: Vec<ChatRoomMember>,
}

/// One entry of a user's room list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
  pub room:         ChatRoom,
  pub role:         Role,
  pub unread_count: i64,
  pub pinned:       bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_precedence_is_strict() {
    assert!(Role::Owner.outranks(Role::Admin));
    assert!(Role::Owner.outranks(Role::Member));
    assert!(Role::Admin.outranks(Role::Member));
    assert!(!Role::Admin.outranks(Role::Admin));
    assert!(!Role::Member.outranks(Role::Admin));
    assert!(Role::Owner > Role::Member);
  }

  #[test]
  fn only_admins_and_owners_manage() {
    assert!(Role::Owner.can_manage());
    assert!(Role::Admin.can_manage());
    assert!(!Role::Member.can_manage());
  }

  #[test]
  fn room_patch_leaves_unset_fields() {
    let mut room = ChatRoom::new(RoomKind::Group, "hikers", "weekly trips");
    RoomPatch { announcement: Some("monthly trips".into()), ..Default::default() }
      .apply(&mut room);
    assert_eq!(room.name, "hikers");
    assert_eq!(room.announcement, "monthly trips");
    assert!(room.avatar_url.is_none());
  }
}
