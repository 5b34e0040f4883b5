//! Role checks shared by the membership operations.
//!
//! The hierarchy is strict: `owner > admin > member`, and an actor may act on
//! a target only when the actor outranks it. A room always has exactly one
//! owner, so no check here ever lets a role become or stop being `owner`.

use rapport_core::{
  Error, Result,
  room::{ChatRoomMember, MemberPatch, Role},
};

/// Room settings and membership changes need at least `admin`.
pub fn ensure_manager(actor: &ChatRoomMember) -> Result<()> {
  if actor.role.can_manage() {
    Ok(())
  } else {
    Err(Error::Forbidden("requires admin or owner".into()))
  }
}

/// The actor must strictly outrank the target; ties are forbidden.
pub fn ensure_outranks(actor: &ChatRoomMember, target: &ChatRoomMember) -> Result<()> {
  if actor.role.outranks(target.role) {
    Ok(())
  } else {
    Err(Error::Forbidden(format!(
      "a {:?} cannot act on a {:?}",
      actor.role, target.role
    )))
  }
}

/// May `actor` remove `target` from the room?
pub fn check_removal(actor: &ChatRoomMember, target: &ChatRoomMember) -> Result<()> {
  ensure_manager(actor)?;
  if target.role == Role::Owner {
    return Err(Error::Forbidden("the owner cannot be removed".into()));
  }
  ensure_outranks(actor, target)
}

/// May `actor` apply `patch` to `target`? Acting on oneself is limited to
/// nickname and mute changes.
pub fn check_member_update(
  actor:  &ChatRoomMember,
  target: &ChatRoomMember,
  patch:  &MemberPatch,
) -> Result<()> {
  ensure_manager(actor)?;

  if actor.user_id == target.user_id {
    return match patch.role {
      Some(role) if role != actor.role => {
        Err(Error::Forbidden("members cannot change their own role".into()))
      }
      _ => Ok(()),
    };
  }

  ensure_outranks(actor, target)?;

  if let Some(role) = patch.role {
    if role == Role::Owner {
      return Err(Error::Forbidden("ownership cannot be assigned".into()));
    }
    if !actor.role.outranks(role) {
      return Err(Error::Forbidden(format!("a {:?} cannot grant {:?}", actor.role, role)));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn member(role: Role) -> ChatRoomMember {
    ChatRoomMember::new(Uuid::nil(), Uuid::new_v4(), role, "m")
  }

  fn role_patch(role: Role) -> MemberPatch { MemberPatch { role: Some(role), ..Default::default() } }

  #[test]
  fn members_cannot_manage() {
    let actor = member(Role::Member);
    let target = member(Role::Member);
    assert!(matches!(check_removal(&actor, &target), Err(Error::Forbidden(_))));
    assert!(matches!(
      check_member_update(&actor, &target, &MemberPatch::default()),
      Err(Error::Forbidden(_))
    ));
  }

  #[test]
  fn admins_cannot_touch_peers_or_owner() {
    let admin = member(Role::Admin);
    assert!(check_removal(&admin, &member(Role::Admin)).is_err());
    assert!(check_removal(&admin, &member(Role::Owner)).is_err());
    assert!(check_removal(&admin, &member(Role::Member)).is_ok());
  }

  #[test]
  fn owner_promotes_but_never_hands_over_ownership() {
    let owner = member(Role::Owner);
    let target = member(Role::Member);
    assert!(check_member_update(&owner, &target, &role_patch(Role::Admin)).is_ok());
    assert!(check_member_update(&owner, &target, &role_patch(Role::Owner)).is_err());
  }

  #[test]
  fn admins_cannot_promote_to_their_own_rank() {
    let admin = member(Role::Admin);
    let target = member(Role::Member);
    assert!(check_member_update(&admin, &target, &role_patch(Role::Admin)).is_err());
    let mute = MemberPatch { is_muted: Some(true), ..Default::default() };
    assert!(check_member_update(&admin, &target, &mute).is_ok());
  }

  #[test]
  fn self_updates_keep_the_role() {
    let owner = member(Role::Owner);
    let rename = MemberPatch { nickname: Some("boss".into()), ..Default::default() };
    assert!(check_member_update(&owner, &owner, &rename).is_ok());
    assert!(check_member_update(&owner, &owner, &role_patch(Role::Member)).is_err());
  }
}
