//! The Chat Room & Messaging Engine.
//!
//! Owns room lifecycle, role-based membership, message ingestion and unread
//! accounting. Individual rooms are deduplicated per pair of users; group
//! rooms have exactly one owner for their whole life.
//!
//! Best-effort side effects (media uploads, initial group members, the unread
//! notification pass) are logged on failure and never fail the operation that
//! triggered them.

use std::{
  collections::HashSet,
  sync::Arc,
};

use rapport_core::{
  Error, Result,
  message::{Attachment, ContentType, Message, MessageMedia, NewMessage},
  room::{
    ChatRoom, ChatRoomMember, MemberPatch, Role, RoomDetail, RoomKind, RoomPatch, RoomSummary,
  },
  storage::ObjectStorage,
  store::{SocialStore, StoreError as _},
};
use uuid::Uuid;

use crate::{
  config::EngineConfig,
  directory::UserDirectory,
  dispatch,
  permission::{check_member_update, check_removal, ensure_manager},
};

pub struct ChatEngine<S, O> {
  store:   Arc<S>,
  storage: Arc<O>,
  users:   UserDirectory<S>,
  config:  Arc<EngineConfig>,
}

impl<S, O> Clone for ChatEngine<S, O> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      storage: self.storage.clone(),
      users:   self.users.clone(),
      config:  self.config.clone(),
    }
  }
}

impl<S, O> ChatEngine<S, O>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  pub fn new(
    store:   Arc<S>,
    storage: Arc<O>,
    users:   UserDirectory<S>,
    config:  Arc<EngineConfig>,
  ) -> Self {
    Self { store, storage, users, config }
  }

  pub fn users(&self) -> &UserDirectory<S> { &self.users }

  pub fn config(&self) -> &EngineConfig { &self.config }

  // ─── Lookups ───────────────────────────────────────────────────────────────

  async fn room(&self, room_id: Uuid) -> Result<ChatRoom> {
    self
      .store
      .get_room(room_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(format!("room {room_id}")))
  }

  /// The caller's own membership; absence is [`Error::NotAMember`].
  async fn membership(&self, room_id: Uuid, user_id: Uuid) -> Result<ChatRoomMember> {
    self
      .store
      .get_member(room_id, user_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::NotAMember { room_id, user_id })
  }

  /// A member being acted upon; absence is [`Error::NotFound`].
  async fn target(&self, room_id: Uuid, user_id: Uuid) -> Result<ChatRoomMember> {
    self
      .store
      .get_member(room_id, user_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(format!("member {user_id} of room {room_id}")))
  }

  /// Search `a`'s individual rooms for the one shared with exactly `b`.
  async fn find_private_room(&self, a: Uuid, b: Uuid) -> Result<Option<ChatRoom>> {
    let rooms = self
      .store
      .list_rooms_for_user(a, Some(RoomKind::Individual))
      .await
      .map_err(Error::from_store)?;

    for room in rooms {
      let members = self.store.list_members(room.room_id).await.map_err(Error::from_store)?;
      if members.len() == 2 && members.iter().any(|m| m.user_id == b) {
        return Ok(Some(room));
      }
    }
    Ok(None)
  }

  async fn ensure_not_blocked(&self, a: Uuid, b: Uuid) -> Result<()> {
    for (blocker, blocked) in [(a, b), (b, a)] {
      let edge = self
        .store
        .get_relationship(blocker, blocked)
        .await
        .map_err(Error::from_store)?;
      if edge.is_some_and(|e| e.is_blocked()) {
        return Err(Error::Blocked);
      }
    }
    Ok(())
  }

  // ─── Rooms ─────────────────────────────────────────────────────────────────

  /// Return the individual room shared by `a` and `b`, creating it on first
  /// request. Never produces a second room for the same pair.
  pub async fn create_private_room(&self, a: Uuid, b: Uuid) -> Result<ChatRoom> {
    if a == b {
      return Err(Error::SelfReference);
    }
    let user_a = self.users.require(a).await?;
    let user_b = self.users.require(b).await?;
    self.ensure_not_blocked(a, b).await?;

    if let Some(room) = self.find_private_room(a, b).await? {
      return Ok(room);
    }

    let room = ChatRoom::new(RoomKind::Individual, "", "");
    let members = vec![
      ChatRoomMember::new(room.room_id, a, Role::Member, user_a.nickname),
      ChatRoomMember::new(room.room_id, b, Role::Member, user_b.nickname),
    ];

    match self.store.create_room(room.clone(), members).await {
      Ok(()) => {
        tracing::debug!(room_id = %room.room_id, %a, %b, "private room created");
        Ok(room)
      }
      // A concurrent request created the pair's room first; return theirs.
      Err(e) if e.is_conflict() => self
        .find_private_room(a, b)
        .await?
        .ok_or_else(|| Error::from_store(e)),
      Err(e) => Err(Error::from_store(e)),
    }
  }

  /// Create a group owned by `creator_id`, then add the initial members one
  /// by one. A member that cannot be added is logged and skipped.
  pub async fn create_group_room(
    &self,
    creator_id:      Uuid,
    name:            String,
    announcement:    String,
    initial_members: Vec<Uuid>,
  ) -> Result<ChatRoom> {
    let limit = self.config.max_room_members;
    if initial_members.len() > limit {
      return Err(Error::CapacityExceeded { limit });
    }
    if name.trim().is_empty() {
      return Err(Error::InvalidInput("group name is required".into()));
    }
    let creator = self.users.require(creator_id).await?;

    let room = ChatRoom::new(RoomKind::Group, name, announcement);
    let owner = ChatRoomMember::new(room.room_id, creator_id, Role::Owner, creator.nickname);
    self
      .store
      .create_room(room.clone(), vec![owner])
      .await
      .map_err(Error::from_store)?;
    tracing::debug!(room_id = %room.room_id, %creator_id, "group room created");

    let mut seen = HashSet::from([creator_id]);
    for user_id in initial_members {
      if !seen.insert(user_id) {
        continue;
      }
      match self.add_initial_member(&room, user_id).await {
        Ok(()) => {}
        Err(Error::CapacityExceeded { .. }) => {
          tracing::warn!(room_id = %room.room_id, limit, "group full; remaining initial members skipped");
          break;
        }
        Err(error) => {
          tracing::warn!(room_id = %room.room_id, %user_id, %error, "initial member skipped")
        }
      }
    }

    Ok(room)
  }

  async fn add_initial_member(&self, room: &ChatRoom, user_id: Uuid) -> Result<()> {
    let user = self.users.require(user_id).await?;
    let limit = self.config.max_room_members;
    let member = ChatRoomMember::new(room.room_id, user_id, Role::Member, user.nickname);
    if self.store.add_member(member, limit as u64).await.map_err(Error::from_store)? {
      Ok(())
    } else {
      Err(Error::CapacityExceeded { limit })
    }
  }

  pub async fn get_room(&self, user_id: Uuid, room_id: Uuid) -> Result<RoomDetail> {
    let room = self.room(room_id).await?;
    self.membership(room_id, user_id).await?;
    let members = self.store.list_members(room_id).await.map_err(Error::from_store)?;
    Ok(RoomDetail { room, members })
  }

  /// Every room `user_id` belongs to, pinned rooms first.
  pub async fn list_rooms(&self, user_id: Uuid) -> Result<Vec<RoomSummary>> {
    let rooms = self
      .store
      .list_rooms_for_user(user_id, None)
      .await
      .map_err(Error::from_store)?;
    let pinned: HashSet<Uuid> = self
      .store
      .list_pinned_rooms(user_id)
      .await
      .map_err(Error::from_store)?
      .into_iter()
      .collect();

    let mut summaries = Vec::with_capacity(rooms.len());
    for room in rooms {
      // Membership may have been revoked between the two reads.
      let Some(member) = self
        .store
        .get_member(room.room_id, user_id)
        .await
        .map_err(Error::from_store)?
      else {
        continue;
      };
      let latest = self.store.latest_message_id(room.room_id).await.map_err(Error::from_store)?;
      summaries.push(RoomSummary {
        pinned: pinned.contains(&room.room_id),
        unread_count: unread_between(latest, member.last_read_message_id),
        role: member.role,
        room,
      });
    }

    summaries.sort_by_key(|s| !s.pinned);
    Ok(summaries)
  }

  /// Change name, announcement or avatar. Requires `admin` or `owner`.
  pub async fn update_room(&self, operator_id: Uuid, room_id: Uuid, patch: RoomPatch) -> Result<ChatRoom> {
    let mut room = self.room(room_id).await?;
    let actor = self.membership(room_id, operator_id).await?;
    ensure_manager(&actor)?;

    patch.apply(&mut room);
    self.store.update_room(room.clone()).await.map_err(Error::from_store)?;
    Ok(room)
  }

  // ─── Messages ──────────────────────────────────────────────────────────────

  /// Persist a message, move the sender's read cursor past it, upload its
  /// attachments and dispatch the unread notification pass.
  pub async fn send_message(
    &self,
    user_id:      Uuid,
    room_id:      Uuid,
    content_type: ContentType,
    content:      String,
    files:        Vec<Attachment>,
  ) -> Result<Message> {
    self.room(room_id).await?;
    self.membership(room_id, user_id).await?;
    if content.trim().is_empty() && files.is_empty() {
      return Err(Error::InvalidInput("message has no content".into()));
    }

    let mut message = self
      .store
      .insert_message(NewMessage { room_id, sender_id: user_id, content_type, content })
      .await
      .map_err(Error::from_store)?;
    // Your own message is never unread.
    self
      .store
      .advance_read_cursor(room_id, user_id, message.message_id)
      .await
      .map_err(Error::from_store)?;

    for file in files {
      let filename = file.filename.clone();
      match self.attach(&message, file).await {
        Ok(media) => message.media.push(media),
        Err(error) => tracing::warn!(
          %room_id,
          message_id = message.message_id,
          %filename,
          %error,
          "attachment dropped"
        ),
      }
    }

    dispatch::detach("unread-notification", notify_unread(self.store.clone(), message.clone()));
    Ok(message)
  }

  async fn attach(&self, message: &Message, file: Attachment) -> Result<MessageMedia> {
    let size = i64::try_from(file.data.len()).unwrap_or(i64::MAX);
    let url = self
      .storage
      .upload(file.data, self.config.media_directory.clone(), file.filename.clone())
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let media = MessageMedia {
      media_id: Uuid::new_v4(),
      room_id: message.room_id,
      message_id: message.message_id,
      media_type: file.media_type,
      url,
      filename: file.filename,
      size,
    };
    self.store.add_media(media.clone()).await.map_err(Error::from_store)?;
    Ok(media)
  }

  /// Messages strictly older than `before_id`, newest first. `before_id = 0`
  /// starts from the most recent message.
  pub async fn get_messages(
    &self,
    user_id:   Uuid,
    room_id:   Uuid,
    before_id: i64,
    limit:     i64,
  ) -> Result<Vec<Message>> {
    self.membership(room_id, user_id).await?;
    if before_id < 0 {
      return Err(Error::InvalidInput("before_id must not be negative".into()));
    }

    let before = (before_id > 0).then_some(before_id);
    let limit = self.config.message_limit(limit);
    self
      .store
      .list_messages(room_id, before, limit)
      .await
      .map_err(Error::from_store)
  }

  /// Advance the caller's read cursor. Markers at or behind the cursor are
  /// accepted as no-ops, so clients may replay them.
  pub async fn mark_messages_as_read(&self, user_id: Uuid, room_id: Uuid, message_id: i64) -> Result<()> {
    self.membership(room_id, user_id).await?;
    self
      .store
      .get_message(room_id, message_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(format!("message {message_id} in room {room_id}")))?;

    let moved = self
      .store
      .advance_read_cursor(room_id, user_id, message_id)
      .await
      .map_err(Error::from_store)?;
    tracing::debug!(%room_id, %user_id, message_id, moved, "read marker");
    Ok(())
  }

  /// Approximate unread count: the gap between the newest message id and the
  /// caller's cursor.
  pub async fn get_unread_count(&self, user_id: Uuid, room_id: Uuid) -> Result<i64> {
    let member = self.membership(room_id, user_id).await?;
    let latest = self.store.latest_message_id(room_id).await.map_err(Error::from_store)?;
    Ok(unread_between(latest, member.last_read_message_id))
  }

  // ─── Membership ────────────────────────────────────────────────────────────

  pub async fn list_members(&self, user_id: Uuid, room_id: Uuid) -> Result<Vec<ChatRoomMember>> {
    self.membership(room_id, user_id).await?;
    self.store.list_members(room_id).await.map_err(Error::from_store)
  }

  /// Add `member_id` to a group as a plain member. The newcomer's cursor
  /// starts at the current newest message.
  pub async fn add_member(&self, operator_id: Uuid, room_id: Uuid, member_id: Uuid) -> Result<ChatRoomMember> {
    let room = self.room(room_id).await?;
    let actor = self.membership(room_id, operator_id).await?;
    if room.is_individual() {
      return Err(Error::Forbidden("individual rooms have fixed members".into()));
    }
    ensure_manager(&actor)?;

    let user = self.users.require(member_id).await?;
    let existing = self.store.get_member(room_id, member_id).await.map_err(Error::from_store)?;
    if existing.is_some() {
      return Err(Error::Duplicate(format!("user {member_id} is already in room {room_id}")));
    }

    let limit = self.config.max_room_members;
    let mut member = ChatRoomMember::new(room_id, member_id, Role::Member, user.nickname);
    member.last_read_message_id =
      self.store.latest_message_id(room_id).await.map_err(Error::from_store)?;
    let added = self
      .store
      .add_member(member.clone(), limit as u64)
      .await
      .map_err(Error::from_store)?;
    if !added {
      return Err(Error::CapacityExceeded { limit });
    }
    tracing::debug!(%room_id, %operator_id, %member_id, "member added");
    Ok(member)
  }

  pub async fn remove_member(&self, operator_id: Uuid, room_id: Uuid, member_id: Uuid) -> Result<()> {
    self.room(room_id).await?;
    let actor = self.membership(room_id, operator_id).await?;
    let target = self.target(room_id, member_id).await?;
    check_removal(&actor, &target)?;

    self.store.remove_member(room_id, member_id).await.map_err(Error::from_store)?;
    tracing::debug!(%room_id, %operator_id, %member_id, "member removed");
    Ok(())
  }

  /// Change a member's role, nickname or mute flag.
  pub async fn update_member(
    &self,
    operator_id: Uuid,
    room_id:     Uuid,
    member_id:   Uuid,
    patch:       MemberPatch,
  ) -> Result<ChatRoomMember> {
    if patch.is_empty() {
      return Err(Error::InvalidInput("nothing to update".into()));
    }
    self.room(room_id).await?;
    let actor = self.membership(room_id, operator_id).await?;
    let mut target = if member_id == operator_id {
      actor.clone()
    } else {
      self.target(room_id, member_id).await?
    };
    check_member_update(&actor, &target, &patch)?;

    if let Some(role) = patch.role {
      target.role = role;
    }
    if let Some(nickname) = patch.nickname {
      target.nickname = nickname;
    }
    if let Some(is_muted) = patch.is_muted {
      target.is_muted = is_muted;
    }
    self.store.update_member(target.clone()).await.map_err(Error::from_store)?;
    Ok(target)
  }

  /// Leave a group. Owners cannot leave (ownership transfer is not
  /// supported) and individual rooms cannot be left.
  pub async fn leave_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    let room = self.room(room_id).await?;
    let member = self.membership(room_id, user_id).await?;
    if room.is_individual() {
      return Err(Error::Forbidden("individual rooms cannot be left".into()));
    }
    if member.role == Role::Owner {
      return Err(Error::Forbidden("the owner cannot leave the room".into()));
    }

    self.store.remove_member(room_id, user_id).await.map_err(Error::from_store)?;
    tracing::debug!(%room_id, %user_id, "member left");
    Ok(())
  }

  // ─── Pins ──────────────────────────────────────────────────────────────────

  pub async fn pin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    self.membership(room_id, user_id).await?;
    self.store.pin_room(user_id, room_id).await.map_err(Error::from_store)
  }

  /// No membership check: a pin left over from a room the user has since
  /// left must still be removable.
  pub async fn unpin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    self.store.unpin_room(user_id, room_id).await.map_err(Error::from_store)
  }
}

/// `max(0, latest - last_read)`; an id-gap approximation of the unread count.
fn unread_between(latest: i64, last_read: i64) -> i64 { (latest - last_read).max(0) }

/// Log an unread notification for every other unmuted member of the room.
async fn notify_unread<S: SocialStore>(store: Arc<S>, message: Message) -> Result<()> {
  let members = store.list_members(message.room_id).await.map_err(Error::from_store)?;
  for member in members {
    if member.user_id == message.sender_id || member.is_muted {
      continue;
    }
    tracing::info!(
      target: "rapport::notify",
      room_id = %message.room_id,
      user_id = %member.user_id,
      message_id = message.message_id,
      unread = unread_between(message.message_id, member.last_read_message_id),
      "unread notification"
    );
  }
  Ok(())
}
