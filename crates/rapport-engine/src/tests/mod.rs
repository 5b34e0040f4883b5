//! Engine tests against an in-memory SQLite store.

mod roomless;

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use rapport_core::{
  message::Attachment,
  storage::ObjectStorage,
  store::SocialStore,
  user::{Privacy, User},
};
use rapport_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{ChatEngine, EngineConfig, RelationshipEngine, UserDirectory};

/// Records uploads in memory, or refuses every one when `failing` is set.
#[derive(Default)]
pub(crate) struct FakeStorage {
  failing: bool,
  uploads: Mutex<Vec<String>>,
}

impl FakeStorage {
  pub(crate) fn uploads(&self) -> Vec<String> { self.uploads.lock().unwrap().clone() }
}

impl ObjectStorage for FakeStorage {
  type Error = std::io::Error;

  async fn upload(&self, data: Bytes, directory: String, filename: String) -> Result<String, Self::Error> {
    if self.failing {
      return Err(std::io::Error::other("storage offline"));
    }
    let url = format!("mem://{directory}/{}-{filename}", data.len());
    self.uploads.lock().unwrap().push(url.clone());
    Ok(url)
  }
}

pub(crate) struct Harness {
  pub store:   Arc<SqliteStore>,
  pub storage: Arc<FakeStorage>,
  pub chat:    Arc<ChatEngine<SqliteStore, FakeStorage>>,
  pub graph:   RelationshipEngine<SqliteStore, FakeStorage>,
}

pub(crate) async fn harness() -> Harness { harness_with(EngineConfig::default(), false).await }

pub(crate) async fn harness_with(config: EngineConfig, failing_storage: bool) -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
  let storage = Arc::new(FakeStorage { failing: failing_storage, ..Default::default() });
  let config = Arc::new(config);
  let users = UserDirectory::new(store.clone(), None);
  let chat = Arc::new(ChatEngine::new(store.clone(), storage.clone(), users, config.clone()));
  let graph = RelationshipEngine::new(store.clone(), chat.clone(), config);
  Harness { store, storage, chat, graph }
}

impl Harness {
  pub(crate) async fn user(&self, nickname: &str, privacy: Privacy) -> Uuid {
    self
      .store
      .upsert_user(User {
        user_id: Uuid::new_v4(),
        nickname: nickname.into(),
        avatar_url: None,
        privacy,
        created_at: Utc::now(),
      })
      .await
      .unwrap()
      .user_id
  }

  pub(crate) async fn public(&self, nickname: &str) -> Uuid { self.user(nickname, Privacy::Public).await }

  pub(crate) async fn private(&self, nickname: &str) -> Uuid { self.user(nickname, Privacy::Private).await }
}

pub(crate) fn attachment(filename: &str) -> Attachment {
  Attachment {
    filename:   filename.into(),
    media_type: "image/png".into(),
    data:       Bytes::from_static(b"\x89PNG fake"),
  }
}
