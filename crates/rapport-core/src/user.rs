//! The identity anchor of the social graph.
//!
//! Users are owned by the identity provider. The core only reads them; the
//! profile-sync upsert exists so the API can mirror verified claims locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who may follow a user without approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
  /// Follow requests are accepted immediately.
  #[default]
  Public,
  Friends,
  Private,
}

impl Privacy {
  /// Whether a new follow edge towards this user starts out accepted.
  pub fn auto_accepts(self) -> bool { matches!(self, Self::Public) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub nickname:   String,
  pub avatar_url: Option<String>,
  pub privacy:    Privacy,
  pub created_at: DateTime<Utc>,
}

/// Profile claims issued by the identity provider for a verified user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileClaims {
  pub nickname:   String,
  #[serde(default)]
  pub avatar_url: Option<String>,
  #[serde(default)]
  pub privacy:    Privacy,
}

impl ProfileClaims {
  pub fn into_user(self, user_id: Uuid) -> User {
    User {
      user_id,
      nickname: self.nickname,
      avatar_url: self.avatar_url,
      privacy: self.privacy,
      created_at: Utc::now(),
    }
  }
}
