//! Relationship edges: the directed, stateful records of the follow graph.
//!
//! At most one edge exists per ordered `(follower, following)` pair. A
//! friendship is never stored: it is the derived condition where both
//! directions exist and are [`RelationshipStatus::Accepted`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
  /// Waiting for the followed user to accept.
  Pending,
  Accepted,
  /// The follower has blocked the followed user.
  Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  pub relationship_id: Uuid,
  pub follower_id:     Uuid,
  pub following_id:    Uuid,
  pub status:          RelationshipStatus,
  pub created_at:      DateTime<Utc>,
  /// Set only on a transition into [`RelationshipStatus::Accepted`].
  pub accepted_at:     Option<DateTime<Utc>>,
}

impl Relationship {
  /// Build a fresh edge. `accepted_at` is stamped when `status` is accepted.
  pub fn new(follower_id: Uuid, following_id: Uuid, status: RelationshipStatus) -> Self {
    let now = Utc::now();
    Self {
      relationship_id: Uuid::new_v4(),
      follower_id,
      following_id,
      status,
      created_at: now,
      accepted_at: (status == RelationshipStatus::Accepted).then_some(now),
    }
  }

  pub fn is_accepted(&self) -> bool { self.status == RelationshipStatus::Accepted }

  pub fn is_blocked(&self) -> bool { self.status == RelationshipStatus::Blocked }
}
