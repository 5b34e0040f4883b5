//! Engine tunables, deserialised as the `[engine]` table of the server config.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Upper bound on members of a group room.
  pub max_room_members:      usize,
  /// Page size of `get_messages`, and the cap applied to a requested limit.
  pub default_message_limit: u32,
  /// Page size used when a relationship listing asks for size 0.
  pub default_page_size:     u32,
  pub max_page_size:         u32,
  /// Object-storage directory receiving message attachments.
  pub media_directory:       String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_room_members:      500,
      default_message_limit: 50,
      default_page_size:     20,
      max_page_size:         100,
      media_directory:       "chat".to_owned(),
    }
  }
}

impl EngineConfig {
  /// Clamp a requested message limit into `(0, default_message_limit]`.
  /// Non-positive requests get the default.
  pub fn message_limit(&self, requested: i64) -> u32 {
    let cap = i64::from(self.default_message_limit);
    if requested <= 0 || requested > cap {
      self.default_message_limit
    } else {
      // In range (0, cap], so it fits.
      requested as u32
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn message_limit_is_clamped() {
    let config = EngineConfig::default();
    assert_eq!(config.message_limit(0), 50);
    assert_eq!(config.message_limit(-3), 50);
    assert_eq!(config.message_limit(10), 10);
    assert_eq!(config.message_limit(50), 50);
    assert_eq!(config.message_limit(5_000), 50);
  }
}
