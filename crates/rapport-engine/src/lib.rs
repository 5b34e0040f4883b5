//! The Relationship Engine and the Chat Room & Messaging Engine.
//!
//! Both engines are stateless request handlers over a [`SocialStore`]. They
//! are cheap to clone and hold no locks across awaits; the store arbitrates
//! every concurrent write.
//!
//! [`SocialStore`]: rapport_core::store::SocialStore

pub mod chat;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod permission;
pub mod relationship;

pub use chat::ChatEngine;
pub use config::EngineConfig;
pub use directory::UserDirectory;
pub use relationship::RelationshipEngine;

#[cfg(test)]
mod tests;
