//! SQL schema for the Rapport SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    nickname    TEXT NOT NULL,
    avatar_url  TEXT,
    privacy     TEXT NOT NULL,   -- 'public' | 'friends' | 'private'
    created_at  TEXT NOT NULL
);

-- Directed follow edges. Friendship is derived from two accepted rows.
CREATE TABLE IF NOT EXISTS relationships (
    relationship_id TEXT PRIMARY KEY,
    follower_id     TEXT NOT NULL REFERENCES users(user_id),
    following_id    TEXT NOT NULL REFERENCES users(user_id),
    status          TEXT NOT NULL,   -- 'pending' | 'accepted' | 'blocked'
    created_at      TEXT NOT NULL,
    accepted_at     TEXT,
    UNIQUE (follower_id, following_id),
    CHECK  (follower_id != following_id)
);

-- pair_key is set for individual rooms only; NULLs never collide.
CREATE TABLE IF NOT EXISTS chat_rooms (
    room_id      TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,   -- 'individual' | 'group'
    name         TEXT NOT NULL,
    announcement TEXT NOT NULL DEFAULT '',
    avatar_url   TEXT,
    pair_key     TEXT UNIQUE,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_room_members (
    room_id              TEXT NOT NULL REFERENCES chat_rooms(room_id),
    user_id              TEXT NOT NULL REFERENCES users(user_id),
    role                 TEXT NOT NULL,   -- 'owner' | 'admin' | 'member'
    nickname             TEXT NOT NULL,
    is_muted             INTEGER NOT NULL DEFAULT 0,
    last_read_message_id INTEGER NOT NULL DEFAULT 0,
    joined_at            TEXT NOT NULL,
    PRIMARY KEY (room_id, user_id)
);

-- Messages are append-only; message_id is a per-room sequence.
CREATE TABLE IF NOT EXISTS messages (
    room_id      TEXT NOT NULL REFERENCES chat_rooms(room_id),
    message_id   INTEGER NOT NULL,
    sender_id    TEXT NOT NULL REFERENCES users(user_id),
    content_type TEXT NOT NULL,   -- 'text' | 'image' | 'file' | 'system'
    content      TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (room_id, message_id)
);

CREATE TABLE IF NOT EXISTS message_media (
    media_id   TEXT PRIMARY KEY,
    room_id    TEXT NOT NULL,
    message_id INTEGER NOT NULL,
    media_type TEXT NOT NULL,
    url        TEXT NOT NULL,
    filename   TEXT NOT NULL,
    size       INTEGER NOT NULL,
    FOREIGN KEY (room_id, message_id) REFERENCES messages(room_id, message_id)
);

-- Pins outlive membership so a stale pin can always be removed.
CREATE TABLE IF NOT EXISTS room_pins (
    user_id   TEXT NOT NULL,
    room_id   TEXT NOT NULL REFERENCES chat_rooms(room_id),
    pinned_at TEXT NOT NULL,
    PRIMARY KEY (user_id, room_id)
);

CREATE INDEX IF NOT EXISTS relationships_following_idx ON relationships(following_id);
CREATE INDEX IF NOT EXISTS members_user_idx            ON chat_room_members(user_id);
CREATE INDEX IF NOT EXISTS media_message_idx           ON message_media(room_id, message_id);

PRAGMA user_version = 1;
";
