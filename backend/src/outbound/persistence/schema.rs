//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// The `email` column carries a unique index; the application pre-checks
    /// duplicates for friendly errors but correctness rests on the index.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name (max 32 characters).
        display_name -> Varchar,
        /// Unique, lower-cased email address.
        email -> Varchar,
        /// Opaque PHC-format credential hash.
        password_hash -> Varchar,
        /// Whether the email address has been confirmed.
        email_confirmed -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Forum posts table.
    ///
    /// `author_name` is a denormalized snapshot; `solution_comment_id` is
    /// null while the post is unsolved. Cascades are applied by the
    /// application, not by foreign-key actions.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Author's user id (no FK action; cascade is explicit).
        author_id -> Uuid,
        /// Author display name captured at creation time.
        author_name -> Varchar,
        /// Post title (max 120 characters).
        title -> Varchar,
        /// Post body content.
        content -> Text,
        /// Optional featured image reference.
        featured_image -> Nullable<Varchar>,
        /// Accepted solution comment id, when solved.
        solution_comment_id -> Nullable<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Post comments table.
    ///
    /// Comments are write-once; rows only disappear via the application's
    /// cascade deletes.
    comments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Parent post id (no FK action; cascade is explicit).
        post_id -> Uuid,
        /// Commenter's user id.
        author_id -> Uuid,
        /// Commenter display name captured at creation time.
        author_name -> Varchar,
        /// Comment text.
        body -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, posts, comments);
