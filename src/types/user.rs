//! User identity types
//!
//! Identity is externally managed: the engine stores who owns an account but
//! never authenticates users or drives status transitions itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique user identifier (UUID v4)
pub type UserId = Uuid;

/// Lifecycle status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    /// User may own and operate an account
    Active,
    /// Temporarily barred; status transitions happen outside the engine
    Suspended,
    /// Permanently closed
    Closed,
}

/// A registered user of the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub user_id: UserId,
    /// Display name
    pub username: String,
    /// Contact email
    pub email: String,
    /// Creation instant (UTC)
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status
    pub status: UserStatus,
}

impl User {
    /// Create a new active user with a fresh identifier
    pub fn new(username: &str, email: &str) -> Self {
        User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
            status: UserStatus::Active,
        }
    }

    /// Whether the user is currently active
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}
