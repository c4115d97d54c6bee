//! Group model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scoring group that players and teams belong to.
///
/// Joinable by its 6-character `group_code`; immutable except rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub group_code: String,
    pub group_name: String,
    pub created_date: DateTime<Utc>,
}

/// Request body for creating a new group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub group_name: String,
}

/// Request body for joining an existing group by code.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinGroupRequest {
    pub group_code: String,
}

/// Request body for renaming a group.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameGroupRequest {
    pub group_name: String,
}
