use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user account, stored as a single document. The friend list is
/// embedded: a confirmed friendship appears as one edge on each side, a
/// pending request as a single edge on the recipient's side only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    #[serde(default)]
    pub friends: Vec<FriendEdge>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Response shape for account endpoints. The password hash never
    /// leaves the store layer.
    pub fn public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            profile_image: self.profile_image.clone(),
            banner_image: self.banner_image.clone(),
            friends: self.friends.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    pub friends: Vec<FriendEdge>,
    pub created_at: DateTime<Utc>,
}

/// A directed edge in one account's friend list. `name` and
/// `profile_image` are snapshots of the counterpart taken when the edge
/// was created; the profile image is refreshed by the fan-out on profile
/// updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendEdge {
    pub identifier: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub notification: bool,
    pub friend: bool,
    pub created_at: DateTime<Utc>,
}

/// A post. Comments and likes are embedded; `creator` is a snapshot of
/// the owning account's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub id: String,
    pub creator: Creator,
    pub body: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub identifier: String,
    pub name: String,
    pub profile_image: Option<String>,
}

/// At most one like per account per target; liking again removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub identifier: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub body: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    pub created_at: DateTime<Utc>,
}
