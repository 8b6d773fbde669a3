//! # Domain Model
//!
//! The user types handed to and returned from [`crate::UsersApi`], and their
//! conversions to and from the wire messages in [`user_proto::pb`].
//!
//! Conversions are plain [`From`] impls and never fail. An identifier that is
//! not exactly 16 bytes on the wire decodes to [`Uuid::nil`].
use user_proto::pb;
use uuid::Uuid;

/// A snapshot of a user as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_uuid: Uuid,
    pub username: String,
    pub email: String,
    /// Role of the account, interpreted by the remote service.
    pub user_type: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A partial update of a user.
///
/// `None` leaves the field untouched, `Some(String::new())` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub user_uuid: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    /// Creates an update for `user_uuid` that changes nothing yet.
    pub fn new(user_uuid: Uuid) -> Self {
        Self {
            user_uuid,
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Returns `true` if no field would be changed by this update.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

fn uuid_from_bytes_or_nil(bytes: &[u8]) -> Uuid {
    Uuid::from_slice(bytes).unwrap_or_default()
}

impl From<User> for pb::User {
    fn from(user: User) -> Self {
        pb::User {
            user_uuid: user.user_uuid.as_bytes().to_vec(),
            username: user.username,
            email: user.email,
            user_type: user.user_type,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl From<pb::User> for User {
    fn from(pb: pb::User) -> Self {
        User {
            user_uuid: uuid_from_bytes_or_nil(&pb.user_uuid),
            username: pb.username,
            email: pb.email,
            user_type: pb.user_type,
            first_name: pb.first_name,
            last_name: pb.last_name,
        }
    }
}

impl From<UpdateUserRequest> for pb::UpdateUserRequest {
    fn from(req: UpdateUserRequest) -> Self {
        pb::UpdateUserRequest {
            user_uuid: req.user_uuid.as_bytes().to_vec(),
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

// Peers without field presence never put an empty string on the wire, so a
// field they leave empty still decodes as `None` here.
impl From<pb::UpdateUserRequest> for UpdateUserRequest {
    fn from(pb: pb::UpdateUserRequest) -> Self {
        UpdateUserRequest {
            user_uuid: uuid_from_bytes_or_nil(&pb.user_uuid),
            username: pb.username,
            email: pb.email,
            first_name: pb.first_name,
            last_name: pb.last_name,
        }
    }
}
