//! User Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub uuid: UserUuid,

    /// Address used for order confirmations.
    pub email: String,

    /// Whether the user may manage every order.
    pub is_admin: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
