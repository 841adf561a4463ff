//! Ownership checks for mutating operations.
//!
//! Records carry their owner's user id. Admins may change anything; users
//! may change only what they own; every other role is refused.

use std::fmt;

use thiserror::Error;

/// Caller role asserted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access to every record.
    Admin,
    /// Access to own records.
    User,
    /// Any role this service does not grant rights to.
    Other,
}

impl Role {
    /// Convert role to its wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Other => "other",
        }
    }

    /// Whether this role may call mutating operations at all.
    pub fn can_mutate(&self) -> bool {
        matches!(self, Role::Admin | Role::User)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Other,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Caller identity as supplied by the identity provider.
    pub id: String,
    pub role: Role,
}

impl Caller {
    /// Create a caller.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// The caller id as a record owner id.
    ///
    /// Only canonical integers qualify, so the owner id written on create
    /// always matches the caller id on later ownership checks.
    pub fn owner_id(&self) -> Option<i64> {
        self.id
            .parse::<i64>()
            .ok()
            .filter(|id| id.to_string() == self.id)
    }
}

/// A guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Permission-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Caller neither owns the record nor is an admin.
    #[error("only the owner can {0} this record")]
    NotOwner(Action),
}

/// Decide whether `caller` may perform `action` on a record owned by `owner_id`.
///
/// Ids are compared as strings, so `"07"` does not own record owner `7`.
///
/// # Examples
///
/// ```
/// use fileshelf::auth::{authorize, Action, Caller, Role};
///
/// assert!(authorize(Action::Delete, 7, &Caller::new("7", Role::User)).is_ok());
/// assert!(authorize(Action::Delete, 7, &Caller::new("1", Role::Admin)).is_ok());
/// assert!(authorize(Action::Delete, 7, &Caller::new("8", Role::User)).is_err());
/// ```
pub fn authorize(action: Action, owner_id: i64, caller: &Caller) -> Result<(), PermissionError> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::User if caller.id == owner_id.to_string() => Ok(()),
        _ => Err(PermissionError::NotOwner(action)),
    }
}
