//! Session context for engine operations
//!
//! Every sync, snapshot, and revert call is scoped to an explicit acting
//! user passed as a parameter. There is no ambient current-user state.

/// User context consulted for ownership decisions
pub trait UserSession: Send + Sync {
    /// Login name recorded in `assigned_to` / `updated_by` columns
    fn username(&self) -> &str;

    /// Admins are exempt from ownership checks
    fn is_admin(&self) -> bool;

    /// Whether the session user owns a record with the given assignee
    fn owns(&self, assigned_to: &str) -> bool {
        self.is_admin() || assigned_to == self.username()
    }
}

/// Plain session context carried through engine calls
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub username: String,
    pub is_admin: bool,
}

impl SessionContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: true,
        }
    }
}

impl UserSession for SessionContext {
    fn username(&self) -> &str {
        &self.username
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }
}
