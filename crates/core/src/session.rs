//! Session context handed out by a successful login.

use serde::{Deserialize, Serialize};

use crate::models::Account;

/// Proof of a completed login, passed explicitly to operations that
/// require an authenticated user.
///
/// The catalog holds no ambient "current user": the caller owns the
/// session and logging out is simply dropping it. The role flag is
/// captured at login time; operations that touch account state still
/// resolve the account by name, so a session whose account has been
/// removed fails cleanly instead of dereferencing stale state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Username of the logged-in account.
    pub username: String,
    /// Role captured at login time.
    pub is_admin: bool,
}

impl Session {
    pub(crate) fn for_account(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            is_admin: account.is_admin,
        }
    }
}
