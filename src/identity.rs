//! Identity resolution.
//!
//! Resolution order:
//! 1) CLI --user (explicit)
//! 2) TT_USER environment variable
//! 3) Identity persisted by `tt user sign-in`
//! 4) Anonymous

use crate::error::{Error, Result};
use crate::storage::{self, Identity, KeyValueStore};

/// Slot remembering the signed-in identity.
pub const ACTIVE_USER_KEY: &str = "active_user";

pub const USER_ENV: &str = "TT_USER";

/// Resolve the identity for this invocation.
pub fn resolve_identity<S: KeyValueStore + ?Sized>(store: &S, cli_user: Option<&str>) -> Identity {
    if let Some(user) = non_empty(cli_user) {
        return Identity::User(user.to_string());
    }

    if let Ok(env_user) = std::env::var(USER_ENV) {
        if let Some(user) = non_empty(Some(env_user.as_str())) {
            return Identity::User(user.to_string());
        }
    }

    load_signed_in(store).unwrap_or_default()
}

/// The identity persisted by [`sign_in`], if any.
pub fn load_signed_in<S: KeyValueStore + ?Sized>(store: &S) -> Option<Identity> {
    let user: Option<String> = storage::load_json(store, ACTIVE_USER_KEY)?;
    non_empty(user.as_deref()).map(|user| Identity::User(user.to_string()))
}

pub fn sign_in<S: KeyValueStore + ?Sized>(store: &mut S, user: &str) -> Result<Identity> {
    let user = non_empty(Some(user))
        .ok_or_else(|| Error::InvalidArgument("user id cannot be empty".to_string()))?;
    storage::save_json(store, ACTIVE_USER_KEY, &Some(user))?;
    Ok(Identity::User(user.to_string()))
}

pub fn sign_out<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    storage::save_json(store, ACTIVE_USER_KEY, &None::<String>)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn explicit_user_wins() {
        let mut store = MemoryStore::new();
        sign_in(&mut store, "persisted").unwrap();
        assert_eq!(
            resolve_identity(&store, Some(" cli ")),
            Identity::User("cli".to_string())
        );
    }

    #[test]
    fn sign_in_and_out() {
        let mut store = MemoryStore::new();
        assert!(load_signed_in(&store).is_none());

        assert_eq!(
            sign_in(&mut store, " u1 ").unwrap(),
            Identity::User("u1".to_string())
        );
        assert_eq!(load_signed_in(&store), Some(Identity::User("u1".to_string())));

        sign_out(&mut store).unwrap();
        assert!(load_signed_in(&store).is_none());
    }

    #[test]
    fn blank_sign_in_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            sign_in(&mut store, "   "),
            Err(Error::InvalidArgument(_))
        ));
    }
}
