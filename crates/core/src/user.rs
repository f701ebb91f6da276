//! Users as seen by the issue core: read-only identities that can own issues.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A user that may be assigned as an issue owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
}

/// Owner existence check consumed by the transition engine.
///
/// Implementations must answer synchronously; hosts backed by async storage
/// resolve the referenced owner first and hand the result in as an
/// `Option<User>`.
pub trait UserLookup {
    fn lookup_user(&self, id: DbId) -> Option<User>;
}

impl<F> UserLookup for F
where
    F: Fn(DbId) -> Option<User>,
{
    fn lookup_user(&self, id: DbId) -> Option<User> {
        self(id)
    }
}

/// A pre-resolved owner answers only for its own id.
impl UserLookup for Option<User> {
    fn lookup_user(&self, id: DbId) -> Option<User> {
        self.as_ref().filter(|u| u.id == id).cloned()
    }
}

impl UserLookup for [User] {
    fn lookup_user(&self, id: DbId) -> Option<User> {
        self.iter().find(|u| u.id == id).cloned()
    }
}

impl UserLookup for BTreeMap<DbId, User> {
    fn lookup_user(&self, id: DbId) -> Option<User> {
        self.get(&id).cloned()
    }
}

/// The sample users every fresh installation starts with.
pub fn sample_users() -> Vec<User> {
    [(1, "김개발"), (2, "이디자인"), (3, "박기획")]
        .into_iter()
        .map(|(id, name)| User {
            id,
            name: name.to_string(),
        })
        .collect()
}
