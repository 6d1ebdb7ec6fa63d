use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user. `id` is the identity provider's uid, assigned at
/// sign-up and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}
