use domain::User;
use serde::Serialize;

/// Response-shaped projection of a persisted [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub level: i32,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            // The service only projects persisted users
            id: user.id().unwrap_or_default(),
            level: user.level(),
            name: user.name().to_string(),
        }
    }
}
