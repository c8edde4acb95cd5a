use crate::errors::DomainError;

pub const DEFAULT_LEVEL: i32 = 1;
pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 99;

/// Core User entity - represents the business domain
///
/// Fields are private: once built, the only way to change a user is
/// [`User::level_up`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Option<i32>, // None for new users before persistence
    name: String,
    level: i32,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::new()
    }

    /// Rehydrates a user that already lives in storage.
    pub fn with_id(id: i32, name: String, level: i32) -> Self {
        Self {
            id: Some(id),
            name,
            level,
        }
    }

    /// Returns the same user stamped with the identifier assigned by storage.
    pub fn persisted(self, id: i32) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
    }
}

/// Two-step construction for [`User`]. Nothing is checked until
/// [`UserBuilder::build`].
#[derive(Debug, Clone)]
pub struct UserBuilder {
    name: String,
    level: i32,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            level: DEFAULT_LEVEL,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn build(self) -> Result<User, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be blank"));
        }

        Ok(User {
            id: None,
            name: self.name,
            level: self.level,
        })
    }
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
