use domain::{is_letters_only, DEFAULT_LEVEL, NAME_MAX_LEN, NAME_MIN_LEN};
use serde::Deserialize;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[serde(default = "default_level")]
    #[validate(range(min = 1, max = 99, message = "level must be between 1 and 99"))]
    pub level: i32,
}

fn default_level() -> i32 {
    DEFAULT_LEVEL
}

/// Rules are checked in order and the first failure wins.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let fail = |message: String| -> Result<(), ValidationError> {
        Err(ValidationError::new("name").with_message(message.into()))
    };

    if name.trim().is_empty() {
        return fail("name cannot be blank".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return fail("name cannot contain whitespace".to_string());
    }
    if !is_letters_only(name) {
        return fail(
            "name may only contain letters; digits and special characters are not allowed"
                .to_string(),
        );
    }

    let length = name.chars().count();
    if length < NAME_MIN_LEN {
        return fail(format!("name must be at least {NAME_MIN_LEN} characters"));
    }
    if length > NAME_MAX_LEN {
        return fail(format!("name must be at most {NAME_MAX_LEN} characters"));
    }

    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchQuery {
    pub keyword: Option<String>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
