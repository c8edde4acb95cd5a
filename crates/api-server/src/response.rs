use serde::Serialize;

pub const DEFAULT_MESSAGE: &str = "OK";

/// Uniform envelope wrapped around every response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::ok_with_message(data, DEFAULT_MESSAGE)
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope_defaults_message() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"success": true, "message": "OK", "data": [1, 2]}));
    }

    #[test]
    fn fail_envelope_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::fail("user not found")).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "message": "user not found", "data": null})
        );
    }
}
