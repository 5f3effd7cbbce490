//! Uniform `{ success, message, data, meta }` response envelope.

use serde::Serialize;

/// Success envelope wrapping every API payload.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Envelope with a data payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    /// Envelope with a data payload plus pagination meta.
    pub fn paginated(message: impl Into<String>, data: T, meta: PageMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: Some(meta),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with no data payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            meta: None,
        }
    }
}

/// Pagination metadata for list endpoints.
#[derive(Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok("Fetched", vec![1, 2, 3])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Fetched");
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::message("Logged out")).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("data").is_none());
    }
}
