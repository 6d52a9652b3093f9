/// Success envelope
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": true, "data": [ ... ], "pagination": { "page": 2, "limit": 10, "total": 25, "total_pages": 3 } }
/// ```
///
/// Failures use [`crate::error::ErrorResponse`].

use axum::Json;
use kanban_shared::pagination::{Paginated, PaginationMeta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

/// `data` of a response that only confirms an action
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            pagination: None,
        })
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paginated(page: Paginated<T>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(page.items),
            pagination: Some(page.meta),
        })
    }
}

impl ApiResponse<Message> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Self::ok(Message {
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_shared::pagination::Page;

    #[test]
    fn test_paginated_envelope_shape() {
        let page = Page::new(Some(2), Some(10));
        let Json(body) = ApiResponse::paginated(Paginated::new(vec![1, 2, 3], page, 25));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["pagination"]["total_pages"], 3);
    }

    #[test]
    fn test_plain_envelope_omits_pagination() {
        let Json(body) = ApiResponse::message("board deleted");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"]["message"], "board deleted");
        assert!(json.get("pagination").is_none());
        assert!(json.get("error").is_none());
    }
}
