// 🔗 Read endpoints exposed over HTTP, shared by the server banner,
// the in-process check and the smoke test

use serde::{Deserialize, Serialize};

use crate::catalog::CategoryType;

pub const HEALTH_PATH: &str = "/api/health";
pub const SEARCH_PATH: &str = "/api/categories/search";

/// Path of the "all active records" endpoint for one type
pub fn list_path(category_type: CategoryType) -> String {
    format!("/api/{}", category_type.slug())
}

/// Endpoints hit by the smoke test, with a human description
pub fn smoke_endpoints() -> Vec<(String, String)> {
    let mut endpoints: Vec<(String, String)> = CategoryType::ALL
        .iter()
        .map(|t| {
            (
                list_path(*t),
                format!("Get All {} Categories", t.label()),
            )
        })
        .collect();

    endpoints.push((
        format!("{}?q=python", SEARCH_PATH),
        "Search for 'python'".to_string(),
    ));
    endpoints.push((
        format!("{}?q=engineer&type=role", SEARCH_PATH),
        "Search for 'engineer' in roles".to_string(),
    ));

    endpoints
}

/// Lines printed when the server starts or seeding finishes
pub fn endpoint_listing() -> Vec<String> {
    let mut lines: Vec<String> = CategoryType::ALL
        .iter()
        .map(|t| format!("GET {}", list_path(*t)))
        .collect();
    lines.push(format!("GET {}?q=python", SEARCH_PATH));
    lines
}

/// Response envelope used by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Number of items in a response body's `data`, if it is a list
pub fn count_items(body: &serde_json::Value) -> Option<usize> {
    body.get("data")?.as_array().map(|items| items.len())
}

/// Error message in a response body, if any
pub fn error_message(body: &serde_json::Value) -> Option<String> {
    body.get("error")?.as_str().map(str::to_string)
}
