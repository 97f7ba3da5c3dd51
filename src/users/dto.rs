use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;

/// Query parameters for the paginated user listing.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

/// Listing envelope; pagination metadata sits beside the data.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub success: bool,
    pub message: String,
    pub data: Vec<PublicUser>,
    pub pagination: PageMeta,
}

/// Partial profile update; omitted fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub dni: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub active: bool,
}
