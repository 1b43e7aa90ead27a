use crate::github::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use serde::Deserialize;
use utoipa::IntoParams;

/// GitHub caps page size at 100
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination for repository listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RepositoryQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Results per page, at most 100
    pub per_page: Option<u32>,
}

impl RepositoryQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

#[derive(Debug, Deserialize)]
pub struct SeatPath {
    pub org: String,
    pub username: String,
}
