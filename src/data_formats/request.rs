use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQueryParams {
    #[serde(default = "get_default_page")]
    pub page: u32,
    #[serde(default = "get_default_limit")]
    pub limit: u32,
}

impl Default for ListQueryParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQueryParams {
    /// `None` when the page or limit is zero. Oversized limits are capped.
    pub fn validated(self) -> Option<Self> {
        if self.page < 1 || self.limit < 1 {
            return None;
        }
        Some(Self {
            page: self.page,
            limit: self.limit.min(MAX_LIMIT),
        })
    }
}

fn get_default_page() -> u32 {
    DEFAULT_PAGE
}

fn get_default_limit() -> u32 {
    DEFAULT_LIMIT
}
