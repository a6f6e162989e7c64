use serde::{Deserialize, Serialize};

use crate::ids::Cursor;
use crate::image::ImageSummary;

/// Parameters of a single listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<Cursor>,
    pub limit: u32,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            cursor: None,
            limit,
            search: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor.filter(|c| !c.is_empty());
        self
    }

    /// Blank queries mean "no filter" and are dropped.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    /// Query string pairs, omitting absent values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
    #[serde(default)]
    pub has_more: bool,
}

/// `data` payload of a listing response, as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub images: Vec<ImageSummary>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// One page of results with the continuation already normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub images: Vec<ImageSummary>,
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl Page {
    /// A page ends the listing when the backend says so or when it gives no
    /// cursor to continue from.
    pub fn is_terminal(&self) -> bool {
        !self.has_more || self.next_cursor.is_none()
    }
}

impl From<PageData> for Page {
    fn from(data: PageData) -> Self {
        let next_cursor = data.pagination.next_cursor.filter(|c| !c.is_empty());
        Self {
            images: data.images,
            has_more: data.pagination.has_more && next_cursor.is_some(),
            next_cursor,
        }
    }
}
