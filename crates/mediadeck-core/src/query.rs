//! Canonical list-query construction.
//!
//! A [`ListQuery`] is the pure value behind every listing view: page,
//! page size, sort column/direction, and the optional filters the API
//! understands. [`ListQuery::params`] renders it deterministically, so the
//! same UI state always produces the same request and the same cache key.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::status::{CmValue, SortOrder};

/// Default sort column when a view has not chosen one.
pub const DEFAULT_SORT_BY: &str = "updated_at";

/// Number of records per page. Only three sizes are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    TwentyFive,
    Fifty,
    OneHundred,
}

impl PageSize {
    pub const CHOICES: [u32; 3] = [25, 50, 100];

    pub fn as_u32(&self) -> u32 {
        match self {
            Self::TwentyFive => 25,
            Self::Fifty => 50,
            Self::OneHundred => 100,
        }
    }
}

impl FromStr for PageSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "25" => Ok(Self::TwentyFive),
            "50" => Ok(Self::Fifty),
            "100" => Ok(Self::OneHundred),
            _ => Err(()),
        }
    }
}

/// UI state for one listing, rendered into canonical query parameters.
///
/// `page` is 1-based; the offset sent to the API is
/// `(page - 1) * page_size`. Unset filters are omitted from the
/// rendered parameters entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: PageSize,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub media_type: Option<String>,
    pub reviewed: Option<bool>,
    pub anomalous: Option<bool>,
    pub cm_value: Option<CmValue>,
    pub media_title: Option<String>,
    pub imdb_id: Option<String>,
    pub hash: Option<String>,
    pub error_status: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::Desc,
            media_type: None,
            reviewed: None,
            anomalous: None,
            cm_value: None,
            media_title: None,
            imdb_id: None,
            hash: None,
            error_status: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by.into();
        self.sort_order = sort_order;
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_reviewed(mut self, reviewed: bool) -> Self {
        self.reviewed = Some(reviewed);
        self
    }

    pub fn with_cm_value(mut self, cm_value: CmValue) -> Self {
        self.cm_value = Some(cm_value);
        self
    }

    /// Zero-based record offset for the current page.
    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1) * self.page_size.as_u32()
    }

    /// Canonical parameter list for offset-paginated endpoints.
    ///
    /// Ordering is fixed: pagination, sort, then filters in declaration
    /// order. Rendering the same query twice yields the same list.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.page_size.as_u32().to_string()),
            ("offset", self.offset().to_string()),
            ("sort_by", self.sort_by.clone()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        self.push_filters(&mut params);
        params
    }

    /// Canonical parameter list for the page-paginated media endpoint,
    /// which takes `page`/`limit` instead of `limit`/`offset`.
    pub fn page_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.page_size.as_u32().to_string()),
            ("sort_by", self.sort_by.clone()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        self.push_filters(&mut params);
        params
    }

    fn push_filters(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(media_type) = &self.media_type {
            params.push(("media_type", media_type.clone()));
        }
        if let Some(reviewed) = self.reviewed {
            params.push(("reviewed", reviewed.to_string()));
        }
        if let Some(anomalous) = self.anomalous {
            params.push(("anomalous", anomalous.to_string()));
        }
        if let Some(cm_value) = self.cm_value {
            params.push(("cm_value", cm_value.as_str().to_string()));
        }
        if let Some(media_title) = &self.media_title {
            params.push(("media_title", media_title.clone()));
        }
        if let Some(imdb_id) = &self.imdb_id {
            params.push(("imdb_id", imdb_id.clone()));
        }
        if let Some(hash) = &self.hash {
            params.push(("hash", hash.clone()));
        }
        if let Some(error_status) = self.error_status {
            params.push(("error_status", error_status.to_string()));
        }
    }

    /// `k=v&k=v` rendering of [`params`](Self::params), used as the
    /// cache-key component and shown to the operator as the outgoing call.
    pub fn canonical_string(&self) -> String {
        render_params(&self.params())
    }

    /// `k=v&k=v` rendering of [`page_params`](Self::page_params).
    pub fn canonical_page_string(&self) -> String {
        render_params(&self.page_params())
    }
}

fn render_params(params: &[(&'static str, String)]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        let _ = write!(out, "{key}={value}");
    }
    out
}
