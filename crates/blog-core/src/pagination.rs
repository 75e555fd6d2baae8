//! Page-number pagination over ordered listings.

use serde::Serialize;

/// Page requested by the client (`?page=3`, `?page=last`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u64),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page is not 'last', nor can it be converted to an int: {0}")]
    NotANumber(String),
    #[error("page number {0} is out of range")]
    OutOfRange(u64),
}

impl PageRequest {
    /// Parse the raw `page` query parameter. A missing value means page 1.
    pub fn parse(raw: Option<&str>) -> Result<Self, PaginationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageRequest::Number(1)),
            Some("last") => Ok(PageRequest::Last),
            Some(value) => value
                .parse::<u64>()
                .map(PageRequest::Number)
                .map_err(|_| PaginationError::NotANumber(value.to_string())),
        }
    }
}

/// Resolved slice of a listing: which rows to fetch and where we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Resolve a request against a listing of `count` rows.
    ///
    /// An empty listing still has a single, empty first page.
    pub fn resolve(
        request: PageRequest,
        count: u64,
        per_page: u64,
    ) -> Result<Self, PaginationError> {
        let per_page = per_page.max(1);
        let num_pages = count.div_ceil(per_page).max(1);

        let number = match request {
            PageRequest::Last => num_pages,
            PageRequest::Number(0) => return Err(PaginationError::OutOfRange(0)),
            PageRequest::Number(n) if n > num_pages => {
                return Err(PaginationError::OutOfRange(n));
            }
            PageRequest::Number(n) => n,
        };

        Ok(Self {
            number,
            num_pages,
            count,
            offset: (number - 1) * per_page,
            limit: per_page,
        })
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
