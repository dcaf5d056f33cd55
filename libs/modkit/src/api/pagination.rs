//! Page-number pagination helpers
//!
//! Window arithmetic (offset/limit/total pages) and navigation links in the
//! `Link` header format of RFC 5988. Query strings are rebuilt with
//! `application/x-www-form-urlencoded` encoding.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::ToSchema;

/// Query keys owned by the paginator; they are stripped from the incoming
/// query and re-appended with the target page.
pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";

/// A validated 1-based page and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
}

impl PageWindow {
    /// Both values are expected to be already validated as `>= 1`;
    /// zero is clamped up so the arithmetic below never divides by zero.
    #[must_use]
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// `ceil(max(total, 1) / per_page)`: an empty collection still has one page.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.max(1).div_ceil(self.per_page)
    }

    #[must_use]
    pub fn has_next(&self, total_pages: u64) -> bool {
        self.page < total_pages
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Navigation links for one page of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub next: Option<String>,
    pub prev: Option<String>,
    pub first: String,
    pub last: String,
}

impl PageLinks {
    /// Build links for `window` over `total_pages` pages.
    ///
    /// `base` is the collection URL without a query string; `query` is the
    /// original query in arrival order. Every key other than `page` and
    /// `per_page` is carried over unchanged.
    #[must_use]
    pub fn build(
        base: &str,
        query: &[(String, String)],
        window: PageWindow,
        total_pages: u64,
    ) -> Self {
        let carried: Vec<&(String, String)> = query
            .iter()
            .filter(|(k, _)| k != PAGE_PARAM && k != PER_PAGE_PARAM)
            .collect();

        let link = |page: u64| -> String {
            let mut ser = form_urlencoded::Serializer::new(String::new());
            for (k, v) in &carried {
                ser.append_pair(k, v);
            }
            ser.append_pair(PAGE_PARAM, &page.to_string());
            ser.append_pair(PER_PAGE_PARAM, &window.per_page.to_string());
            format!("{base}?{}", ser.finish())
        };

        let last_page = total_pages.max(1);
        Self {
            self_link: link(window.page),
            next: window.has_next(last_page).then(|| link(window.page + 1)),
            prev: window.has_prev().then(|| link(window.page - 1)),
            first: link(1),
            last: link(last_page),
        }
    }

    /// RFC 5988 `Link` header value, ordered next, prev, first, last.
    #[must_use]
    pub fn link_header(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(next) = &self.next {
            parts.push(format!("<{next}>; rel=\"next\""));
        }
        if let Some(prev) = &self.prev {
            parts.push(format!("<{prev}>; rel=\"prev\""));
        }
        parts.push(format!("<{}>; rel=\"first\"", self.first));
        parts.push(format!("<{}>; rel=\"last\"", self.last));
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn q(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn offset_and_limit_follow_page() {
        let w = PageWindow::new(3, 10);
        assert_eq!(w.offset(), 20);
        assert_eq!(w.limit(), 10);
        assert_eq!(PageWindow::new(1, 25).offset(), 0);
    }

    #[test]
    fn empty_collection_has_one_page() {
        assert_eq!(PageWindow::new(1, 10).total_pages(0), 1);
        assert_eq!(PageWindow::new(1, 10).total_pages(10), 1);
        assert_eq!(PageWindow::new(1, 10).total_pages(11), 2);
    }

    #[test]
    fn links_strip_and_reappend_page_params() {
        let query = q(&[
            ("page", "2"),
            ("search", "milk run"),
            ("per_page", "5"),
            ("sort", "-id"),
        ]);
        let links = PageLinks::build("/tasks", &query, PageWindow::new(2, 5), 4);

        assert_eq!(links.self_link, "/tasks?search=milk+run&sort=-id&page=2&per_page=5");
        assert_eq!(
            links.next.as_deref(),
            Some("/tasks?search=milk+run&sort=-id&page=3&per_page=5")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("/tasks?search=milk+run&sort=-id&page=1&per_page=5")
        );
        assert_eq!(links.first, "/tasks?search=milk+run&sort=-id&page=1&per_page=5");
        assert_eq!(links.last, "/tasks?search=milk+run&sort=-id&page=4&per_page=5");
    }

    #[test]
    fn single_page_has_neither_next_nor_prev() {
        let links = PageLinks::build("/tasks", &[], PageWindow::new(1, 10), 1);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
        assert_eq!(
            links.link_header(),
            "</tasks?page=1&per_page=10>; rel=\"first\", </tasks?page=1&per_page=10>; rel=\"last\""
        );
    }

    #[test]
    fn link_header_orders_next_prev_first_last() {
        let links = PageLinks::build("http://h/tasks", &[], PageWindow::new(2, 1), 3);
        let header = links.link_header();
        let rels: Vec<&str> = header
            .split(", ")
            .map(|p| p.rsplit("rel=").next().unwrap_or(""))
            .collect();
        assert_eq!(rels, ["\"next\"", "\"prev\"", "\"first\"", "\"last\""]);
        assert!(header.starts_with("<http://h/tasks?page=3&per_page=1>"));
    }

    #[test]
    fn absent_links_serialize_as_null() {
        let links = PageLinks::build("/tasks", &[], PageWindow::new(1, 10), 1);
        let v = serde_json::to_value(&links).unwrap();
        assert!(v["next"].is_null());
        assert!(v["prev"].is_null());
        assert_eq!(v["self"], "/tasks?page=1&per_page=10");
    }

    proptest! {
        #[test]
        fn total_pages_and_link_presence(
            total in 0u64..10_000,
            per_page in 1u64..=100,
            page in 1u64..200,
        ) {
            let w = PageWindow::new(page, per_page);
            let pages = w.total_pages(total);
            prop_assert_eq!(pages, (total.max(1) + per_page - 1) / per_page);

            let links = PageLinks::build("/tasks", &[], w, pages);
            prop_assert_eq!(links.prev.is_none(), page == 1);
            prop_assert_eq!(links.next.is_none(), page >= pages);
        }
    }
}
