//! Page-number pagination and hypermedia links.
//!
//! Pagination is opt-in: it applies only when `page[number]` or `page[size]`
//! is present. A paginated response carries `self`, `first` and `last`
//! links, plus `prev` when the page number is above 1 and `next` when it is
//! below the page count. An unpaginated response carries only `self`, the
//! URL of the request as received.

use std::ops::Range;

use dicotopo_store::types::Slice;
use serde::Serialize;

use crate::query::{ParseError, QueryParams, make_url};

/// Query parameter carrying the page number.
pub const PAGE_NUMBER: &str = "page[number]";

/// Query parameter carrying the page size.
pub const PAGE_SIZE: &str = "page[size]";

/// Default and maximum page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Size used when `page[size]` is absent.
    pub default_size: u64,
    /// Largest size honored; larger requests are clamped.
    pub max_size: u64,
}

impl PageLimits {
    /// Creates limits.
    pub fn new(default_size: u64, max_size: u64) -> Self {
        Self {
            default_size,
            max_size,
        }
    }
}

/// A requested page, with its size already clamped to the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
    size: u64,
}

impl PageRequest {
    /// Creates a request, clamping `requested_size` to `limits.max_size`.
    ///
    /// Both values are raised to at least 1.
    pub fn new(number: u64, requested_size: u64, limits: PageLimits) -> Self {
        Self {
            number: number.max(1),
            size: requested_size.min(limits.max_size).max(1),
        }
    }

    /// Reads `page[number]` and `page[size]`.
    ///
    /// Returns `Ok(None)` when neither is present. A present value must be
    /// an integer of at least 1.
    pub fn from_params(params: &QueryParams, limits: PageLimits) -> Result<Option<Self>, ParseError> {
        if !params.contains(PAGE_NUMBER) && !params.contains(PAGE_SIZE) {
            return Ok(None);
        }

        let number = parse_positive(params, PAGE_NUMBER)?.unwrap_or(1);
        let size = parse_positive(params, PAGE_SIZE)?.unwrap_or(limits.default_size);
        Ok(Some(Self::new(number, size, limits)))
    }

    /// The 1-based page number.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The effective page size.
    pub fn size(&self) -> u64 {
        self.size
    }
}

fn parse_positive(params: &QueryParams, parameter: &'static str) -> Result<Option<u64>, ParseError> {
    let Some(raw) = params.get(parameter) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n >= 1 => Ok(Some(n)),
        _ => Err(ParseError::InvalidPageParameter {
            parameter,
            value: raw.to_string(),
        }),
    }
}

/// A page placed within a result of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u64,
    size: u64,
    total: u64,
}

impl Page {
    /// Places `request` within `total` items.
    ///
    /// A page number beyond the last page is kept as is; it selects an
    /// empty slice.
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            number: request.number,
            size: request.size,
            total,
        }
    }

    /// The 1-based page number.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The effective page size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Total number of items across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages, at least 1 even for an empty result.
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.size).max(1)
    }

    /// Index of the first item on this page.
    pub fn start(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }

    /// Index one past the last item on this page, never beyond `total`.
    pub fn end(&self) -> u64 {
        self.number.saturating_mul(self.size).min(self.total)
    }

    /// Returns true when the page lies past the last item.
    pub fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }

    /// The store slice selecting this page.
    pub fn slice(&self) -> Slice {
        Slice::new(self.start(), self.size)
    }

    /// The index range selecting this page from a materialized list of
    /// `total` items.
    pub fn range(&self) -> Range<usize> {
        let end = usize::try_from(self.end()).unwrap_or(usize::MAX);
        let start = usize::try_from(self.start()).unwrap_or(usize::MAX).min(end);
        start..end
    }

    /// Returns `params` with the page parameters set to this size and the
    /// given page number.
    pub fn params_for(&self, params: &QueryParams, number: u64) -> QueryParams {
        let mut params = params.clone();
        params.set(PAGE_SIZE, self.size.to_string());
        params.set(PAGE_NUMBER, number.to_string());
        params
    }

    /// Builds the paginated link set on `base_url`.
    ///
    /// Every link carries the request's other parameters unchanged.
    pub fn links(&self, base_url: &str, params: &QueryParams) -> LinkSet {
        let url = |number| make_url(base_url, &self.params_for(params, number));
        let page_count = self.page_count();

        LinkSet {
            self_link: Some(url(self.number)),
            first: Some(url(1)),
            last: Some(url(page_count)),
            prev: (self.number > 1).then(|| url(self.number - 1)),
            next: (self.number < page_count).then(|| url(self.number + 1)),
            ..Default::default()
        }
    }
}

/// A JSON:API `links` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSet {
    /// `self` link.
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// `related` link (relationships only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// First page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl LinkSet {
    /// A link set holding only `self`.
    pub fn unpaginated(url: impl Into<String>) -> Self {
        Self {
            self_link: Some(url.into()),
            ..Default::default()
        }
    }

    /// A relationship link pair.
    pub fn relationship(self_url: impl Into<String>, related_url: impl Into<String>) -> Self {
        Self {
            self_link: Some(self_url.into()),
            related: Some(related_url.into()),
            ..Default::default()
        }
    }

    /// Overlays every link present in `other`.
    pub fn merge(mut self, other: LinkSet) -> Self {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        overlay!(self_link, related, first, last, prev, next);
        self
    }

    /// Returns true when no link is set.
    pub fn is_empty(&self) -> bool {
        *self == LinkSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits {
        default_size: 10,
        max_size: 50,
    };

    fn request(query: &str) -> Option<PageRequest> {
        PageRequest::from_params(&QueryParams::parse(query), LIMITS).unwrap()
    }

    #[test]
    fn test_pagination_is_opt_in() {
        assert_eq!(request("sort=label"), None);
        assert_eq!(request("page[number]=2"), Some(PageRequest::new(2, 10, LIMITS)));
        assert_eq!(request("page[size]=5"), Some(PageRequest::new(1, 5, LIMITS)));
    }

    #[test]
    fn test_size_is_clamped() {
        let page = request("page[size]=500").unwrap();
        assert_eq!(page.size(), 50);
        assert_eq!(page.number(), 1);
    }

    #[test]
    fn test_invalid_page_parameters() {
        for query in ["page[number]=0", "page[number]=x", "page[size]=0", "page[size]=-3", "page[size]="] {
            let err = PageRequest::from_params(&QueryParams::parse(query), LIMITS).unwrap_err();
            assert!(matches!(err, ParseError::InvalidPageParameter { .. }), "{}", query);
        }
    }

    #[test]
    fn test_page_count() {
        let req = PageRequest::new(1, 10, LIMITS);
        assert_eq!(Page::new(req, 0).page_count(), 1);
        assert_eq!(Page::new(req, 10).page_count(), 1);
        assert_eq!(Page::new(req, 11).page_count(), 2);
        assert_eq!(Page::new(req, 23).page_count(), 3);
    }

    #[test]
    fn test_bounds() {
        let page = Page::new(PageRequest::new(3, 10, LIMITS), 23);
        assert_eq!((page.start(), page.end()), (20, 23));
        assert_eq!(page.range(), 20..23);
        assert_eq!(page.slice(), Slice::new(20, 10));

        let past = Page::new(PageRequest::new(7, 10, LIMITS), 23);
        assert!(past.is_empty());
        assert!(past.range().is_empty());
    }

    #[test]
    fn test_range_matches_list_slicing() {
        let items: Vec<u64> = (0..5).collect();
        for number in 1..=4 {
            let page = Page::new(PageRequest::new(number, 2, LIMITS), items.len() as u64);
            let start = ((number - 1) * 2).min(5) as usize;
            let end = (number * 2).min(5) as usize;
            assert_eq!(&items[page.range()], &items[start.min(end)..end]);
        }
    }

    #[test]
    fn test_links_first_middle_last() {
        let params = QueryParams::parse("page[size]=10");
        let base = "http://localhost/places";

        let first = Page::new(PageRequest::new(1, 10, LIMITS), 23).links(base, &params);
        assert!(first.prev.is_none());
        assert!(first.next.is_some());

        let middle = Page::new(PageRequest::new(2, 10, LIMITS), 23).links(base, &params);
        assert!(middle.prev.is_some() && middle.next.is_some());

        let last = Page::new(PageRequest::new(3, 10, LIMITS), 23).links(base, &params);
        assert!(last.prev.is_some());
        assert!(last.next.is_none());
        assert_eq!(
            last.last.as_deref(),
            Some("http://localhost/places?page%5Bsize%5D=10&page%5Bnumber%5D=3")
        );
    }

    #[test]
    fn test_links_keep_other_params() {
        let params = QueryParams::parse("filter[dpt]=01&page[number]=2&sort=-label");
        let page = Page::new(PageRequest::new(2, 10, LIMITS), 30);
        let links = page.links("http://localhost/places", &params);
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost/places?filter%5Bdpt%5D=01&page%5Bnumber%5D=1&sort=-label&page%5Bsize%5D=10")
        );
    }

    #[test]
    fn test_self_link_reparses_to_same_page() {
        let params = QueryParams::parse("page[size]=500&page[number]=4");
        let page = Page::new(PageRequest::from_params(&params, LIMITS).unwrap().unwrap(), 1000);
        let self_link = page.links("http://localhost/places", &params).self_link.unwrap();

        let (_, query) = self_link.split_once('?').unwrap();
        let reparsed = PageRequest::from_params(&QueryParams::parse(query), LIMITS)
            .unwrap()
            .unwrap();
        assert_eq!((reparsed.number(), reparsed.size()), (4, 50));
    }

    #[test]
    fn test_prev_beyond_last_page() {
        let page = Page::new(PageRequest::new(9, 10, LIMITS), 23);
        let links = page.links("http://localhost/places", &QueryParams::new());
        assert!(links.next.is_none());
        assert!(links.prev.as_deref().unwrap().ends_with("page%5Bnumber%5D=8"));
    }

    #[test]
    fn test_link_set_serialization_and_merge() {
        let links = LinkSet::relationship("http://a/rel", "http://a/related").merge(LinkSet {
            self_link: Some("http://a/rel?page".into()),
            first: Some("http://a/first".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "self": "http://a/rel?page",
                "related": "http://a/related",
                "first": "http://a/first"
            })
        );
        assert!(LinkSet::default().is_empty());
    }
}
