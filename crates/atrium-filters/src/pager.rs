//! Page-window computation and navigation links
//!
//! The pager is a pure function of its constructor inputs plus read-only
//! access to the current request URI. Degenerate inputs (negative,
//! out-of-range, tampered) never panic: every input passes through an
//! absolute value and the page clamps into `[1, total_pages]`.

use atrium_core::RequestContext;

/// Default page size for admin lists
const DEFAULT_PAGE_SIZE: u64 = 10;

/// Default number of page links shown per group
const DEFAULT_GROUP_SIZE: u64 = 10;

/// Placeholder substituted with the target page number in URL templates
const PAGE_PLACEHOLDER: &str = "{page}";

/// One element of the rendered pager control strip
///
/// A None URL means the control is present but disabled (first/prev on
/// page one, next/last on the last page); an active page marker carries
/// no URL either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerLink {
    First { url: Option<String> },
    Prev { url: Option<String> },
    /// "..." jump to the last page of the previous group
    GapPrev { url: String },
    /// Numbered page link; url is None for the current page
    Page { number: u64, url: Option<String> },
    /// "..." jump to the first page of the next group
    GapNext { url: String },
    Next { url: Option<String> },
    Last { url: Option<String> },
    /// Direct-access numeric input, shown when more than one page exists
    DirectInput { total_pages: u64 },
}

/// Page window over a fixed-size, zero-indexed collection
#[derive(Debug, Clone)]
pub struct Pager {
    pub current_page: u64,
    pub total_elements: u64,
    pub page_size: u64,
    pub group_size: u64,
    pub total_pages: u64,
    /// Zero-based index of the first element on the current page
    pub index_start: u64,
    /// Zero-based index of the last element on the current page
    pub index_end: u64,
    pub current_group: u64,
    /// First page number of the visible group window
    pub group_index_start: u64,
    /// Last page number of the visible group window
    pub group_index_end: u64,

    /// Explicit URL template overriding request-derived links
    base_url: Option<String>,

    /// Fragment appended to every generated link
    fragment: Option<String>,

    /// Name of the page-number query parameter
    var_page: String,
}

impl Pager {
    /// Build a pager with explicit page and group sizes
    ///
    /// Signed inputs are a legacy defense: negatives are taken as their
    /// absolute value before any computation.
    pub fn new(current_page: i64, total_elements: i64, page_size: i64, group_size: i64) -> Self {
        let total_elements = total_elements.unsigned_abs();
        let page_size = page_size.unsigned_abs().max(1);
        let group_size = group_size.unsigned_abs().max(1);

        let total_pages = (total_elements.div_ceil(page_size)).max(1);
        let current_page = current_page.unsigned_abs().clamp(1, total_pages);

        let index_start = (current_page - 1) * page_size;
        let index_end = if total_elements == 0 {
            0
        } else {
            (index_start + page_size - 1).min(total_elements - 1)
        };

        let current_group = current_page.div_ceil(group_size);
        let group_index_start = (current_group - 1) * group_size + 1;
        let group_index_end = (group_index_start + group_size - 1).min(total_pages);

        Self {
            current_page,
            total_elements,
            page_size,
            group_size,
            total_pages,
            index_start,
            index_end,
            current_group,
            group_index_start,
            group_index_end,
            base_url: None,
            fragment: None,
            var_page: "page".to_string(),
        }
    }

    /// Build a pager with the default page and group sizes (10/10)
    pub fn with_defaults(current_page: i64, total_elements: i64) -> Self {
        Self::new(
            current_page,
            total_elements,
            DEFAULT_PAGE_SIZE as i64,
            DEFAULT_GROUP_SIZE as i64,
        )
    }

    /// Override link derivation with an explicit template containing the
    /// `{page}` placeholder
    pub fn set_base_url(&mut self, template: impl Into<String>) {
        self.base_url = Some(template.into());
    }

    /// Append a fragment (`#anchor`) to every generated link
    pub fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.fragment = Some(fragment.into());
    }

    /// Rename the page-number query parameter
    pub fn set_var_page(&mut self, name: impl Into<String>) {
        self.var_page = name.into();
    }

    /// Link URL for one page
    ///
    /// Without an explicit template, the current request's path and query
    /// are reused with the page-number and session-id parameters stripped
    /// and the target page number reinjected.
    pub fn url_for(&self, ctx: &RequestContext, page: u64) -> String {
        let mut url = match &self.base_url {
            Some(template) => template.replace(PAGE_PLACEHOLDER, &page.to_string()),
            None => {
                let base = ctx.url_without(&[self.var_page.as_str()]);
                let sep = if base.contains('?') { '&' } else { '?' };
                format!("{base}{sep}{}={page}", self.var_page)
            }
        };
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }

    /// Produce the navigation strip; empty when the collection is empty
    pub fn links(&self, ctx: &RequestContext) -> Vec<PagerLink> {
        if self.total_elements == 0 {
            return Vec::new();
        }

        let mut links = Vec::new();
        let at_first = self.current_page == 1;
        let at_last = self.current_page == self.total_pages;

        links.push(PagerLink::First {
            url: (!at_first).then(|| self.url_for(ctx, 1)),
        });
        links.push(PagerLink::Prev {
            url: (!at_first).then(|| self.url_for(ctx, self.current_page - 1)),
        });

        if self.group_index_start > 1 {
            links.push(PagerLink::GapPrev {
                url: self.url_for(ctx, self.group_index_start - 1),
            });
        }

        for number in self.group_index_start..=self.group_index_end {
            links.push(PagerLink::Page {
                number,
                url: (number != self.current_page).then(|| self.url_for(ctx, number)),
            });
        }

        if self.group_index_end < self.total_pages {
            links.push(PagerLink::GapNext {
                url: self.url_for(ctx, self.group_index_end + 1),
            });
        }

        links.push(PagerLink::Next {
            url: (!at_last).then(|| self.url_for(ctx, self.current_page + 1)),
        });
        links.push(PagerLink::Last {
            url: (!at_last).then(|| self.url_for(ctx, self.total_pages)),
        });

        if self.total_pages > 1 {
            links.push(PagerLink::DirectInput {
                total_pages: self.total_pages,
            });
        }

        links
    }
}
