pub const DEFAULT_PER_PAGE: u32 = 10;

/// Page index (1-based) and size of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

/// Client-side slice of a fully fetched collection. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], request: PageRequest) -> &[T] {
    let start = (request.page as usize)
        .saturating_sub(1)
        .saturating_mul(request.per_page as usize);
    if start >= items.len() {
        return &[];
    }
    let end = start
        .saturating_add(request.per_page as usize)
        .min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as usize;
    total.div_ceil(per_page) as u32
}
