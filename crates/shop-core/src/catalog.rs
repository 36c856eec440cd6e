//! # Catalog Queries
//!
//! Category filtering, pagination and the category navigation menu.
//!
//! All queries are pure functions over a [`ProductSource`] snapshot. Catalog
//! order is preserved: a page is always a contiguous slice of the filtered
//! products in the order the catalog supplied them.

use crate::error::{ShopError, ShopResult};
use crate::product::{Product, ProductSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parameters for a single catalog page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Exact, case-sensitive category filter; `None` lists every product
    #[serde(default)]
    pub category: Option<String>,

    /// 1-based page number; anything below 1 is read as page 1
    #[serde(default = "default_page")]
    pub page: i64,

    /// Page size chosen by the caller; must be at least 1
    pub items_per_page: i64,
}

fn default_page() -> i64 {
    1
}

impl CatalogQuery {
    /// First page of every category
    pub fn new(items_per_page: i64) -> Self {
        Self {
            category: None,
            page: 1,
            items_per_page,
        }
    }

    /// Builder: restrict to one category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: request a specific page
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
}

/// Paging metadata for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    pub current_page: usize,
    pub items_per_page: usize,
    /// Items matching the active filter, not the whole catalog
    pub total_items: usize,
}

impl PagingInfo {
    pub fn new(current_page: usize, items_per_page: usize, total_items: usize) -> Self {
        Self {
            current_page,
            items_per_page,
            total_items,
        }
    }

    /// `ceil(total_items / items_per_page)`; zero for an empty result
    pub fn total_pages(&self) -> usize {
        if self.items_per_page == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.items_per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// One navigation link per page, with the current page marked selected.
    ///
    /// `url_for` maps a page number to its link target.
    pub fn page_links<F>(&self, url_for: F) -> Vec<PageLink>
    where
        F: Fn(usize) -> String,
    {
        (1..=self.total_pages())
            .map(|page| PageLink {
                page,
                url: url_for(page),
                selected: page == self.current_page,
            })
            .collect()
    }
}

/// A single link in the pager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: usize,
    pub url: String,
    pub selected: bool,
}

/// One page of products plus paging metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub paging_info: PagingInfo,
    /// The filter this page was produced with
    pub current_category: Option<String>,
}

// total_pages is derived, but callers rendering JSON want it alongside the rest
impl Serialize for ProductPage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        #[derive(Serialize)]
        struct PagingView {
            current_page: usize,
            items_per_page: usize,
            total_items: usize,
            total_pages: usize,
        }

        let paging = PagingView {
            current_page: self.paging_info.current_page,
            items_per_page: self.paging_info.items_per_page,
            total_items: self.paging_info.total_items,
            total_pages: self.paging_info.total_pages(),
        };

        let mut state = serializer.serialize_struct("ProductPage", 3)?;
        state.serialize_field("products", &self.products)?;
        state.serialize_field("paging_info", &paging)?;
        state.serialize_field("current_category", &self.current_category)?;
        state.end()
    }
}

/// Category navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMenu {
    /// Distinct category names, sorted ascending
    pub categories: Vec<String>,
    /// Category the shopper is currently browsing, echoed back for highlighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}

impl CategoryMenu {
    /// True if `category` is the one to highlight
    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.as_deref() == Some(category)
    }
}

/// Produce one page of products, optionally filtered by category.
///
/// # Errors
/// `InvalidPageSize` when `items_per_page` is below 1. A page past the end
/// is not an error; it yields an empty product list.
pub fn list_products<S>(source: &S, query: &CatalogQuery) -> ShopResult<ProductPage>
where
    S: ProductSource + ?Sized,
{
    if query.items_per_page < 1 {
        return Err(ShopError::InvalidPageSize {
            items_per_page: query.items_per_page,
        });
    }

    let items_per_page = usize::try_from(query.items_per_page).unwrap_or(usize::MAX);
    let current_page = usize::try_from(query.page.max(1)).unwrap_or(usize::MAX);
    let category = query.category.as_deref();

    let matches = |p: &&Product| match category {
        Some(c) => p.category.as_deref() == Some(c),
        None => true,
    };

    let total_items = source.products().iter().filter(matches).count();
    let skip = (current_page - 1).saturating_mul(items_per_page);

    let products = source
        .products()
        .iter()
        .filter(matches)
        .skip(skip)
        .take(items_per_page)
        .cloned()
        .collect();

    Ok(ProductPage {
        products,
        paging_info: PagingInfo::new(current_page, items_per_page, total_items),
        current_category: query.category.clone(),
    })
}

/// Distinct category names, sorted ascending.
///
/// Uncategorized products (no category, or a blank one) do not form a
/// navigation bucket and are left out.
pub fn list_categories<S>(source: &S) -> Vec<String>
where
    S: ProductSource + ?Sized,
{
    source
        .products()
        .iter()
        .filter_map(Product::category_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Category list plus the currently selected category
pub fn category_menu<S>(source: &S, selected: Option<&str>) -> CategoryMenu
where
    S: ProductSource + ?Sized,
{
    CategoryMenu {
        categories: list_categories(source),
        selected: selected.map(String::from),
    }
}
