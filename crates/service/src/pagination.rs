//! Pagination and sorting shared by every list operation.
//!
//! `Pagination` normalizes client input, `Page<T>` is the wire envelope and
//! `SortSpec` parses the `sorting` query parameter against a whitelist.

use sea_orm::{ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryOrder, Select};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    #[serde(default = "default_page")]
    pub page: u32,
    /// items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 20 }

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: default_page(), per_page: default_per_page() } }
}

/// One page of results.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let (idx, per_page) = pagination.normalize();
        Self { items, total, page: idx + 1, per_page, total_pages: total.div_ceil(per_page) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection { Asc, Desc }

impl From<SortDirection> for Order {
    fn from(d: SortDirection) -> Self {
        match d {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// A validated `"<field> [asc|desc]"` sorting clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: &str) -> Self { Self { field: field.into(), direction: SortDirection::Asc } }

    pub fn desc(field: &str) -> Self { Self { field: field.into(), direction: SortDirection::Desc } }

    /// Parse `raw` against `allowed` fields; blank input yields `default`.
    pub fn parse(raw: Option<&str>, allowed: &[&str], default: SortSpec) -> Result<Self, ServiceError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(default),
            Some(r) => r,
        };
        let mut parts = raw.split_whitespace();
        let field = parts.next().unwrap_or_default().to_ascii_lowercase();
        let direction = match parts.next().map(|d| d.to_ascii_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => return Err(ServiceError::validation(format!("invalid sort direction '{d}'"))),
        };
        if parts.next().is_some() {
            return Err(ServiceError::validation(format!("invalid sorting '{raw}'")));
        }
        if !allowed.contains(&field.as_str()) {
            return Err(ServiceError::validation(format!(
                "cannot sort by '{field}' (allowed: {})",
                allowed.join(", ")
            )));
        }
        Ok(Self { field, direction })
    }
}

/// Order `select` by `column` in the direction of `spec`.
pub fn order_by<E, C>(select: Select<E>, column: C, spec: &SortSpec) -> Select<E>
where
    E: EntityTrait,
    C: sea_orm::ColumnTrait,
{
    select.order_by(column, Order::from(spec.direction))
}

/// Count and fetch one page of `select`.
pub async fn fetch_page<C, E>(db: &C, select: Select<E>, pagination: Pagination) -> Result<Page<E::Model>, ServiceError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync + 'static,
{
    let (page_idx, per_page) = pagination.normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, total, pagination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn page_envelope_counts_pages() {
        let p = Page::new(vec![1, 2], 41, Pagination::new(3, 20));
        assert_eq!(p.page, 3);
        assert_eq!(p.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages, 0);
        assert_eq!(p.map(|x| x * 10).items, vec![10, 20]);
    }

    #[test]
    fn sort_spec_parsing() {
        let allowed = ["name", "created_at"];
        let default = SortSpec::desc("created_at");
        assert_eq!(SortSpec::parse(None, &allowed, default.clone()).unwrap(), default);
        assert_eq!(SortSpec::parse(Some("  "), &allowed, default.clone()).unwrap(), default);
        assert_eq!(SortSpec::parse(Some("name"), &allowed, default.clone()).unwrap(), SortSpec::asc("name"));
        assert_eq!(SortSpec::parse(Some("Name DESC"), &allowed, default.clone()).unwrap(), SortSpec::desc("name"));
        assert!(SortSpec::parse(Some("status"), &allowed, default.clone()).is_err());
        assert!(SortSpec::parse(Some("name sideways"), &allowed, default.clone()).is_err());
        assert!(SortSpec::parse(Some("name asc extra"), &allowed, default).is_err());
    }
}
