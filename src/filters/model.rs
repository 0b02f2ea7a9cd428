use chrono::NaiveDate;

use crate::catalog::{Catalog, CategoryNode, CategoryPath, RegionTable};
use crate::error::{AppError, AppResult};

use super::QueryString;

pub const MAX_PAGES: u32 = 50;
pub const MAX_LIMIT: u32 = 1000;

/// Which parser view a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseFlow {
    /// One (sub)category, addressed by its shard and query.
    Subcategory,
    /// Every subcategory under a top-level node, addressed by `main_id`.
    Catalog,
}

impl ParseFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFlow::Subcategory => "subcategory",
            ParseFlow::Catalog => "catalog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    Subcategory(CategoryPath),
    Catalog(usize),
}

impl CategorySelection {
    pub fn flow(&self) -> ParseFlow {
        match self {
            CategorySelection::Subcategory(_) => ParseFlow::Subcategory,
            CategorySelection::Catalog(_) => ParseFlow::Catalog,
        }
    }
}

/// The part of the filters that identifies a prior collection run. Limit
/// and registration dates do not take part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub flow: ParseFlow,
    pub query: QueryString,
}

#[derive(Debug, Clone)]
pub struct ParseFilters {
    pub selection: Option<CategorySelection>,
    pub regions: Vec<String>,
    pub min_sales: u64,
    pub max_sales: Option<u64>,
    pub reg_date: Option<NaiveDate>,
    pub max_reg_date: Option<NaiveDate>,
    pub pages: u32,
    limit: u32,
}

impl Default for ParseFilters {
    fn default() -> Self {
        ParseFilters {
            selection: None,
            regions: Vec::new(),
            min_sales: 0,
            max_sales: None,
            reg_date: None,
            max_reg_date: None,
            pages: 1,
            limit: 0,
        }
    }
}

impl ParseFilters {
    pub fn subcategory(path: impl Into<CategoryPath>) -> Self {
        ParseFilters {
            selection: Some(CategorySelection::Subcategory(path.into())),
            ..Default::default()
        }
    }

    pub fn catalog(root: usize) -> Self {
        ParseFilters {
            selection: Some(CategorySelection::Catalog(root)),
            ..Default::default()
        }
    }

    pub fn flow(&self) -> Option<ParseFlow> {
        self.selection.as_ref().map(CategorySelection::flow)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Clamps into `0..=1000`; negative input becomes 0.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = limit.clamp(0, MAX_LIMIT as i64) as u32;
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn region_id(&self) -> String {
        self.regions.join(",")
    }

    /// Checks everything the form enforces before a request is sent.
    pub fn validate(&self, catalog: &Catalog, regions: &RegionTable) -> AppResult<()> {
        match &self.selection {
            None => return Err(AppError::Validation("select a category first".into())),
            Some(CategorySelection::Subcategory(path)) => {
                if catalog.node(path).is_none() {
                    return Err(AppError::Validation(format!("no category at path {}", path)));
                }
            }
            Some(CategorySelection::Catalog(index)) => match catalog.root(*index) {
                Some(root) if root.id.is_some() => {}
                Some(root) => {
                    return Err(AppError::Validation(format!(
                        "category {} has no catalog id",
                        root.name
                    )));
                }
                None => {
                    return Err(AppError::Validation(format!("no top-level category {}", index)));
                }
            },
        }

        if self.regions.is_empty() {
            return Err(AppError::Validation("select at least one region".into()));
        }
        for code in &self.regions {
            regions.validate(code)?;
        }

        if !(1..=MAX_PAGES).contains(&self.pages) {
            return Err(AppError::Validation(format!(
                "page count must be between 1 and {}",
                MAX_PAGES
            )));
        }

        if let Some(max) = self.sale_ceiling() {
            if max < self.min_sales {
                return Err(AppError::Validation(
                    "max sale count is below min sale count".into(),
                ));
            }
        }

        if let (Some(from), Some(to)) = (self.reg_date, self.max_reg_date) {
            if from > to {
                return Err(AppError::Validation(
                    "min registration date is after max registration date".into(),
                ));
            }
        }

        Ok(())
    }

    /// Upper sale bound; zero means no bound.
    pub fn sale_ceiling(&self) -> Option<u64> {
        self.max_sales.filter(|&max| max > 0)
    }

    /// Query for job creation: every set filter, each exactly once.
    pub fn job_query(&self, catalog: &Catalog) -> AppResult<QueryString> {
        let mut qs = self.base_query(catalog)?;
        qs.push_opt("maxSaleCount", self.sale_ceiling())
            .push_opt("regDate", self.reg_date.map(format_date))
            .push_opt("maxRegDate", self.max_reg_date.map(format_date))
            .push_opt("limit", (self.limit > 0).then_some(self.limit));
        Ok(qs)
    }

    /// Query for the synchronous listing and export endpoints, which take
    /// `limit` unconditionally.
    pub fn listing_query(&self, catalog: &Catalog) -> AppResult<QueryString> {
        let mut qs = self.base_query(catalog)?;
        qs.push("limit", self.limit)
            .push_opt("maxSaleCount", self.sale_ceiling())
            .push_opt("regDate", self.reg_date.map(format_date))
            .push_opt("maxRegDate", self.max_reg_date.map(format_date));
        Ok(qs)
    }

    /// Query for the last-collected lookup, or `None` while the selection is
    /// incomplete.
    pub fn lookup_key(&self, catalog: &Catalog) -> Option<LookupKey> {
        if self.regions.is_empty() {
            return None;
        }
        let mut qs = self.base_query(catalog).ok()?;
        qs.push_opt("maxSaleCount", self.sale_ceiling());
        Some(LookupKey {
            flow: self.flow()?,
            query: qs,
        })
    }

    fn base_query(&self, catalog: &Catalog) -> AppResult<QueryString> {
        let mut qs = match &self.selection {
            Some(CategorySelection::Subcategory(path)) => {
                let node: &CategoryNode = catalog.deepest(path).ok_or_else(|| {
                    AppError::Validation(format!("no category at path {}", path))
                })?;
                let mut qs = QueryString::with_fragment(&node.query);
                qs.push("shard", &node.shard);
                qs
            }
            Some(CategorySelection::Catalog(index)) => {
                let main_id = catalog.root(*index).and_then(|root| root.id).ok_or_else(|| {
                    AppError::Validation(format!("no top-level category {}", index))
                })?;
                let mut qs = QueryString::new();
                qs.push("main_id", main_id);
                qs
            }
            None => return Err(AppError::Validation("select a category first".into())),
        };
        qs.push("region_id", self.region_id())
            .push("saleItemCount", self.min_sales)
            .push("pages", self.pages);
        Ok(qs)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TREE: &str = r#"[
        {"name": "Women", "id": 306, "shard": "women", "query": "cat=8126", "childs": [
            {"name": "Blouses", "shard": "bl_shirts", "query": "cat=8126&subject=41"},
            {"name": "Dresses", "shard": "dresses", "query": "cat=8137"}
        ]},
        {"name": "Misc", "shard": "misc", "query": "cat=1"}
    ]"#;

    fn fixtures() -> (Catalog, RegionTable) {
        (
            Catalog::from_json(TREE).unwrap(),
            RegionTable::from_json(r#"{"77": "Moscow", "50": "Moscow Oblast"}"#).unwrap(),
        )
    }

    #[test]
    fn limit_is_clamped() {
        let mut filters = ParseFilters::default();
        filters.set_limit(-5);
        assert_eq!(filters.limit(), 0);
        filters.set_limit(5000);
        assert_eq!(filters.limit(), 1000);
        filters.set_limit(250);
        assert_eq!(filters.limit(), 250);
    }

    #[test]
    fn missing_category_is_rejected() {
        let (catalog, regions) = fixtures();
        let filters = ParseFilters::default().with_regions(["77"]);
        let err = filters.validate(&catalog, &regions).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(filters.job_query(&catalog).is_err());
    }

    #[test]
    fn page_count_outside_range_is_rejected() {
        let (catalog, regions) = fixtures();
        for pages in [0, 51, 200] {
            let mut filters = ParseFilters::subcategory(vec![0, 1]).with_regions(["77"]);
            filters.pages = pages;
            assert!(filters.validate(&catalog, &regions).is_err(), "pages={}", pages);
        }
        let mut filters = ParseFilters::subcategory(vec![0, 1]).with_regions(["77"]);
        filters.pages = 50;
        assert!(filters.validate(&catalog, &regions).is_ok());
    }

    #[test]
    fn unknown_region_and_inverted_bounds_are_rejected() {
        let (catalog, regions) = fixtures();
        let filters = ParseFilters::subcategory(vec![0]).with_regions(["99"]);
        assert!(filters.validate(&catalog, &regions).is_err());

        let mut filters = ParseFilters::subcategory(vec![0]).with_regions(["77"]);
        filters.min_sales = 10;
        filters.max_sales = Some(5);
        assert!(filters.validate(&catalog, &regions).is_err());

        let filters = ParseFilters::catalog(1).with_regions(["77"]);
        assert!(filters.validate(&catalog, &regions).is_err(), "root without id");
    }

    #[test]
    fn subcategory_job_query_layout() {
        let (catalog, _) = fixtures();
        let mut filters = ParseFilters::subcategory(vec![0, 1]).with_regions(["77"]);
        filters.min_sales = 10;
        let qs = filters.job_query(&catalog).unwrap().render();
        assert_eq!(
            qs,
            "cat=8137&shard=dresses&region_id=77&saleItemCount=10&pages=1"
        );
    }

    #[test]
    fn catalog_job_query_with_optionals() {
        let (catalog, _) = fixtures();
        let mut filters = ParseFilters::catalog(0).with_regions(["77", "50"]);
        filters.max_sales = Some(500);
        filters.reg_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        filters.set_limit(100);
        let qs = filters.job_query(&catalog).unwrap();
        assert_eq!(qs.get("main_id"), Some("306"));
        assert_eq!(qs.get("region_id"), Some("77,50"));
        assert_eq!(qs.get("maxSaleCount"), Some("500"));
        assert_eq!(qs.get("regDate"), Some("2024-01-31"));
        assert_eq!(qs.get("limit"), Some("100"));
        assert_eq!(qs.count("maxRegDate"), 0);
    }

    #[test]
    fn lookup_ignores_limit_and_dates() {
        let (catalog, _) = fixtures();
        let mut a = ParseFilters::subcategory(vec![0, 0]).with_regions(["77"]);
        let key_a = a.lookup_key(&catalog).unwrap();
        a.set_limit(10);
        a.reg_date = NaiveDate::from_ymd_opt(2023, 5, 1);
        assert_eq!(a.lookup_key(&catalog).unwrap(), key_a);
        a.pages = 3;
        assert_ne!(a.lookup_key(&catalog).unwrap(), key_a);
    }

    #[test]
    fn lookup_needs_category_and_region() {
        let (catalog, _) = fixtures();
        assert!(ParseFilters::subcategory(vec![0]).lookup_key(&catalog).is_none());
        assert!(ParseFilters::default().with_regions(["77"]).lookup_key(&catalog).is_none());
    }

    #[test]
    fn zero_max_sales_means_no_ceiling() {
        let (catalog, regions) = fixtures();
        let mut filters = ParseFilters::subcategory(vec![0, 0]).with_regions(["77"]);
        filters.min_sales = 10;
        filters.max_sales = Some(0);
        assert!(filters.validate(&catalog, &regions).is_ok());
        assert_eq!(filters.job_query(&catalog).unwrap().count("maxSaleCount"), 0);
        assert_eq!(filters.listing_query(&catalog).unwrap().count("maxSaleCount"), 0);
        let key = filters.lookup_key(&catalog).unwrap();
        assert_eq!(key.query.count("maxSaleCount"), 0);
        filters.max_sales = None;
        assert_eq!(filters.lookup_key(&catalog).unwrap(), key);
    }

    proptest! {
        #[test]
        fn optionals_appear_once_or_not_at_all(
            max_sales in proptest::option::of(0u64..10_000),
            reg_day in proptest::option::of(1u32..28),
            max_reg_day in proptest::option::of(1u32..28),
            limit in -100i64..2000,
            pages in 1u32..=50,
            min_sales in 0u64..100,
        ) {
            let (catalog, _) = fixtures();
            let mut filters = ParseFilters::subcategory(vec![0, 1]).with_regions(["77"]);
            filters.max_sales = max_sales;
            filters.reg_date = reg_day.and_then(|d| NaiveDate::from_ymd_opt(2024, 2, d));
            filters.max_reg_date = max_reg_day.and_then(|d| NaiveDate::from_ymd_opt(2024, 3, d));
            filters.set_limit(limit);
            filters.pages = pages;
            filters.min_sales = min_sales;

            let qs = filters.job_query(&catalog).unwrap();
            let expect = |present: bool| if present { 1 } else { 0 };
            prop_assert_eq!(qs.count("maxSaleCount"), expect(max_sales.is_some_and(|n| n > 0)));
            prop_assert_eq!(qs.count("regDate"), expect(reg_day.is_some()));
            prop_assert_eq!(qs.count("maxRegDate"), expect(max_reg_day.is_some()));
            prop_assert_eq!(qs.count("limit"), expect(limit > 0));
            for key in ["shard", "region_id", "saleItemCount", "pages"] {
                prop_assert_eq!(qs.count(key), 1);
            }
        }
    }
}
