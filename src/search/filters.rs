use chrono::NaiveDate;

use crate::filters::QueryString;

/// Search form state. Empty fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub q: String,
    pub region: Option<String>,
    pub sales_from: Option<u64>,
    pub sales_to: Option<u64>,
    pub category: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    created_from: Option<NaiveDate>,
    created_to: Option<NaiveDate>,
}

impl SearchFilters {
    pub fn with_text(q: impl Into<String>) -> Self {
        SearchFilters {
            q: q.into(),
            ..Default::default()
        }
    }

    /// Search text, or `None` when blank.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.q.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.date_from, self.date_to)
    }

    pub fn created_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.created_from, self.created_to)
    }

    /// Sets the lower registration bound, pulling the upper bound up if needed.
    pub fn set_date_from(&mut self, date: Option<NaiveDate>) -> &mut Self {
        keep_ordered_from(date, &mut self.date_from, &mut self.date_to);
        self
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) -> &mut Self {
        keep_ordered_to(date, &mut self.date_from, &mut self.date_to);
        self
    }

    pub fn set_created_from(&mut self, date: Option<NaiveDate>) -> &mut Self {
        keep_ordered_from(date, &mut self.created_from, &mut self.created_to);
        self
    }

    pub fn set_created_to(&mut self, date: Option<NaiveDate>) -> &mut Self {
        keep_ordered_to(date, &mut self.created_from, &mut self.created_to);
        self
    }

    pub fn query(&self) -> QueryString {
        let mut qs = QueryString::new();
        qs.push_opt("q", self.text().map(|_| self.q.as_str()))
            .push_opt("region", self.region.as_deref())
            .push_opt("salesFrom", self.sales_from.filter(|&n| n > 0))
            .push_opt("salesTo", self.sales_to.filter(|&n| n > 0))
            .push_opt("dateFrom", self.date_from.map(iso))
            .push_opt("dateTo", self.date_to.map(iso))
            .push_opt("category", self.category.as_deref())
            .push_opt("createdFrom", self.created_from.map(iso))
            .push_opt("createdTo", self.created_to.map(iso));
        qs
    }
}

fn keep_ordered_from(
    date: Option<NaiveDate>,
    from: &mut Option<NaiveDate>,
    to: &mut Option<NaiveDate>,
) {
    if let (Some(new_from), Some(current_to)) = (date, *to) {
        if new_from > current_to {
            *to = Some(new_from);
        }
    }
    *from = date;
}

fn keep_ordered_to(
    date: Option<NaiveDate>,
    from: &mut Option<NaiveDate>,
    to: &mut Option<NaiveDate>,
) {
    if let (Some(new_to), Some(current_from)) = (date, *from) {
        if new_to < current_from {
            *from = Some(new_to);
        }
    }
    *to = date;
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 6, d)
    }

    #[test]
    fn empty_fields_are_omitted() {
        let filters = SearchFilters::with_text("   ");
        assert_eq!(filters.query().render(), "");
        assert!(filters.text().is_none());

        let mut filters = SearchFilters::with_text("Lotus");
        filters.region = Some("77".into());
        filters.sales_from = Some(0);
        filters.sales_to = Some(0);
        filters.category = Some(String::new());
        assert_eq!(filters.query().render(), "q=Lotus&region=77");

        filters.sales_from = Some(5);
        assert_eq!(filters.query().render(), "q=Lotus&region=77&salesFrom=5");
    }

    #[test]
    fn date_bounds_stay_ordered() {
        let mut filters = SearchFilters::default();
        filters.set_date_to(day(10));
        filters.set_date_from(day(20));
        assert_eq!(filters.date_range(), (day(20), day(20)));

        filters.set_date_to(day(5));
        assert_eq!(filters.date_range(), (day(5), day(5)));

        filters.set_created_from(day(3)).set_created_to(day(1));
        assert_eq!(filters.created_range(), (day(1), day(1)));
    }

    #[test]
    fn all_fields_render_once() {
        let mut filters = SearchFilters::with_text("tea");
        filters.sales_to = Some(900);
        filters.set_date_from(day(1)).set_created_to(day(2));
        let qs = filters.query();
        assert_eq!(qs.get("dateFrom"), Some("2024-06-01"));
        assert_eq!(qs.get("createdTo"), Some("2024-06-02"));
        assert_eq!(qs.count("q"), 1);
        assert_eq!(qs.count("dateTo"), 0);
    }
}
