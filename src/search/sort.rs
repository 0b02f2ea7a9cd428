use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::api::schema::seller::SellerRecord;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    FromA,
    FromZ,
    ManySales,
    FewSales,
    NewFirst,
    OldFirst,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::FromA,
        SortOrder::FromZ,
        SortOrder::ManySales,
        SortOrder::FewSales,
        SortOrder::NewFirst,
        SortOrder::OldFirst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::FromA => "from-a",
            SortOrder::FromZ => "from-z",
            SortOrder::ManySales => "many-sales",
            SortOrder::FewSales => "few-sales",
            SortOrder::NewFirst => "new-first",
            SortOrder::OldFirst => "old-first",
        }
    }

    pub fn compare(&self, a: &SellerRecord, b: &SellerRecord) -> Ordering {
        match self {
            SortOrder::FromA => by_name(a, b),
            SortOrder::FromZ => by_name(b, a),
            SortOrder::ManySales => b.sales().cmp(&a.sales()),
            SortOrder::FewSales => a.sales().cmp(&b.sales()),
            // rows without a date count as oldest
            SortOrder::NewFirst => b.registered_at().cmp(&a.registered_at()),
            SortOrder::OldFirst => a.registered_at().cmp(&b.registered_at()),
        }
    }

    /// Sorted copy; the input is left untouched.
    pub fn sorted(&self, rows: &[SellerRecord]) -> Vec<SellerRecord> {
        let mut out = rows.to_vec();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

fn by_name(a: &SellerRecord, b: &SellerRecord) -> Ordering {
    let (left, right) = (a.display_name(), b.display_name());
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str().replace('-', "") == normalized)
            .ok_or_else(|| AppError::Validation(format!("unknown sort order: {}", s)))
    }
}
