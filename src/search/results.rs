use crate::api::schema::seller::SellerRecord;

use super::SortOrder;

/// Rows from the last search plus the ordering they are viewed in.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    rows: Vec<SellerRecord>,
    order: SortOrder,
}

impl SearchResults {
    pub fn new(rows: Vec<SellerRecord>) -> Self {
        SearchResults {
            rows,
            order: SortOrder::default(),
        }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.order = order;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the current order. Rows are stored as received.
    pub fn view(&self) -> Vec<SellerRecord> {
        self.order.sorted(&self.rows)
    }

    /// Writes a refreshed sale count into every row for `seller_id`.
    /// Returns whether any row matched.
    pub fn apply_sale_count(&mut self, seller_id: i64, count: i64) -> bool {
        let mut matched = false;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.seller_id == Some(seller_id))
        {
            row.sale_count = Some(count);
            matched = true;
        }
        matched
    }
}
