use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub store_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaleCountBody {
    #[serde(rename = "saleItemQuantity")]
    pub sale_item_quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshSaleCountResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(rename = "saleItemQuantity", default)]
    pub sale_item_quantity: Option<i64>,
    #[serde(default)]
    pub data: Option<SaleCountBody>,
}

impl RefreshSaleCountResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    pub fn sale_count(&self) -> Option<i64> {
        self.sale_item_quantity
            .or_else(|| self.data.as_ref().and_then(|d| d.sale_item_quantity))
    }
}
