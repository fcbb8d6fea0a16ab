//! Domain Models
//!
//! Structured results returned by the tool adapters. Field names follow what
//! the chat UI renders (`stars`, `lineItems`, ...).
//! Uses `rust_decimal` for monetary values - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Repository summary returned by `github-repo`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
    pub description: String,
    pub stars: u64,
    pub language: String,
}

/// Current conditions returned by `weather-data`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub state: String,
    pub country: String,
    pub temperature: serde_json::Number,
}

/// A single invoice line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Filled with a fresh UUID when the model leaves it out
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl LineItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Invoice as extracted by the model and normalized by `invoice-parser`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub order_id: String,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
}

impl Invoice {
    /// Sum of all line subtotals
    pub fn total(&self) -> Decimal {
        self.line_items.iter().map(LineItem::subtotal).sum()
    }
}
