use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `books` table. Serialized with capitalized field names and a
/// numeric `Price`. Absent fields decode to empty values; the table decides
/// what it accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(default)]
pub struct Book {
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Price", with = "rust_decimal::serde::float")]
    pub price: Decimal,
}
