//! Entity record types.
//!
//! # Responsibility
//! - Define `UserRecord`, `ProductRecord` and `OrderRecord`.
//! - Map each record type to its `EntityKind` via the `Record` trait.
//!
//! # Invariants
//! - `EntityKind` string ids are stable; they name store files and tables.
//! - `ProductRecord::price` is an exact decimal, never a binary float.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Externally supplied record identifier.
pub type RecordId = i64;

/// Entity type handled by one validation/insertion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Products,
    Orders,
}

impl EntityKind {
    /// All kinds in insertion phase order.
    pub const ALL: [EntityKind; 3] = [Self::Users, Self::Products, Self::Orders];

    /// Stable string id, also used as the table name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }

    /// File name of the SQLite store owning this kind.
    pub fn store_file_name(self) -> &'static str {
        match self {
            Self::Users => "users.db",
            Self::Products => "products.db",
            Self::Orders => "orders.db",
        }
    }

    /// Capitalized label for report headings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Products => "Products",
            Self::Orders => "Orders",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common shape of every batch record.
pub trait Record {
    /// Entity kind this record type belongs to.
    const KIND: EntityKind;

    /// Identifier used to correlate outcomes and report lines.
    fn id(&self) -> RecordId;
}

/// Raw or validated user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: RecordId,
    /// May be empty in raw input; validation rejects blank names.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserRecord {
    pub fn new(id: RecordId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Record for UserRecord {
    const KIND: EntityKind = EntityKind::Users;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Raw or validated product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: RecordId,
    /// Duplicate names across ids are allowed.
    #[serde(default)]
    pub name: String,
    /// Accepts a JSON string (`"19.99"`) or number.
    pub price: Decimal,
}

impl ProductRecord {
    pub fn new(id: RecordId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

impl Record for ProductRecord {
    const KIND: EntityKind = EntityKind::Products;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Raw or validated order row referencing one user and one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: RecordId,
    pub user_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
}

impl OrderRecord {
    pub fn new(id: RecordId, user_id: RecordId, product_id: RecordId, quantity: i64) -> Self {
        Self {
            id,
            user_id,
            product_id,
            quantity,
        }
    }
}

impl Record for OrderRecord {
    const KIND: EntityKind = EntityKind::Orders;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, ProductRecord};

    #[test]
    fn entity_kind_names_are_stable() {
        assert_eq!(EntityKind::Users.as_str(), "users");
        assert_eq!(EntityKind::Products.store_file_name(), "products.db");
        assert_eq!(EntityKind::Orders.label(), "Orders");
    }

    #[test]
    fn product_price_parses_from_string_and_number() {
        let from_str: ProductRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Mouse", "price": "30.00"}"#)
                .expect("string price should parse");
        let from_number: ProductRecord =
            serde_json::from_str(r#"{"id": 2, "name": "Mouse", "price": 0.01}"#)
                .expect("numeric price should parse");

        assert_eq!(from_str.price.to_string(), "30.00");
        assert!(from_number.price > rust_decimal::Decimal::ZERO);
    }
}
