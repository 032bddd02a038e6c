use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The fixed set of measurement units a donation item may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemUnit {
    Liter,
    Kilogram,
    Unit,
    Package,
    Box,
    Bottle,
}

impl ItemUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "liter" => Some(Self::Liter),
            "kilogram" => Some(Self::Kilogram),
            "unit" => Some(Self::Unit),
            "package" => Some(Self::Package),
            "box" => Some(Self::Box),
            "bottle" => Some(Self::Bottle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liter => "liter",
            Self::Kilogram => "kilogram",
            Self::Unit => "unit",
            Self::Package => "package",
            Self::Box => "box",
            Self::Bottle => "bottle",
        }
    }
}

/// Donation lifecycle status. Written once at creation; no operation
/// transitions it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationStatus {
    Active,
    Completed,
    Cancelled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A validated item ready for insertion.
#[derive(Debug, Clone)]
pub struct NewDonationItem {
    pub item_name: String,
    pub quantity: f64,
    pub unit: ItemUnit,
}

/// Donation record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DonationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Donation joined with its owner's username, as read for the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct DonationListRow {
    pub id: Uuid,
    pub username: String,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Donation item record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DonationItemRow {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
    pub position: i32,
}

/// A freshly created donation with its items, in input order.
#[derive(Debug, Clone)]
pub struct DonationRecord {
    pub donation: DonationRow,
    pub items: Vec<DonationItemRow>,
}

/// One dashboard entry: a donation, who made it, and its items in order.
#[derive(Debug, Clone)]
pub struct DonationWithItems {
    pub id: Uuid,
    pub username: String,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub items: Vec<DonationItemRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unit_round_trips_through_parse() {
        for name in ["liter", "kilogram", "unit", "package", "box", "bottle"] {
            let unit = ItemUnit::parse(name).expect("known unit");
            assert_eq!(unit.as_str(), name);
        }
    }

    #[test]
    fn unknown_units_do_not_parse() {
        assert!(ItemUnit::parse("gallon").is_none());
        assert!(ItemUnit::parse("Liter").is_none());
        assert!(ItemUnit::parse("").is_none());
    }
}
