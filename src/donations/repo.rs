use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::donations::repo_types::{
    DonationItemRow, DonationListRow, DonationRecord, DonationRow, DonationStatus,
    DonationWithItems, NewDonationItem,
};

#[derive(Debug, Error)]
pub enum DonationError {
    #[error("a donation needs at least one item")]
    EmptyItemList,
    #[error("invalid item: {0}")]
    InvalidItem(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Reject bad input before any row is written.
pub fn validate_items(items: &[NewDonationItem]) -> Result<(), DonationError> {
    if items.is_empty() {
        return Err(DonationError::EmptyItemList);
    }
    for item in items {
        if item.item_name.trim().is_empty() {
            return Err(DonationError::InvalidItem(
                "item name must not be empty".into(),
            ));
        }
        if !item.quantity.is_finite() {
            return Err(DonationError::InvalidItem(
                "quantity must be a finite number".into(),
            ));
        }
        if item.quantity <= 0.0 {
            return Err(DonationError::InvalidItem(
                "quantity must be greater than zero".into(),
            ));
        }
    }
    Ok(())
}

pub struct Donation;

impl Donation {
    /// Create one donation with all of its items in a single transaction.
    /// Either every row lands or none does; created_at comes from Postgres
    /// at commit time.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        items: &[NewDonationItem],
    ) -> Result<DonationRecord, DonationError> {
        validate_items(items)?;

        let mut tx = db.begin().await?;

        let donation = sqlx::query_as::<_, DonationRow>(
            r#"
            INSERT INTO donations (user_id, status)
            VALUES ($1, $2)
            RETURNING id, user_id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(DonationStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let row = sqlx::query_as::<_, DonationItemRow>(
                r#"
                INSERT INTO donation_items (donation_id, item_name, quantity, unit, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, donation_id, item_name, quantity, unit, position
                "#,
            )
            .bind(donation.id)
            .bind(&item.item_name)
            .bind(item.quantity)
            .bind(item.unit.as_str())
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;

        Ok(DonationRecord {
            donation,
            items: rows,
        })
    }

    /// All donations from all users, newest first, each with its items in
    /// input order. The listing is deliberately not scoped to the caller.
    pub async fn list_all(db: &PgPool) -> Result<Vec<DonationWithItems>, DonationError> {
        let donations = sqlx::query_as::<_, DonationListRow>(
            r#"
            SELECT d.id, u.username, d.status, d.created_at
            FROM donations d
            JOIN users u ON u.id = d.user_id
            ORDER BY d.created_at DESC, d.seq DESC
            "#,
        )
        .fetch_all(db)
        .await?;

        let ids: Vec<Uuid> = donations.iter().map(|d| d.id).collect();
        let item_rows = sqlx::query_as::<_, DonationItemRow>(
            r#"
            SELECT id, donation_id, item_name, quantity, unit, position
            FROM donation_items
            WHERE donation_id = ANY($1)
            ORDER BY position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        Ok(group_items(donations, item_rows))
    }
}

/// Attach item rows to their donations, preserving both the donation order
/// and the per-donation item order of the inputs.
fn group_items(
    donations: Vec<DonationListRow>,
    item_rows: Vec<DonationItemRow>,
) -> Vec<DonationWithItems> {
    let mut by_donation: HashMap<Uuid, Vec<DonationItemRow>> = HashMap::new();
    for row in item_rows {
        by_donation.entry(row.donation_id).or_default().push(row);
    }

    donations
        .into_iter()
        .map(|d| DonationWithItems {
            items: by_donation.remove(&d.id).unwrap_or_default(),
            id: d.id,
            username: d.username,
            status: d.status,
            created_at: d.created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donations::repo_types::ItemUnit;
    use time::OffsetDateTime;

    fn item(name: &str, quantity: f64) -> NewDonationItem {
        NewDonationItem {
            item_name: name.into(),
            quantity,
            unit: ItemUnit::Kilogram,
        }
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(
            validate_items(&[]),
            Err(DonationError::EmptyItemList)
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for q in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_items(&[item("Rice", q)]),
                Err(DonationError::InvalidItem(_))
            ));
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            validate_items(&[item("   ", 2.0)]),
            Err(DonationError::InvalidItem(_))
        ));
    }

    #[test]
    fn one_bad_item_fails_the_whole_batch() {
        let items = [item("Rice", 5.0), item("Water", -3.0)];
        assert!(validate_items(&items).is_err());
    }

    #[test]
    fn valid_items_pass() {
        let items = [item("Rice", 5.0), item("Water", 12.0)];
        assert!(validate_items(&items).is_ok());
    }

    fn donation_row(id: Uuid, username: &str) -> DonationListRow {
        DonationListRow {
            id,
            username: username.into(),
            status: "active".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn item_row(donation_id: Uuid, name: &str, position: i32) -> DonationItemRow {
        DonationItemRow {
            id: Uuid::new_v4(),
            donation_id,
            item_name: name.into(),
            quantity: 1.0,
            unit: "unit".into(),
            position,
        }
    }

    #[test]
    fn grouping_keeps_donation_order_and_item_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let donations = vec![donation_row(first, "maria"), donation_row(second, "joao")];
        // item rows arrive sorted by position, interleaved across donations
        let items = vec![
            item_row(second, "Water", 0),
            item_row(first, "Rice", 0),
            item_row(first, "Beans", 1),
            item_row(second, "Soap", 1),
        ];

        let grouped = group_items(donations, items);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, first);
        assert_eq!(grouped[0].username, "maria");
        let names: Vec<_> = grouped[0].items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, ["Rice", "Beans"]);
        let names: Vec<_> = grouped[1].items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, ["Water", "Soap"]);
    }

    #[test]
    fn donation_without_rows_gets_empty_items() {
        // should not happen with real data, but grouping must not panic
        let id = Uuid::new_v4();
        let grouped = group_items(vec![donation_row(id, "maria")], vec![]);
        assert!(grouped[0].items.is_empty());
    }
}
