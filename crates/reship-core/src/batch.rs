use crate::order::Order;
use crate::source::SourceRow;
use chrono::NaiveDate;
use std::collections::HashSet;

/// The day's work: source rows filtered to one ship date and one channel,
/// deduplicated by order id, in source order
///
/// Built once per run by the driver and read-only afterwards. An empty
/// batch is a normal terminal condition, not an error.
#[derive(Debug, Clone, Default)]
pub struct OrderBatch {
    orders: Vec<Order>,
}

impl OrderBatch {
    /// Build a batch from raw source rows
    ///
    /// Keeps rows whose `ship_date` equals `target_date` and whose
    /// `exchange_type` equals `target_channel`. On duplicate order ids the
    /// first occurrence wins. Rows without an order id or with an
    /// unparseable ship date are dropped.
    pub fn build(rows: &[SourceRow], target_date: NaiveDate, target_channel: &str) -> Self {
        let mut seen = HashSet::new();
        let mut orders = Vec::new();

        for row in rows {
            if row.order_id.is_empty() {
                continue;
            }

            let Some(ship_date) = row.ship_date() else {
                tracing::warn!(
                    "Dropping row for order {}: unparseable ship date {:?}",
                    row.order_id,
                    row.ship_date
                );
                continue;
            };

            if ship_date != target_date || row.exchange_type != target_channel {
                continue;
            }

            if !seen.insert(row.order_id.clone()) {
                tracing::debug!("Duplicate order {} dropped, first occurrence wins", row.order_id);
                continue;
            }

            orders.push(Order {
                order_id: row.order_id.clone(),
                tracking_number: row.tracking_number.clone(),
                channel: row.exchange_type.clone(),
            });
        }

        tracing::info!(
            "Batch for {} / {}: {} orders",
            target_date,
            target_channel,
            orders.len()
        );

        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
