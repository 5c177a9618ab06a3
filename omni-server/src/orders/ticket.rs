//! Ticket Sequencer
//!
//! Ticket numbers come from a per-(partition, business day) counter that
//! storage increments atomically in the same transaction as the order
//! insert. Numbers are pairwise distinct and gap-free per tenant-day; a
//! rolled-back order gives its number back.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::order::OrderView;
use shared::util::utc_date;

use crate::db::{NewOrder, OrderRepository, RepoResult};
use crate::tenant::Partition;

/// Business day of an order: UTC calendar date of its creation
pub fn business_day(created_at_millis: i64) -> NaiveDate {
    utc_date(created_at_millis)
}

#[derive(Clone)]
pub struct TicketSequencer {
    orders: Arc<dyn OrderRepository>,
}

impl TicketSequencer {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Take the next ticket of the order's business day and insert the order
    /// with it, atomically
    pub async fn assign_and_insert(
        &self,
        partition: &Partition,
        order: NewOrder,
    ) -> RepoResult<OrderView> {
        let order = self.orders.insert_with_ticket(partition, order).await?;
        tracing::debug!(
            partition = %partition,
            order_id = %order.id,
            ticket = order.ticket_number,
            day = %order.business_day,
            "Ticket assigned"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TenantRepository;
    use crate::db::memory::MemoryStore;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn new_order(day: NaiveDate) -> NewOrder {
        NewOrder {
            id: Uuid::new_v4(),
            customer_name: "Ada".into(),
            table_number: None,
            total_amount: 600,
            items: vec![],
            business_day: day,
            created_at: 0,
        }
    }

    #[test]
    fn business_day_is_utc_date() {
        // 2026-10-19T23:30:00Z
        assert_eq!(business_day(1_792_452_600_000).to_string(), "2026-10-19");
    }

    #[tokio::test]
    async fn concurrent_orders_get_distinct_gap_free_tickets() {
        let store = Arc::new(MemoryStore::new());
        let partition = Partition::parse("tenant_busy").unwrap();
        store.create_partition(&partition).await.unwrap();
        let sequencer = TicketSequencer::new(store);
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        const N: usize = 64;
        let mut tasks = Vec::new();
        for _ in 0..N {
            let sequencer = sequencer.clone();
            let partition = partition.clone();
            tasks.push(tokio::spawn(async move {
                sequencer
                    .assign_and_insert(&partition, new_order(day))
                    .await
                    .unwrap()
                    .ticket_number
            }));
        }

        let mut tickets = HashSet::new();
        for t in tasks {
            assert!(tickets.insert(t.await.unwrap()));
        }
        let expected: HashSet<i32> = (1..=N as i32).collect();
        assert_eq!(tickets, expected);
    }

    #[tokio::test]
    async fn rejected_insert_gives_its_ticket_back() {
        let store = Arc::new(MemoryStore::new());
        let partition = Partition::parse("tenant_solo").unwrap();
        store.create_partition(&partition).await.unwrap();
        let sequencer = TicketSequencer::new(store);
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let first = new_order(day);
        let replay = NewOrder {
            id: first.id,
            ..new_order(day)
        };
        let first = sequencer.assign_and_insert(&partition, first).await.unwrap();
        assert_eq!(first.ticket_number, 1);

        let err = sequencer.assign_and_insert(&partition, replay).await.unwrap_err();
        assert!(matches!(err, crate::db::RepoError::Duplicate(_)));

        let next = sequencer
            .assign_and_insert(&partition, new_order(day))
            .await
            .unwrap();
        assert_eq!(next.ticket_number, 2);
    }
}
