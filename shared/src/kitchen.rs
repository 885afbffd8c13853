//! Kitchen ticket aggregation
//!
//! The kitchen display receives a flat list of lines coming from two order
//! types (table orders from the PDV and online delivery/pickup orders) and
//! shows one ticket per order:
//!
//! - lines sharing `(source, order_id)` form one ticket
//! - a ticket's status is its least advanced line (pending < preparing < ready)
//! - a ticket's age is its earliest line timestamp
//! - tickets come out oldest first, each with a wait-time bucket

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

crate::text_enum! {
    /// Kitchen progress of a single line
    pub enum KitchenStatus {
        Pending => "pending",
        Preparing => "preparing",
        Ready => "ready",
    }
}

impl KitchenStatus {
    /// Priority used to pick a ticket's status; lower is less advanced
    pub const fn priority(&self) -> u8 {
        match self {
            KitchenStatus::Pending => 0,
            KitchenStatus::Preparing => 1,
            KitchenStatus::Ready => 2,
        }
    }

    /// Next step when the cook bumps the line. `Ready` stays `Ready`.
    pub const fn next(&self) -> KitchenStatus {
        match self {
            KitchenStatus::Pending => KitchenStatus::Preparing,
            KitchenStatus::Preparing | KitchenStatus::Ready => KitchenStatus::Ready,
        }
    }
}

impl PartialOrd for KitchenStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KitchenStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

crate::text_enum! {
    /// Which kind of order a line belongs to
    pub enum OrderSource {
        /// `table_order_items` (PDV)
        Table => "table",
        /// `order_items` (online delivery or pickup)
        Delivery => "delivery",
    }
}

impl OrderSource {
    const fn rank(&self) -> u8 {
        match self {
            OrderSource::Table => 0,
            OrderSource::Delivery => 1,
        }
    }
}

/// One line as loaded from either item table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenLine {
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub source: OrderSource,
    /// `table_orders.id` or `orders.id`
    pub order_id: i64,
    /// "Mesa 4" / "#A7K2": what the cook reads
    pub label: String,
    pub item_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub notes: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: KitchenStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenTicketItem {
    pub item_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: KitchenStatus,
    pub created_at: i64,
}

crate::text_enum! {
    /// Coarse wait-time indicator for the display colour
    pub enum WaitBucket {
        OnTime => "on_time",
        Delayed => "delayed",
        Late => "late",
    }
}

/// Minute thresholds separating the wait buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitThresholds {
    /// From this many minutes on, a ticket is `delayed`
    pub warning_minutes: i64,
    /// From this many minutes on, a ticket is `late`
    pub late_minutes: i64,
}

impl Default for WaitThresholds {
    fn default() -> Self {
        Self {
            warning_minutes: 10,
            late_minutes: 20,
        }
    }
}

impl WaitThresholds {
    pub fn bucket(&self, waited_minutes: i64) -> WaitBucket {
        if waited_minutes >= self.late_minutes {
            WaitBucket::Late
        } else if waited_minutes >= self.warning_minutes {
            WaitBucket::Delayed
        } else {
            WaitBucket::OnTime
        }
    }
}

/// Aggregated kitchen ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenTicket {
    pub source: OrderSource,
    pub order_id: i64,
    pub label: String,
    /// Least advanced status among the items
    pub status: KitchenStatus,
    /// Earliest item timestamp
    pub created_at: i64,
    pub wait_minutes: i64,
    pub wait: WaitBucket,
    pub items: Vec<KitchenTicketItem>,
}

/// Kitchen display request: set one line's status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenItemUpdate {
    pub status: KitchenStatus,
}

/// Result of bumping a whole ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAdvance {
    pub source: OrderSource,
    pub order_id: i64,
    /// Status every item now has at least
    pub status: KitchenStatus,
    pub items_changed: u64,
}

/// Group `lines` into tickets, oldest first.
///
/// Ties on age are broken by source (table first) then order id.
pub fn aggregate(
    lines: impl IntoIterator<Item = KitchenLine>,
    now: i64,
    thresholds: &WaitThresholds,
) -> Vec<KitchenTicket> {
    let mut index: HashMap<(OrderSource, i64), usize> = HashMap::new();
    let mut tickets: Vec<KitchenTicket> = Vec::new();

    for line in lines {
        let item = KitchenTicketItem {
            item_id: line.item_id,
            product_name: line.product_name,
            quantity: line.quantity,
            notes: line.notes,
            status: line.status,
            created_at: line.created_at,
        };

        match index.get(&(line.source, line.order_id)) {
            Some(&i) => {
                let ticket = &mut tickets[i];
                ticket.status = ticket.status.min(item.status);
                ticket.created_at = ticket.created_at.min(item.created_at);
                ticket.items.push(item);
            }
            None => {
                index.insert((line.source, line.order_id), tickets.len());
                tickets.push(KitchenTicket {
                    source: line.source,
                    order_id: line.order_id,
                    label: line.label,
                    status: item.status,
                    created_at: item.created_at,
                    wait_minutes: 0,
                    wait: WaitBucket::OnTime,
                    items: vec![item],
                });
            }
        }
    }

    for ticket in &mut tickets {
        let waited_ms = (now - ticket.created_at).max(0);
        ticket.wait_minutes = waited_ms / 60_000;
        ticket.wait = thresholds.bucket(ticket.wait_minutes);
        ticket.items.sort_by_key(|i| (i.created_at, i.item_id));
    }

    tickets.sort_by_key(|t| (t.created_at, t.source.rank(), t.order_id));
    tickets
}

/// Drop tickets whose every item is ready
pub fn outstanding(tickets: Vec<KitchenTicket>) -> Vec<KitchenTicket> {
    tickets
        .into_iter()
        .filter(|t| t.status != KitchenStatus::Ready)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 60_000;

    fn line(
        source: OrderSource,
        order_id: i64,
        item_id: i64,
        status: KitchenStatus,
        created_at: i64,
    ) -> KitchenLine {
        KitchenLine {
            source,
            order_id,
            label: format!("{source}-{order_id}"),
            item_id,
            product_name: format!("item {item_id}"),
            quantity: 1,
            notes: None,
            status,
            created_at,
        }
    }

    #[test]
    fn status_ordering_and_next() {
        assert!(KitchenStatus::Pending < KitchenStatus::Preparing);
        assert!(KitchenStatus::Preparing < KitchenStatus::Ready);
        assert_eq!(KitchenStatus::Pending.next(), KitchenStatus::Preparing);
        assert_eq!(KitchenStatus::Preparing.next(), KitchenStatus::Ready);
        assert_eq!(KitchenStatus::Ready.next(), KitchenStatus::Ready);
    }

    #[test]
    fn empty_input_gives_no_tickets() {
        let tickets = aggregate(Vec::new(), 0, &WaitThresholds::default());
        assert!(tickets.is_empty());
    }

    #[test]
    fn groups_lines_by_order_identity() {
        use KitchenStatus::*;
        let lines = vec![
            line(OrderSource::Table, 1, 10, Ready, 1_000),
            line(OrderSource::Delivery, 7, 70, Pending, 2_000),
            line(OrderSource::Table, 1, 11, Preparing, 3_000),
            line(OrderSource::Delivery, 7, 71, Ready, 500),
        ];

        let tickets = aggregate(lines, 10_000, &WaitThresholds::default());
        assert_eq!(tickets.len(), 2);

        let table = tickets.iter().find(|t| t.source == OrderSource::Table).unwrap();
        assert_eq!(table.items.len(), 2);
        assert_eq!(table.status, Preparing);
        assert_eq!(table.created_at, 1_000);

        let delivery = tickets
            .iter()
            .find(|t| t.source == OrderSource::Delivery)
            .unwrap();
        assert_eq!(delivery.status, Pending);
        assert_eq!(delivery.created_at, 500);
        // items come out in creation order
        assert_eq!(delivery.items[0].item_id, 71);
    }

    #[test]
    fn same_id_in_different_sources_stays_apart() {
        let lines = vec![
            line(OrderSource::Table, 5, 1, KitchenStatus::Pending, 0),
            line(OrderSource::Delivery, 5, 2, KitchenStatus::Pending, 0),
        ];
        let tickets = aggregate(lines, 0, &WaitThresholds::default());
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].source, OrderSource::Table);
        assert_eq!(tickets[1].source, OrderSource::Delivery);
    }

    #[test]
    fn oldest_ticket_first() {
        let lines = vec![
            line(OrderSource::Delivery, 3, 30, KitchenStatus::Pending, 3 * MIN),
            line(OrderSource::Table, 2, 20, KitchenStatus::Pending, 2 * MIN),
            line(OrderSource::Table, 1, 10, KitchenStatus::Pending, 5 * MIN),
            line(OrderSource::Table, 1, 11, KitchenStatus::Pending, MIN),
        ];
        let tickets = aggregate(lines, 10 * MIN, &WaitThresholds::default());
        let order: Vec<i64> = tickets.iter().map(|t| t.order_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn ticket_is_ready_only_when_every_item_is() {
        use KitchenStatus::*;
        let tickets = aggregate(
            vec![
                line(OrderSource::Table, 1, 1, Ready, 0),
                line(OrderSource::Table, 1, 2, Ready, 0),
                line(OrderSource::Table, 2, 3, Ready, 0),
                line(OrderSource::Table, 2, 4, Pending, 0),
            ],
            0,
            &WaitThresholds::default(),
        );
        assert_eq!(tickets[0].status, Ready);
        assert_eq!(tickets[1].status, Pending);

        let open = outstanding(tickets);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].order_id, 2);
    }

    #[test]
    fn wait_buckets_follow_thresholds() {
        let t = WaitThresholds::default();
        assert_eq!(t.bucket(0), WaitBucket::OnTime);
        assert_eq!(t.bucket(9), WaitBucket::OnTime);
        assert_eq!(t.bucket(10), WaitBucket::Delayed);
        assert_eq!(t.bucket(19), WaitBucket::Delayed);
        assert_eq!(t.bucket(20), WaitBucket::Late);

        let now = 100 * MIN;
        let tickets = aggregate(
            vec![
                line(OrderSource::Table, 1, 1, KitchenStatus::Pending, now - 25 * MIN),
                line(OrderSource::Table, 2, 2, KitchenStatus::Pending, now - 12 * MIN - 30_000),
                line(OrderSource::Table, 3, 3, KitchenStatus::Pending, now - MIN),
            ],
            now,
            &t,
        );
        assert_eq!(tickets[0].wait, WaitBucket::Late);
        assert_eq!(tickets[0].wait_minutes, 25);
        assert_eq!(tickets[1].wait, WaitBucket::Delayed);
        assert_eq!(tickets[1].wait_minutes, 12);
        assert_eq!(tickets[2].wait, WaitBucket::OnTime);
    }

    #[test]
    fn future_timestamps_count_as_no_wait() {
        let tickets = aggregate(
            vec![line(OrderSource::Delivery, 1, 1, KitchenStatus::Pending, 5 * MIN)],
            0,
            &WaitThresholds::default(),
        );
        assert_eq!(tickets[0].wait_minutes, 0);
        assert_eq!(tickets[0].wait, WaitBucket::OnTime);
    }
}
