//! Set difference between what the driver has seen and what is live

use shared::models::DriverOrder;
use std::collections::HashSet;

/// Outcome of one refresh
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Refresh {
    /// Orders to announce, in server order
    pub new_orders: Vec<DriverOrder>,
    /// Ids dropped from the seen set (delivered, cancelled, reassigned)
    pub removed: Vec<i64>,
    /// This refresh only seeded the set
    pub seeded: bool,
}

impl Refresh {
    /// Whether the seen set changed and should be saved
    pub fn changed(&self) -> bool {
        self.seeded || !self.new_orders.is_empty() || !self.removed.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct NewOrderTracker {
    /// `None` until the first load
    seen: Option<HashSet<i64>>,
}

impl NewOrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted seen set
    pub fn from_persisted(seen: Option<HashSet<i64>>) -> Self {
        Self { seen }
    }

    pub fn seen(&self) -> Option<&HashSet<i64>> {
        self.seen.as_ref()
    }

    pub fn is_seeded(&self) -> bool {
        self.seen.is_some()
    }

    /// Compare the live orders against the seen set and update it
    pub fn refresh(&mut self, live: &[DriverOrder]) -> Refresh {
        let live_ids: HashSet<i64> = live.iter().map(|o| o.id).collect();

        let Some(seen) = self.seen.as_mut() else {
            self.seen = Some(live_ids);
            return Refresh {
                seeded: true,
                ..Refresh::default()
            };
        };

        let mut removed: Vec<i64> = seen
            .iter()
            .copied()
            .filter(|id| !live_ids.contains(id))
            .collect();
        removed.sort_unstable();
        for id in &removed {
            seen.remove(id);
        }

        // `insert` returning true also dedups repeated ids within one response
        let new_orders = live
            .iter()
            .filter(|order| seen.insert(order.id))
            .cloned()
            .collect();

        Refresh {
            new_orders,
            removed,
            seeded: false,
        }
    }
}
