use serde::{Deserialize, Serialize};

use super::OrderStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub months: Vec<String>,
    pub revenues: Vec<f64>,
}

impl MonthlyRevenue {
    /// (month, revenue) pairs; extra entries on either side are dropped.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.months
            .iter()
            .map(String::as_str)
            .zip(self.revenues.iter().copied())
    }

    pub fn best_month(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for point in self.points() {
            if best.map_or(true, |b| point.1 > b.1) {
                best = Some(point);
            }
        }
        best
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusDistribution {
    pub date: Vec<String>,
    pub statuses: Vec<OrderStatus>,
    pub counts: Vec<u64>,
}

impl OrderStatusDistribution {
    /// Total count per status, summed across dates.
    pub fn totals(&self) -> Vec<(OrderStatus, u64)> {
        let mut totals: Vec<(OrderStatus, u64)> = Vec::new();
        for (status, count) in self.statuses.iter().zip(self.counts.iter()) {
            match totals.iter_mut().find(|(s, _)| s == status) {
                Some(entry) => entry.1 += count,
                None => totals.push((*status, *count)),
            }
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatsData {
    pub revenue: f64,
    pub order_count: u64,
    pub customer_count: u64,
    pub monthly_revenue: MonthlyRevenue,
    pub order_status_distribution: OrderStatusDistribution,
}
