use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "canceled")]
    Canceled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::InProgress => write!(f, "In Progress"),
            OrderStatus::Complete => write!(f, "Complete"),
            OrderStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "not paid")]
    NotPaid,
    #[serde(rename = "partially paid")]
    PartiallyPaid,
    #[serde(rename = "fully paid")]
    FullyPaid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::NotPaid => write!(f, "Not Paid"),
            PaymentStatus::PartiallyPaid => write!(f, "Partially Paid"),
            PaymentStatus::FullyPaid => write!(f, "Fully Paid"),
        }
    }
}

/// An order. Money amounts arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub customer_id: String,
    pub order_id: String,
    pub order_date: String,
    pub order_description: Option<String>,
    pub customer_cost: String,
    pub input_expenses: Option<String>,
    pub taxes_fees: Option<String>,
    pub shipping_cost: Option<String>,
    pub total_write_off: Option<String>,
    pub profit: Option<String>,
    pub notes: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

fn parse_amount(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

impl Order {
    pub fn customer_cost_amount(&self) -> Option<f64> {
        parse_amount(Some(&self.customer_cost))
    }

    pub fn profit_amount(&self) -> Option<f64> {
        parse_amount(self.profit.as_deref())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.order_status, OrderStatus::Pending | OrderStatus::InProgress)
    }
}

/// An order as the single-order endpoint returns it: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialOrder {
    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub order_date: Option<String>,
    pub order_description: Option<String>,
    pub customer_cost: Option<String>,
    pub input_expenses: Option<String>,
    pub taxes_fees: Option<String>,
    pub shipping_cost: Option<String>,
    pub total_write_off: Option<String>,
    pub profit: Option<String>,
    pub notes: Option<String>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl PartialOrder {
    pub fn customer_cost_amount(&self) -> Option<f64> {
        parse_amount(self.customer_cost.as_deref())
    }

    pub fn profit_amount(&self) -> Option<f64> {
        parse_amount(self.profit.as_deref())
    }

    /// The full order, if every required field was sent.
    pub fn complete(self) -> Option<Order> {
        Some(Order {
            customer_id: self.customer_id?,
            order_id: self.order_id?,
            order_date: self.order_date?,
            order_description: self.order_description,
            customer_cost: self.customer_cost?,
            input_expenses: self.input_expenses,
            taxes_fees: self.taxes_fees,
            shipping_cost: self.shipping_cost,
            total_write_off: self.total_write_off,
            profit: self.profit,
            notes: self.notes,
            order_status: self.order_status?,
            payment_status: self.payment_status?,
        })
    }
}

/// Order row joined with the owning customer's contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithCustomerName {
    #[serde(flatten)]
    pub order: Order,
    pub order_created_at: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub customer_created_at: Option<String>,
    pub customer_updated_at: Option<String>,
}

impl OrderWithCustomerName {
    pub fn customer_name(&self) -> String {
        crate::utils::full_name(Some(self.first_name.as_str()), Some(self.last_name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_json(status: &str, payment: &str) -> String {
        format!(
            r#"{{"customer_id":"c1","order_id":"o1","order_date":"2024-03-01","order_description":"Mugs",
               "customer_cost":"120.50","input_expenses":null,"taxes_fees":"5.00","shipping_cost":null,
               "total_write_off":null,"profit":"40.25","notes":null,
               "order_status":"{}","payment_status":"{}"}}"#,
            status, payment
        )
    }

    #[test]
    fn test_status_wire_names() {
        let order: Order = serde_json::from_str(&order_json("in progress", "partially paid")).unwrap();
        assert_eq!(order.order_status, OrderStatus::InProgress);
        assert_eq!(order.payment_status, PaymentStatus::PartiallyPaid);
        assert!(order.is_open());

        let back = serde_json::to_value(&order).unwrap();
        assert_eq!(back["order_status"], "in progress");
    }

    #[test]
    fn test_amounts() {
        let order: Order = serde_json::from_str(&order_json("complete", "fully paid")).unwrap();
        assert_eq!(order.customer_cost_amount(), Some(120.5));
        assert_eq!(order.profit_amount(), Some(40.25));
        assert!(!order.is_open());
    }

    #[test]
    fn test_partial_order() {
        let partial: PartialOrder =
            serde_json::from_str(r#"{"order_id":"o1","order_status":"pending","profit":"3.5"}"#).unwrap();
        assert_eq!(partial.order_id.as_deref(), Some("o1"));
        assert_eq!(partial.order_status, Some(OrderStatus::Pending));
        assert_eq!(partial.customer_id, None);
        assert_eq!(partial.profit_amount(), Some(3.5));
        assert!(partial.complete().is_none());

        let full: PartialOrder = serde_json::from_str(&order_json("complete", "fully paid")).unwrap();
        assert_eq!(full.complete().unwrap().customer_id, "c1");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<Order>(&order_json("lost", "not paid")).is_err());
    }
}
