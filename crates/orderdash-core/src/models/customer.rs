use serde::{Deserialize, Serialize};

/// Shipping and billing address fields shared by customer records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_zip: Option<String>,
    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_zip: Option<String>,
}

impl Address {
    /// Shipping address on one line, skipping blank parts.
    pub fn shipping_line(&self) -> Option<String> {
        join_address(&[
            &self.shipping_address,
            &self.shipping_city,
            &self.shipping_state,
            &self.shipping_zip,
        ])
    }

    pub fn billing_line(&self) -> Option<String> {
        join_address(&[
            &self.billing_address,
            &self.billing_city,
            &self.billing_state,
            &self.billing_zip,
        ])
    }
}

fn join_address(parts: &[&Option<String>]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
    #[serde(flatten)]
    pub address: Address,
}

impl Customer {
    pub fn full_name(&self) -> String {
        crate::utils::full_name(Some(self.first_name.as_str()), Some(self.last_name.as_str()))
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A customer as the single-customer endpoint returns it: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialCustomer {
    pub customer_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
    #[serde(flatten)]
    pub address: Address,
}

impl PartialCustomer {
    pub fn full_name(&self) -> String {
        crate::utils::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}
