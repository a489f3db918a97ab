use serde::{Deserialize, Serialize};

use super::{Customer, Order};

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl Meta {
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Standard `{ status, message, data }` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Envelope for list endpoints that also return pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: Vec<T>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrders {
    pub orders: Vec<Order>,
    pub customer: Customer,
}

/// Orders of one customer, with the customer record and pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersForCustomerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: CustomerOrders,
    pub meta: Meta,
}
