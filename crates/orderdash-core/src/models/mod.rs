//! Data models for dashboard entities.
//!
//! This module contains the data structures returned by the dashboard API:
//!
//! - `Customer`, `Address`: customer records with shipping/billing details
//! - `Order`, `OrderWithCustomerName`: orders and their status enums
//! - `PartialCustomer`, `PartialOrder`: single-entity payloads, any field optional
//! - `User`, `Role`: dashboard accounts
//! - `AggregateStatsData`: revenue and order-status aggregates for charts
//! - Response envelopes: `ApiResponse`, `PagedResponse`, `Meta`

pub mod customer;
pub mod order;
pub mod response;
pub mod stats;
pub mod user;

pub use customer::{Address, Customer, PartialCustomer};
pub use order::{Order, OrderStatus, OrderWithCustomerName, PartialOrder, PaymentStatus};
pub use response::{ApiResponse, CustomerOrders, Meta, OrdersForCustomerResponse, PagedResponse};
pub use stats::{AggregateStatsData, MonthlyRevenue, OrderStatusDistribution};
pub use user::{Role, User};
