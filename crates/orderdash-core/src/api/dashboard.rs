//! Typed loaders for the dashboard endpoints.
//!
//! All reads go through the session cache. After a mutation the caller
//! invalidates the affected entries so the next read refetches them.

use std::sync::Arc;

use crate::cache::{CacheHandle, CachedFetcher, FetchError, StorageError};
use crate::models::{
    AggregateStatsData, ApiResponse, Customer, OrderWithCustomerName, OrdersForCustomerResponse,
    PagedResponse, PartialCustomer, PartialOrder, User,
};

use super::RequestContext;

pub const CUSTOMERS_PATH: &str = "/customers";
pub const ORDERS_PATH: &str = "/orders";
pub const USERS_PATH: &str = "/users";
pub const AGGREGATE_STATS_PATH: &str = "/orders/aggregate-stats";

pub fn customers_page_path(page: u32) -> String {
    format!("{}?page={}", CUSTOMERS_PATH, page)
}

pub fn customer_path(customer_id: &str) -> String {
    format!("{}/{}", CUSTOMERS_PATH, customer_id)
}

pub fn customer_orders_path(customer_id: &str) -> String {
    format!("{}/{}/orders", CUSTOMERS_PATH, customer_id)
}

pub fn orders_page_path(page: u32) -> String {
    format!("{}?page={}", ORDERS_PATH, page)
}

pub fn order_path(order_id: &str) -> String {
    format!("{}/{}", ORDERS_PATH, order_id)
}

#[derive(Clone)]
pub struct DashboardApi {
    fetcher: Arc<CachedFetcher>,
}

impl DashboardApi {
    pub fn new(fetcher: Arc<CachedFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub async fn customers(
        &self,
        page: u32,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<PagedResponse<Customer>>, FetchError> {
        self.fetcher.fetch(&customers_page_path(page), ctx).await
    }

    pub async fn customer(
        &self,
        customer_id: &str,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<ApiResponse<PartialCustomer>>, FetchError> {
        self.fetcher.fetch(&customer_path(customer_id), ctx).await
    }

    pub async fn orders_for_customer(
        &self,
        customer_id: &str,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<OrdersForCustomerResponse>, FetchError> {
        self.fetcher.fetch(&customer_orders_path(customer_id), ctx).await
    }

    pub async fn orders(
        &self,
        page: u32,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<PagedResponse<OrderWithCustomerName>>, FetchError> {
        self.fetcher.fetch(&orders_page_path(page), ctx).await
    }

    pub async fn order(
        &self,
        order_id: &str,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<ApiResponse<PartialOrder>>, FetchError> {
        self.fetcher.fetch(&order_path(order_id), ctx).await
    }

    pub async fn aggregate_stats(
        &self,
        ctx: &RequestContext,
    ) -> Result<CacheHandle<ApiResponse<AggregateStatsData>>, FetchError> {
        self.fetcher.fetch(AGGREGATE_STATS_PATH, ctx).await
    }

    pub async fn users(&self, ctx: &RequestContext) -> Result<CacheHandle<ApiResponse<Vec<User>>>, FetchError> {
        self.fetcher.fetch(USERS_PATH, ctx).await
    }

    /// Drop everything an order create/update/delete can change.
    /// `list_pages` is the number of order list pages to forget.
    pub fn order_changed(
        &self,
        order_id: &str,
        customer_id: &str,
        list_pages: u32,
    ) -> Result<(), StorageError> {
        self.fetcher.invalidate(&order_path(order_id))?;
        self.fetcher.invalidate(&customer_orders_path(customer_id))?;
        for page in 1..=list_pages {
            self.fetcher.invalidate(&orders_page_path(page))?;
        }
        self.fetcher.invalidate(AGGREGATE_STATS_PATH)
    }

    /// Drop everything a customer create/update/delete can change.
    pub fn customer_changed(&self, customer_id: &str, list_pages: u32) -> Result<(), StorageError> {
        self.fetcher.invalidate(&customer_path(customer_id))?;
        self.fetcher.invalidate(&customer_orders_path(customer_id))?;
        for page in 1..=list_pages {
            self.fetcher.invalidate(&customers_page_path(page))?;
        }
        self.fetcher.invalidate(AGGREGATE_STATS_PATH)
    }

    pub fn users_changed(&self) -> Result<(), StorageError> {
        self.fetcher.invalidate(USERS_PATH)
    }
}
