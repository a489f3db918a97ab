//! orderdash - a terminal front end for the order/customer dashboard.
//!
//! Every command runs the same navigation guard a page load would, then
//! loads its data through the session cache.

use std::io;

use anyhow::{Context, Result};
use futures::future;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use orderdash_core::api::RequestContext;
use orderdash_core::config::Config;
use orderdash_core::navigation::NavigationResult;
use orderdash_core::utils::{format_date, format_money, truncate_string};
use orderdash_core::Dashboard;

/// Environment variable holding the session cookie to forward
const COOKIE_ENV: &str = "ORDERDASH_COOKIE";

const USAGE: &str = "\
Usage: orderdash <command> [args]

Commands:
  navigate <path>     Run the navigation guards for a route
  get <path>          Fetch an API path through the session cache
  invalidate <path>   Drop the cached entry for an API path
  stats               Show revenue and order totals
  whoami              Show the stored user session
  end-session         Clear all cached responses";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load()?;
    let dashboard = Dashboard::from_config(&config)?;
    let ctx = match std::env::var(COOKIE_ENV) {
        Ok(cookie) => RequestContext::with_cookie(cookie),
        Err(_) => RequestContext::new(),
    };
    info!(command = %command, "orderdash starting");

    match command.as_str() {
        "navigate" => navigate(&dashboard, &ctx, path_arg(&args)?).await,
        "get" => get(&dashboard, &ctx, path_arg(&args)?).await,
        "invalidate" => {
            let path = path_arg(&args)?;
            dashboard.api.fetcher().invalidate(path)?;
            println!("Invalidated {}", dashboard.api.fetcher().keys().build(path));
            Ok(())
        }
        "stats" => stats(&dashboard, &ctx).await,
        "whoami" => {
            let session = dashboard.navigator.guard().session().snapshot();
            println!("{}", serde_json::to_string_pretty(&session)?);
            Ok(())
        }
        "end-session" => {
            dashboard.cache.clear().context("Failed to clear session cache")?;
            println!("Session cache cleared");
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
}

fn path_arg(args: &[String]) -> Result<&str> {
    args.get(1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing <path> argument\n\n{}", USAGE))
}

/// Run the guards; only a navigation that proceeds may load data.
async fn guarded(dashboard: &Dashboard, ctx: &RequestContext, path: &str) -> Result<()> {
    match dashboard.navigator.navigate(path, ctx).await {
        NavigationResult::Proceed(_) => Ok(()),
        NavigationResult::Redirect(to) => Err(anyhow::anyhow!("Redirected to {}", to)),
        NavigationResult::Abort => Err(anyhow::anyhow!("Not allowed to open {}", path)),
        NavigationResult::NotFound(path) => Err(anyhow::anyhow!("No page at {}", path)),
    }
}

async fn navigate(dashboard: &Dashboard, ctx: &RequestContext, path: &str) -> Result<()> {
    match dashboard.navigator.navigate(path, ctx).await {
        NavigationResult::Proceed(route) => println!("-> {} ({})", route.path, route.pattern),
        NavigationResult::Redirect(to) => println!("redirect -> {}", to),
        NavigationResult::Abort => println!("aborted"),
        NavigationResult::NotFound(path) => println!("not found: {}", path),
    }
    Ok(())
}

async fn get(dashboard: &Dashboard, ctx: &RequestContext, path: &str) -> Result<()> {
    let fetcher = dashboard.api.fetcher();
    let key = fetcher.keys().build(path);
    let age = dashboard.cache.age(&key);

    let handle = fetcher.fetch::<serde_json::Value>(path, ctx).await?;
    match age {
        Some(age) => eprintln!("(cached {})", age),
        None => eprintln!("(fetched)"),
    }
    println!("{}", serde_json::to_string_pretty(handle.value())?);
    Ok(())
}

async fn stats(dashboard: &Dashboard, ctx: &RequestContext) -> Result<()> {
    guarded(dashboard, ctx, "/").await?;

    let (stats, first_page) = future::join(
        dashboard.api.aggregate_stats(ctx),
        dashboard.api.orders(1, ctx),
    )
    .await;
    let stats_handle = stats?;
    let stats = &stats_handle.data;
    let orders = first_page?;

    let money = |amount: f64| format_money(amount).unwrap_or_else(|| "-".to_string());
    println!("Revenue:    {}", money(stats.revenue));
    println!("Orders:     {}", stats.order_count);
    println!("Customers:  {}", stats.customer_count);
    if let Some((month, revenue)) = stats.monthly_revenue.best_month() {
        println!("Best month: {} ({})", month, money(revenue));
    }
    for (status, count) in stats.order_status_distribution.totals() {
        println!("  {:<12} {}", status.to_string(), count);
    }

    println!("\nRecent orders:");
    for row in orders.data.iter().take(10) {
        let cost = row
            .order
            .customer_cost_amount()
            .map(money)
            .unwrap_or_else(|| row.order.customer_cost.clone());
        println!(
            "  {}  {:<24} {:>12}  {}",
            format_date(&row.order.order_date),
            truncate_string(&row.customer_name(), 24),
            cost,
            row.order.order_status
        );
    }
    Ok(())
}
