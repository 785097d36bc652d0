//! Comanda core services
//!
//! Order lifecycle, pricing, reporting, and customer enrichment on top of a
//! SQLite-backed document store. The crate exposes plain services meant to
//! be embedded in a host application; there is no network surface here.

pub mod config;
pub mod customers;
pub mod db;
pub mod events;
pub mod orders;
pub mod reports;

pub use config::CoreConfig;
pub use customers::CustomerService;
pub use db::DbService;
pub use events::{OrderEvent, OrderEvents, SubscriptionHandle};
pub use orders::OrderService;
pub use reports::ReportService;
