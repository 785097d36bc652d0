//! Core configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | DATABASE_PATH | comanda.db | SQLite database file |
//! | REPORT_QUERY_CAP | 100000 | Max documents scanned per report query |
//! | CUSTOMER_ACTIVE_WINDOW_DAYS | 60 | Trailing window for active customers |

/// Service configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// SQLite database file path
    pub database_path: String,
    /// Upper bound on documents loaded by a single report query
    pub report_query_cap: i64,
    /// A customer counts as active while their last order falls inside
    /// this trailing window
    pub customer_active_window_days: i64,
}

impl CoreConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "comanda.db".into()),
            report_query_cap: std::env::var("REPORT_QUERY_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100_000),
            customer_active_window_days: std::env::var("CUSTOMER_ACTIVE_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
