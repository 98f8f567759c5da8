//! # Meridian Market Data
//!
//! The peripheral data collaborator for the simulation core. This crate
//! loads, validates, and repairs the inputs the simulator treats as given:
//! a cleaned price table, per-ticker daily returns, and an exchange-rate
//! series that covers every simulation date.
//!
//! ## Architectural Principles
//!
//! - **Validation before simulation:** the core assumes a valid price table
//!   and never re-validates. Everything that can be wrong with the data
//!   (gaps, non-positive prices, missing tickers, too little history) is
//!   caught here, before the loop starts.
//! - **Repair is explicit:** missing prices are filled forward then backward
//!   by `fill_missing`, and every fill is logged as a data-quality warning.
//!
//! ## Public API
//!
//! - `load_price_table` / `read_price_table`: wide-format CSV ingestion.
//! - `validate_price_table`, `fill_missing`: the preprocessing contract.
//! - `daily_returns`: fractional day-over-day returns, first day zero.
//! - `constant_rates`, `load_rate_series`, `forward_fill_rates`: USD/CAD.
//! - `synthetic`: deterministic price fabrication for demos and tests.

pub mod error;
pub mod prices;
pub mod rates;
pub mod returns;
pub mod synthetic;

pub use error::MarketDataError;
pub use prices::{fill_missing, load_price_table, read_price_table, validate_price_table};
pub use rates::{constant_rates, forward_fill_rates, load_rate_series};
pub use returns::daily_returns;
pub use synthetic::{business_days, trending_prices, SyntheticSeries};
