//! # Meridian Beta Engine
//!
//! This crate estimates single-factor market betas from paired daily return
//! series and aggregates them into a portfolio-level beta.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no I/O and no
//!   knowledge of where returns come from. It depends only on `core-types`.
//! - **Stateless Calculation:** Every function takes its inputs by reference
//!   and produces a value; nothing caller-supplied is ever mutated.
//! - **Degeneracy as contract:** zero market variance and zero total exposure
//!   are documented policy outcomes (`0` and a typed error respectively),
//!   never silent fallbacks.
//!
//! ## Public API
//!
//! - `compute_beta`: covariance/variance beta for one ticker.
//! - `estimate_betas`: betas for a whole returns table against a market index.
//! - `compute_portfolio_beta`: dollar-weighted average beta of a signed book.
//! - `BetaError`: the specific error types that can be returned.

pub mod aggregator;
pub mod error;
pub mod estimator;

pub use aggregator::compute_portfolio_beta;
pub use error::BetaError;
pub use estimator::{compute_beta, estimate_betas};
