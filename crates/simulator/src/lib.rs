//! # Meridian Simulation Engine
//!
//! This crate is the core of the system: the state machine that walks a
//! daily price series, tracks position values, measures portfolio beta,
//! rebalances toward a target under a tolerance band, and accumulates fees
//! and transaction costs into an immutable daily results table.
//!
//! ## Architectural Principles
//!
//! - **One-way data flow:** prices + betas + exchange rates flow in; a
//!   `SimulationRun` (daily results + transaction log) flows out. Reporting
//!   consumes the output read-only; nothing caller-supplied is mutated.
//! - **Strictly sequential:** day N depends on day N-1's ending state, so
//!   there is no parallelism inside a run. Parallelism belongs *across*
//!   independent runs, each on its own inputs.
//! - **All-or-nothing:** hard failures (a missing price, a zero-exposure
//!   book) abort the whole run. Callers get a complete, internally
//!   consistent series or a single typed error, never a truncated one.
//! - **Injected observation:** progress reporting happens through the
//!   `SimulationObserver` seam, not a process-wide console handle, so the
//!   core stays testable without side effects.

pub mod engine;
pub mod error;
pub mod initializer;
pub mod observer;

pub use engine::{SimulationRun, Simulator};
pub use error::SimulationError;
pub use initializer::{initialize_portfolio, InitialAllocation};
pub use observer::{NullObserver, SimulationObserver};
