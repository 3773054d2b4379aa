//! Transfer Engine
//!
//! Executes one transfer as a single atomic, isolated unit of work.
//!
//! # Lock ordering
//!
//! Both account rows are locked in ascending internal id order, whichever
//! side is the source. Two transfers on the same pair therefore request
//! their locks in the same global order and cannot wait on each other in a
//! cycle.
//!
//! # Attempt lifecycle
//!
//! ```text
//! Validated → Locking → Locked → Checked → Committed
//!     │          │         │         │
//!     └──────────┴─────────┴─────────┴──→ Aborted
//! ```

pub mod engine;
pub mod state;

pub use engine::TransferEngine;
pub use state::{TransferAttempt, TransferState};
