//! autoresize-engine — decides when to grow the instance volume, and by how much.
//!
//! # Cycle
//!
//! ```text
//! Idle ─▶ Sampling ─┬─ usage ≤ trigger ───────────────────────────▶ Idle
//!                   └─ usage > trigger ─▶ Validating
//!                         ├─ eligible, target ≤ limit ─▶ Resizing ─▶ Idle
//!                         └─ ineligible or target > limit ─▶ Rejected ─▶ Idle
//! ```
//!
//! `Idle` is the only state carried between ticks. The instance descriptor
//! is fetched again for every decision; nothing is cached across cycles.
//!
//! Every provider call is bounded by the configured query timeout. A failed
//! cycle is logged and the loop moves on to the next tick. Only a guard
//! rejection under [`GuardPolicy::Abort`](autoresize_core::GuardPolicy::Abort)
//! ends the loop early.

mod bounded;
pub mod decision;
pub mod resizer;
pub mod sampler;
pub mod validator;

pub use decision::{CycleOutcome, ResizePlan, exceeds_trigger, plan_resize};
pub use resizer::Autoresizer;
pub use sampler::{DISK_USAGE_METRIC, sample_usage, usage_from_metrics};
pub use validator::{check_eligible, check_preflight};
