//! autoresize-core — shared building blocks for the RDB volume autoresizer.
//!
//! Holds everything the control loop and the provider adapters agree on:
//!
//! - [`types`]: instance descriptor, volume and metric payloads as the
//!   provider reports them
//! - [`config`]: the immutable [`ResizerConfig`] built once at startup
//! - [`error`]: the [`ResizeError`] taxonomy and its recoverability rules
//! - [`provider`]: the [`Provider`] capability consumed by the engine
//! - [`memory`]: an in-process [`MemoryProvider`] for tests and dry runs
//! - [`units`]: decimal human-readable sizes (`"100GB"`)

pub mod config;
pub mod error;
pub mod memory;
pub mod provider;
pub mod types;
pub mod units;

pub use config::{ConfigBuilder, GuardPolicy, ResizerConfig};
pub use error::{ResizeError, ResizeResult};
pub use memory::MemoryProvider;
pub use provider::{Provider, ProviderFuture};
pub use types::*;
pub use units::{human_size, parse_human_size};
