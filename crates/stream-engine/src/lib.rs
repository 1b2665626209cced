//! Stream engine and orchestrator.
//!
//! A [`StreamEngine`] repeatedly generates a record, writes it to its sink,
//! commits every `commit_after_rows` rows and paces itself to a target rate
//! until its timeout expires, its row limit is reached, or the shared
//! [`StopSignal`] fires. The [`Orchestrator`] launches one engine per
//! dedicated worker thread and every engine releases the shared
//! [`CompletionBarrier`] exactly once, whatever path it takes out.
//!
//! ```text
//!  Orchestrator ──launches──▶ StreamEngine ──pulls──▶ RowGenerator
//!       │                          │                        │
//!       │                          ├──writes/commits──▶ Sink│
//!       ▼                          ▼                        ▼
//!  WorkerPool (1 thread       CompletionBarrier      GenerationContext
//!  per stream)                (count down once)      (shared, read-only)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use culvert_core::RunConfig;
//! use ingest_sink::NullSinkFactory;
//! use row_generator::GenerationContext;
//! use stream_engine::{CompletionBarrier, Orchestrator};
//!
//! let config = RunConfig::builtin();
//! let context = Arc::new(GenerationContext::build(config.lookup_table_size, config.seed).unwrap());
//! let mut orchestrator =
//!     Orchestrator::from_run_config(&config, context, Arc::new(NullSinkFactory)).unwrap();
//!
//! let barrier = CompletionBarrier::new(orchestrator.stream_count());
//! orchestrator.run(&barrier).unwrap();
//! barrier.wait();
//!
//! let report = orchestrator.join();
//! assert!(report.all_succeeded());
//! ```

pub mod barrier;
pub mod error;
pub mod orchestrator;
pub mod pacer;
pub mod pool;
pub mod report;
pub mod stop;
pub mod stream;

pub use barrier::{BarrierGuard, CompletionBarrier};
pub use error::EngineError;
pub use orchestrator::Orchestrator;
pub use pacer::Pacer;
pub use pool::{TaskOutcome, WorkerPool};
pub use report::{RunReport, StopReason, StreamReport};
pub use stop::StopSignal;
pub use stream::{StreamConfig, StreamEngine, StreamState, StreamStatus};
