//! Concurrent traversal engine
//!
//! A fixed pool of worker threads pulls pending directories from one shared,
//! growable FIFO queue, classifies every discovered entry, and requeues
//! subdirectories. The scan ends on its own once no directory is being
//! enumerated anywhere and the queue is empty; an interrupt ends it early.
//!
//! # Architecture
//!
//! ```text
//!                  ┌───────────────────────────┐
//!                  │      ScanCoordinator      │
//!                  │  - seeds root, joins pool │
//!                  └────────────┬──────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!  ┌─────▼─────┐          ┌─────▼─────┐          ┌─────▼─────┐
//!  │  Worker 1 │          │  Worker 2 │          │  Worker N │
//!  └─────┬─────┘          └─────┬─────┘          └─────┬─────┘
//!        │    pop / push / finish (termination check)  │
//!        └──────────────────────┼──────────────────────┘
//!                               ▼
//!                 ┌───────────────────────────┐
//!                 │         WorkQueue         │
//!                 │  growable ring + in-flight│
//!                 │  count + shutdown flag    │
//!                 └───────────────────────────┘
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{ScanCoordinator, ScanResult};
pub use queue::WorkQueue;
pub use worker::{Worker, WorkerStats};
