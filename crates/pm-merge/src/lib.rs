//! `pm-merge` — discrete-event merge scheduler for the plan_merge framework.
//!
//! Many producers each emit a private, non-decreasing stream of events.
//! The coordinator merges them into one globally time-ordered stream.
//!
//! ```text
//!  producer ─┐  (one thread each, rendezvous channel each)
//!  producer ─┼──▶ registration ──▶ Coordinator ──▶ merged stream ──▶ sink
//!  producer ─┘     channel          (min-heap of heads)
//! ```
//!
//! # Modules
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`channel`]     | `event_channel`, `registration_channel`, `Registrar`, `Registration` |
//! | [`producer`]    | `EventSource`, `spawn_producer`, `ProducerHandle`          |
//! | [`heap`]        | `MergeHeap`, `HeadWithTail`, `Tail`                        |
//! | [`coordinator`] | `Coordinator`, `Phase`, `MergeStats`                       |
//! | [`cancel`]      | `CancelSource`, `CancelToken`, `Waiter`                    |
//! | [`observer`]    | `MergeObserver`, `NoopObserver`                            |
//! | [`pipeline`]    | `MergePipeline`, `RunReport`                               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pm_merge::{CancelToken, MergePipeline, Waiter};
//!
//! let report = MergePipeline::new(MergeConfig::default()).run(sources, |merged| {
//!     let waiter = Waiter::new(CancelToken::never());
//!     let mut out = Vec::new();
//!     while let Ok(Some(event)) = merged.recv(&waiter) {
//!         out.push(event);
//!     }
//!     out
//! })?;
//! ```

pub mod cancel;
pub mod channel;
pub mod coordinator;
pub mod error;
pub mod heap;
pub mod observer;
pub mod pipeline;
pub mod producer;


pub use cancel::{CancelSource, CancelToken, Interrupt, Waiter};
pub use channel::{
    EventReceiver, EventSender, Poll, Registrar, Registration, Registrations, event_channel,
    registration_channel,
};
pub use coordinator::{Coordinator, MergeStats, Phase};
pub use error::{MergeError, MergeResult, WaitPoint};
pub use heap::{HeadWithTail, MergeHeap, Tail};
pub use observer::{MergeObserver, NoopObserver};
pub use pipeline::{MergePipeline, RunReport};
pub use producer::{EventSource, ProducerHandle, ProducerOutcome, ProducerReport, spawn_producer};
