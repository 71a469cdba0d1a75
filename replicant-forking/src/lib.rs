//! # Replicant Forking
//!
//! Decides when a cluster client should fork, issuing another parallel attempt
//! against the next replica before the previous attempts have completed.
//!
//! A [ForkingDelaysProvider] maps the remaining [TimeBudget](replicant_model::TimeBudget)
//! and the index of the next attempt to a [ForkingDelay], while a
//! [WaitAnotherResultProvider] decides if a completed result is good enough to
//! stop waiting on the attempts still in flight.
//!
//! Every provider is a pure function of its inputs and never looks at which
//! replica an attempt is sent to.
//!
//! ### Basic Example
//! ```rust
//! use std::time::Duration;
//! use replicant_forking::{EqualDelaysProvider, ForkingDelay, ForkingDelaysProvider};
//! use replicant_model::{Request, TimeBudget};
//!
//! let provider = EqualDelaysProvider::new(3).expect("Valid division factor.");
//! let request = Request::get("/status".parse().unwrap());
//! let budget = TimeBudget::with_remaining(Duration::from_secs(12));
//!
//! let delay = provider.forking_delay(&request, &budget, 0, 5);
//! assert_eq!(delay, ForkingDelay::Wait(Duration::from_secs(4)));
//! ```

#[macro_use]
extern crate tracing;

mod delays;
mod error;
mod strategy;
mod wait;

pub use delays::{
    AdHocEqualDelaysProvider,
    EqualDelaysProvider,
    FixedDelaysProvider,
    ForkingDelay,
    ForkingDelaysProvider,
    TailDelayBehaviour,
};
pub use error::ConfigError;
pub use strategy::ForkingStrategy;
pub use wait::{
    AnyWaitAnotherResult,
    ConstantWaitAnotherResult,
    ResponseCodeWaitAnotherResult,
    WaitAnotherResultProvider,
};
