//! # Replicant Model
//!
//! The shared vocabulary of the replicant cluster client.
//!
//! Every other replicant crate speaks in terms of these types: a [Replica] is the
//! identity of one addressable instance in the cluster, a [ReplicaResult] records the
//! outcome of one attempt against it, and a [TimeBudget] describes how much time a
//! logical request still has to complete.
//!
//! ### Basic Example
//! ```rust
//! use std::time::Duration;
//! use replicant_model::{Replica, ReplicaResult, Response, ResponseCriteria};
//!
//! let replica = Replica::from_static("http://replica-1:8080/");
//! let response = Response::ok();
//!
//! let verdict = ResponseCriteria::default().decide(&response);
//! let result = ReplicaResult::new(replica, response, verdict, Duration::from_millis(25));
//!
//! assert!(result.verdict().is_accept());
//! ```

mod budget;
mod clock;
mod criteria;
mod replica;
mod request;
mod response;

pub use budget::TimeBudget;
pub use clock::{get_unix_timestamp_ms, Clock, ManualClock, SystemClock};
pub use criteria::{
    AcceptSuccessCriterion,
    AlwaysAcceptCriterion,
    AlwaysRejectCriterion,
    RejectNetworkErrorsCriterion,
    RejectServerErrorsCriterion,
    RejectThrottlingErrorsCriterion,
    RejectUnknownErrorsCriterion,
    ResponseCriteria,
    ResponseCriterion,
};
pub use replica::{InvalidReplica, Replica};
pub use request::{Request, RequestParameters, RequestPriority};
pub use response::{ReplicaResult, Response, ResponseCode, Verdict};
