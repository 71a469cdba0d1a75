mod addr;
mod results;

pub use addr::{make_replica, make_replicas};
pub use results::{accepted, rejected, result_with, unknown};
