use std::time::Duration;

use replicant_model::{Replica, ReplicaResult, Response, ResponseCode, Verdict};

/// A result of an attempt which the replica answered successfully.
pub fn accepted(replica: &Replica) -> ReplicaResult {
    result_with(replica, ResponseCode::OK, Verdict::Accept, Duration::from_millis(10))
}

/// A result of an attempt which the replica failed.
pub fn rejected(replica: &Replica) -> ReplicaResult {
    result_with(
        replica,
        ResponseCode::INTERNAL_SERVER_ERROR,
        Verdict::Reject,
        Duration::from_millis(10),
    )
}

/// A result which says nothing about the replica.
pub fn unknown(replica: &Replica) -> ReplicaResult {
    result_with(replica, ResponseCode::UNKNOWN, Verdict::DontKnow, Duration::from_millis(10))
}

pub fn result_with(
    replica: &Replica,
    code: ResponseCode,
    verdict: Verdict,
    elapsed: Duration,
) -> ReplicaResult {
    ReplicaResult::new(replica.clone(), Response::new(code), verdict, elapsed)
}
