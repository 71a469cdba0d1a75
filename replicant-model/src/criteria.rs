use std::sync::Arc;

use crate::{Response, ResponseCode, Verdict};

/// A single rule used to classify a response.
///
/// Criteria return [Verdict::DontKnow] when they have no opinion about a response,
/// in which case the next criterion in the chain is consulted.
pub trait ResponseCriterion: Send + Sync + 'static {
    fn decide(&self, response: &Response) -> Verdict;
}

#[derive(Debug, Copy, Clone, Default)]
pub struct AlwaysAcceptCriterion;

impl ResponseCriterion for AlwaysAcceptCriterion {
    fn decide(&self, _response: &Response) -> Verdict {
        Verdict::Accept
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct AlwaysRejectCriterion;

impl ResponseCriterion for AlwaysRejectCriterion {
    fn decide(&self, _response: &Response) -> Verdict {
        Verdict::Reject
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Accepts any `2xx` response.
pub struct AcceptSuccessCriterion;

impl ResponseCriterion for AcceptSuccessCriterion {
    fn decide(&self, response: &Response) -> Verdict {
        if response.code().is_successful() {
            Verdict::Accept
        } else {
            Verdict::DontKnow
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Rejects timeouts and connection level failures.
pub struct RejectNetworkErrorsCriterion;

impl ResponseCriterion for RejectNetworkErrorsCriterion {
    fn decide(&self, response: &Response) -> Verdict {
        if response.code().is_network_error() {
            Verdict::Reject
        } else {
            Verdict::DontKnow
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Rejects `5xx` responses, except for `501 Not Implemented` which is
/// a property of the request rather than of the replica.
pub struct RejectServerErrorsCriterion;

impl ResponseCriterion for RejectServerErrorsCriterion {
    fn decide(&self, response: &Response) -> Verdict {
        let code = response.code();
        if code.is_server_error() && code != ResponseCode::NOT_IMPLEMENTED {
            Verdict::Reject
        } else {
            Verdict::DontKnow
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Rejects responses telling the client to back off.
pub struct RejectThrottlingErrorsCriterion;

impl ResponseCriterion for RejectThrottlingErrorsCriterion {
    fn decide(&self, response: &Response) -> Verdict {
        match response.code() {
            ResponseCode::TOO_MANY_REQUESTS | ResponseCode::SERVICE_UNAVAILABLE => {
                Verdict::Reject
            },
            _ => Verdict::DontKnow,
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
/// Rejects responses where nothing is known about what went wrong.
pub struct RejectUnknownErrorsCriterion;

impl ResponseCriterion for RejectUnknownErrorsCriterion {
    fn decide(&self, response: &Response) -> Verdict {
        match response.code() {
            ResponseCode::UNKNOWN | ResponseCode::UNKNOWN_FAILURE => Verdict::Reject,
            _ => Verdict::DontKnow,
        }
    }
}

#[derive(Clone)]
/// An ordered chain of criteria.
///
/// The first criterion to produce an opinion wins.
pub struct ResponseCriteria {
    criteria: Vec<Arc<dyn ResponseCriterion>>,
}

impl ResponseCriteria {
    /// Creates an empty chain, which answers [Verdict::DontKnow] for everything.
    pub fn empty() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Appends a criterion to the end of the chain.
    pub fn with(mut self, criterion: impl ResponseCriterion) -> Self {
        self.criteria.push(Arc::new(criterion));
        self
    }

    pub fn decide(&self, response: &Response) -> Verdict {
        self.criteria
            .iter()
            .map(|criterion| criterion.decide(response))
            .find(|verdict| *verdict != Verdict::DontKnow)
            .unwrap_or(Verdict::DontKnow)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl Default for ResponseCriteria {
    fn default() -> Self {
        Self::empty()
            .with(AcceptSuccessCriterion)
            .with(RejectNetworkErrorsCriterion)
            .with(RejectServerErrorsCriterion)
            .with(RejectThrottlingErrorsCriterion)
            .with(RejectUnknownErrorsCriterion)
            .with(AlwaysAcceptCriterion)
    }
}

impl std::fmt::Debug for ResponseCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCriteria")
            .field("len", &self.criteria.len())
            .finish()
    }
}
