use std::fmt::{Display, Formatter};
use std::time::Duration;

use bytes::Bytes;

use crate::Replica;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A response status code.
///
/// Alongside the usual HTTP status codes this includes a set of client side
/// failure codes which describe why no real response was produced.
pub struct ResponseCode(u16);

impl ResponseCode {
    /// No response has been received and the reason is not known.
    pub const UNKNOWN: Self = Self(0);
    pub const OK: Self = Self(200);
    pub const NO_CONTENT: Self = Self(204);
    pub const BAD_REQUEST: Self = Self(400);
    pub const NOT_FOUND: Self = Self(404);
    pub const REQUEST_TIMEOUT: Self = Self(408);
    pub const TOO_MANY_REQUESTS: Self = Self(429);
    /// The connection to the replica could not be established.
    pub const CONNECT_FAILURE: Self = Self(450);
    /// The connection was interrupted while reading the response.
    pub const RECEIVE_FAILURE: Self = Self(451);
    /// The connection was interrupted while sending the request.
    pub const SEND_FAILURE: Self = Self(452);
    /// The transport failed in an unexpected way.
    pub const UNKNOWN_FAILURE: Self = Self(453);
    /// A single-use request body stream was already consumed by another attempt.
    pub const STREAM_REUSE_FAILURE: Self = Self(454);
    /// Reading the local request body stream failed.
    pub const STREAM_INPUT_FAILURE: Self = Self(455);
    /// A single-use request body content was already consumed by another attempt.
    pub const CONTENT_REUSE_FAILURE: Self = Self(456);
    /// Producing the local request body content failed.
    pub const CONTENT_INPUT_FAILURE: Self = Self(457);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    pub const NOT_IMPLEMENTED: Self = Self(501);
    pub const BAD_GATEWAY: Self = Self(502);
    pub const SERVICE_UNAVAILABLE: Self = Self(503);
    pub const GATEWAY_TIMEOUT: Self = Self(504);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.0)
    }

    #[inline]
    pub fn is_client_error(&self) -> bool {
        (400..450).contains(&self.0)
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    /// Returns if the code describes a failure to talk to the replica at all.
    pub fn is_network_error(&self) -> bool {
        matches!(
            *self,
            Self::REQUEST_TIMEOUT
                | Self::CONNECT_FAILURE
                | Self::RECEIVE_FAILURE
                | Self::SEND_FAILURE
        )
    }

    /// Returns if the code describes a failure of the local request body
    /// rather than of the replica.
    ///
    /// These results carry no information about the replica's health.
    pub fn is_stream_or_content_failure(&self) -> bool {
        matches!(
            *self,
            Self::STREAM_REUSE_FAILURE
                | Self::STREAM_INPUT_FAILURE
                | Self::CONTENT_REUSE_FAILURE
                | Self::CONTENT_INPUT_FAILURE
        )
    }
}

impl From<u16> for ResponseCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<http::StatusCode> for ResponseCode {
    fn from(status: http::StatusCode) -> Self {
        Self(status.as_u16())
    }
}

impl std::fmt::Debug for ResponseCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResponseCode({})", self.0)
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The raw response produced by a single attempt.
pub struct Response {
    code: ResponseCode,
    body: Option<Bytes>,
}

impl Response {
    pub fn new(code: ResponseCode) -> Self {
        Self { code, body: None }
    }

    pub fn ok() -> Self {
        Self::new(ResponseCode::OK)
    }

    pub fn unknown() -> Self {
        Self::new(ResponseCode::UNKNOWN)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[inline]
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    #[inline]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// The classification of a response.
pub enum Verdict {
    /// The response is an informative success.
    Accept,
    /// The response is an informative failure.
    Reject,
    /// The response says nothing about the replica.
    DontKnow,
}

impl Verdict {
    #[inline]
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }

    #[inline]
    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject)
    }
}

#[derive(Clone, Debug)]
/// The outcome of one attempt against one replica.
pub struct ReplicaResult {
    replica: Replica,
    response: Response,
    verdict: Verdict,
    elapsed: Duration,
}

impl ReplicaResult {
    pub fn new(
        replica: Replica,
        response: Response,
        verdict: Verdict,
        elapsed: Duration,
    ) -> Self {
        Self {
            replica,
            response,
            verdict,
            elapsed,
        }
    }

    #[inline]
    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    #[inline]
    pub fn response(&self) -> &Response {
        &self.response
    }

    #[inline]
    pub fn code(&self) -> ResponseCode {
        self.response.code()
    }

    #[inline]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[inline]
    /// The time it took for the replica to produce the response.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
