use std::borrow::Cow;
use std::collections::BTreeMap;

use bytes::Bytes;
use http::{Method, Uri};

#[derive(Clone, Debug)]
/// A logical request which is going to be sent to one or more replicas.
///
/// The ordering and forking logic treat this as opaque, it is only passed
/// through for the rare decision which depends on the request itself.
pub struct Request {
    method: Method,
    target: Uri,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, target: Uri) -> Self {
        Self {
            method,
            target,
            body: None,
        }
    }

    pub fn get(target: Uri) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: Uri) -> Self {
        Self::new(Method::POST, target)
    }

    /// Attaches a body to the request.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn target(&self) -> &Uri {
        &self.target
    }

    #[inline]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// The importance of a request, lower priority requests may be shed first.
pub enum RequestPriority {
    Critical,
    Ordinary,
    Sheddable,
}

#[derive(Clone, Debug, Default)]
/// An additional bag of per-request settings.
pub struct RequestParameters {
    priority: Option<RequestPriority>,
    properties: BTreeMap<Cow<'static, str>, String>,
}

impl RequestParameters {
    /// Set the priority of the request.
    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set a custom property which can be inspected by modifiers.
    pub fn with_property(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn priority(&self) -> Option<RequestPriority> {
        self.priority
    }

    #[inline]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.as_str())
    }
}
