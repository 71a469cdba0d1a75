use std::fmt::{Display, Formatter};
use std::str::FromStr;

use http::Uri;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// The identity of a single replica within the target cluster.
///
/// Replicas are immutable and cheap to clone, no component is allowed to
/// invent new replicas, they only ever reorder the set they were given.
pub struct Replica(Uri);

impl Replica {
    pub fn new(uri: Uri) -> Self {
        Self(uri)
    }

    /// Creates a replica from a static URI string.
    ///
    /// # Panics
    /// Panics if the provided string is not a valid URI.
    pub fn from_static(uri: &'static str) -> Self {
        Self(Uri::from_static(uri))
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.0
    }

    #[inline]
    pub fn host(&self) -> Option<&str> {
        self.0.host()
    }
}

impl From<Uri> for Replica {
    fn from(uri: Uri) -> Self {
        Self(uri)
    }
}

impl FromStr for Replica {
    type Err = InvalidReplica;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri = s.parse::<Uri>().map_err(|e| InvalidReplica {
            input: s.to_string(),
            reason: e.to_string(),
        })?;

        if uri.host().is_none() {
            return Err(InvalidReplica {
                input: s.to_string(),
                reason: "replica address must contain a host".to_string(),
            });
        }

        Ok(Self(uri))
    }
}

impl Display for Replica {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid replica address {input:?}: {reason}")]
pub struct InvalidReplica {
    input: String,
    reason: String,
}
