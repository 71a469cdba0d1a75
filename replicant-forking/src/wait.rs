use std::sync::Arc;

use replicant_model::{ReplicaResult, ResponseCode};
use smallvec::SmallVec;

use crate::ConfigError;

/// Decides if the client should keep waiting on attempts which are still in
/// flight after a result has arrived.
pub trait WaitAnotherResultProvider: Send + Sync + 'static {
    fn need_wait_another_result(&self, result: &ReplicaResult) -> bool;
}

#[derive(Debug, Copy, Clone, Default)]
/// Always gives the same answer.
pub struct ConstantWaitAnotherResult(pub bool);

impl WaitAnotherResultProvider for ConstantWaitAnotherResult {
    fn need_wait_another_result(&self, _result: &ReplicaResult) -> bool {
        self.0
    }
}

#[derive(Debug, Clone)]
/// Keeps waiting when the result has one of the given response codes.
pub struct ResponseCodeWaitAnotherResult {
    codes: SmallVec<[ResponseCode; 4]>,
}

impl ResponseCodeWaitAnotherResult {
    pub fn new(codes: impl IntoIterator<Item = ResponseCode>) -> Self {
        let mut codes = codes.into_iter().collect::<SmallVec<[ResponseCode; 4]>>();
        codes.sort_unstable();
        codes.dedup();

        Self { codes }
    }

    #[inline]
    pub fn codes(&self) -> &[ResponseCode] {
        &self.codes
    }
}

impl WaitAnotherResultProvider for ResponseCodeWaitAnotherResult {
    fn need_wait_another_result(&self, result: &ReplicaResult) -> bool {
        self.codes.binary_search(&result.code()).is_ok()
    }
}

#[derive(Clone)]
/// Keeps waiting if any of the inner providers wants to.
pub struct AnyWaitAnotherResult {
    providers: Vec<Arc<dyn WaitAnotherResultProvider>>,
}

impl AnyWaitAnotherResult {
    pub fn new(
        providers: Vec<Arc<dyn WaitAnotherResultProvider>>,
    ) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::EmptyProviders);
        }

        Ok(Self { providers })
    }
}

impl WaitAnotherResultProvider for AnyWaitAnotherResult {
    fn need_wait_another_result(&self, result: &ReplicaResult) -> bool {
        self.providers
            .iter()
            .any(|provider| provider.need_wait_another_result(result))
    }
}
