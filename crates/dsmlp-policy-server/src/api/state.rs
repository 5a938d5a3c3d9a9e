use dsmlp_policy_engine::Validator;
use tokio::sync::Semaphore;

pub(crate) struct ApiServerState {
    /// Bounds the number of admission reviews evaluated at the same time
    pub(crate) semaphore: Semaphore,
    pub(crate) validator: Validator,
}
