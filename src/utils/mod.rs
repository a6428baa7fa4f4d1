// Shared engine utilities - no feature gating
pub mod constants;
mod errors;
mod pool;
mod retry;
mod timeout;
pub mod url;
mod wait_for_element;

pub use errors::{ConfigError, Degraded};
pub use pool::run_bounded;
pub use retry::{retry_linear, retry_linear_if};
pub use timeout::{validate_navigation_timeout, validate_selector_timeout};
pub use wait_for_element::wait_for_any_selector;
