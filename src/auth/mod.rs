mod log_in;
mod middleware;
mod token;

pub use log_in::{Credentials, LogInState, post_log_in};
pub use middleware::{AuthState, auth_guard};
pub use token::{Claims, DEFAULT_TOKEN_DURATION, TokenKeys, TokenResponse};
