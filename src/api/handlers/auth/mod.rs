pub mod password;
pub mod reset;
pub mod session;
pub mod signin;
pub mod signup;
pub mod state;
pub mod storage;
pub mod types;
pub mod username;
pub mod utils;
pub mod validate;
pub mod verification;

pub use state::{AuthConfig, AuthState};
