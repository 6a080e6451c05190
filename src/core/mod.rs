pub mod clock;
pub mod config;
pub mod error;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ForkConfig, RateLimitConfig, RenameConfig, CONFIG_FILE};
pub use error::ForkError;
pub use rate_limit::TokenBucket;
