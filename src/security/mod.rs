pub mod command_executor;
pub mod token_manager;

pub use command_executor::SafeCommandExecutor;
pub use token_manager::{TokenProvider, TOKEN_ENV_VAR};
