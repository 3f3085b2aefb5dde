//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod dictation_handlers;
mod playback_handlers;
mod session_command_handlers;

pub use dictation_handlers::*;
pub use playback_handlers::*;
pub use session_command_handlers::*;
