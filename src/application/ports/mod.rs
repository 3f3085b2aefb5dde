//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod session_manager;
mod tts_engine;

pub use session_manager::{SessionHandle, SessionManagerError, SessionManagerPort};
pub use tts_engine::{SpeechSynthesizerPort, SynthesisRequest, SynthesisResponse, TtsError};
