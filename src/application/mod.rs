//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechSynthesizer、SessionManager）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Session commands
    CloseSessionCommand,
    CloseSessionResponse,
    ExpireIdleSessionsCommand,
    ExpireIdleSessionsResponse,
    OpenSessionCommand,
    OpenSessionResponse,
    StopReadingCommand,
    StopReadingResponse,
    // Playback commands
    PrefetchChunksCommand,
    PrefetchChunksResponse,
    SeekCommand,
    SeekResponse,
    StartPlaybackCommand,
    StartPlaybackResponse,
    UpdatePlaybackPositionCommand,
    UpdatePlaybackPositionResponse,
    // Dictation commands
    IngestRecognitionCommand,
    IngestRecognitionResponse,
    StartDictationCommand,
    StartDictationResponse,
    // Handlers
    handlers::{
        CloseSessionHandler, ExpireIdleSessionsHandler, IngestRecognitionHandler, OpenSessionHandler, PrefetchChunksHandler,
        SeekHandler, StartDictationHandler, StartPlaybackHandler, StopReadingHandler,
        UpdatePlaybackPositionHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Session manager
    SessionHandle,
    SessionManagerError,
    SessionManagerPort,
    // Speech synthesizer
    SpeechSynthesizerPort,
    SynthesisRequest,
    SynthesisResponse,
    TtsError,
};

pub use queries::{
    GetChunks,
    GetDocument,
    // Handlers
    handlers::{ChunkView, DocumentView, GetChunksHandler, GetDocumentHandler, SentenceView, WordView},
};
