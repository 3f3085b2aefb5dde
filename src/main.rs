//! readalong - 朗读高亮演示程序
//!
//! 读取文本（文件或 stdin），通过模拟合成器预取全部块，
//! 按模拟播放时钟输出高亮变化，再演示一段听写对齐，
//! 最后打印文档 JSON。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use readalong::application::{
    CloseSessionCommand, CloseSessionHandler, ExpireIdleSessionsCommand, ExpireIdleSessionsHandler,
    GetChunks, GetChunksHandler, GetDocument, GetDocumentHandler, IngestRecognitionCommand,
    IngestRecognitionHandler, OpenSessionCommand, OpenSessionHandler, PrefetchChunksCommand,
    PrefetchChunksHandler, SpeechSynthesizerPort, StartDictationCommand, StartDictationHandler,
    StartPlaybackCommand, StartPlaybackHandler, StopReadingCommand, StopReadingHandler,
    UpdatePlaybackPositionCommand, UpdatePlaybackPositionHandler,
};
use readalong::config::{load_config, print_config, AppConfig};
use readalong::domain::alignment::RecognizedWord;
use readalong::infrastructure::adapters::{FakeTtsClient, FakeTtsClientConfig};
use readalong::infrastructure::events::{EventPublisher, ReadingEvent};
use readalong::infrastructure::memory::InMemorySessionManager;
use readalong::infrastructure::worker::{ChunkPrefetchWorker, PrefetchWorkerConfig};
use tokio::io::AsyncReadExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;

/// 模拟播放时钟步长（秒）
const CLOCK_STEP: f64 = 0.05;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    init_tracing(&config);

    tracing::info!("readalong - 朗读高亮演示");
    print_config(&config);

    let text = read_input().await?;

    // 创建事件发布器和内存会话管理器
    let event_publisher = EventPublisher::new().arc();
    let session_manager = InMemorySessionManager::new().arc();

    // 创建模拟合成器
    let synthesizer = Arc::new(FakeTtsClient::new(FakeTtsClientConfig {
        timing_format: config.tts.timing_format,
        chars_per_second: config.tts.chars_per_second,
        latency_ms: config.tts.latency_ms,
        per_character_separators: config.timing.per_character_separators,
        per_grapheme_separators: config.timing.per_grapheme_separators,
        fail_chunk_ids: Vec::new(),
        available: true,
    }));
    anyhow::ensure!(
        synthesizer.health_check().await,
        "Speech synthesizer health check failed"
    );

    // 创建预取队列和 Worker
    let (job_tx, job_rx) = mpsc::channel(config.prefetch.queue_capacity);
    let worker = ChunkPrefetchWorker::new(
        PrefetchWorkerConfig {
            max_concurrent: config.prefetch.max_concurrent,
        },
        job_rx,
        session_manager.clone(),
        synthesizer,
        event_publisher.clone(),
    );
    let worker = tokio::spawn(worker.run());
    spawn_session_sweeper(
        ExpireIdleSessionsHandler::new(session_manager.clone(), event_publisher.clone()),
        config.session.idle_timeout_secs,
    );

    // 打开会话
    let opened = OpenSessionHandler::new(session_manager.clone(), config.session_settings())
        .handle(OpenSessionCommand { text })
        .await?;
    let session_id = opened.session_id.clone();
    println!(
        "session {}: {} sentences, {} words, {} chunks",
        session_id, opened.sentence_count, opened.word_count, opened.chunk_count
    );
    if opened.chunk_count == 0 {
        println!("nothing to read");
        return Ok(());
    }

    spawn_event_logger(event_publisher.register_session(&session_id));
    let words = word_texts(&session_manager, &session_id).await?;

    // 预取全部块；处理器释放后队列关闭，Worker 处理完剩余任务即退出
    let prefetch = PrefetchChunksHandler::new(session_manager.clone(), job_tx);
    let queued = prefetch
        .handle(PrefetchChunksCommand {
            session_id: session_id.clone(),
            chunk_ids: Vec::new(),
        })
        .await?;
    tracing::info!(queued = queued.queued.len(), "Chunks queued for synthesis");
    drop(prefetch);
    worker.await.context("prefetch worker panicked")?;

    let chunks = GetChunksHandler::new(session_manager.clone())
        .handle(GetChunks {
            session_id: session_id.clone(),
        })
        .await?;
    let mut ready = Vec::new();
    for chunk in chunks {
        match chunk.error {
            Some(error) => println!("chunk {} failed: {}", chunk.id, error),
            None if chunk.status == "ready" => ready.push(chunk.id),
            None => println!("chunk {} not loaded ({})", chunk.id, chunk.status),
        }
    }

    // 模拟播放
    let start = StartPlaybackHandler::new(session_manager.clone());
    let position =
        UpdatePlaybackPositionHandler::new(session_manager.clone(), event_publisher.clone());
    for chunk_id in ready {
        let started = start
            .handle(StartPlaybackCommand {
                session_id: session_id.clone(),
                chunk_id,
            })
            .await?;
        let duration = started.duration_secs.unwrap_or(0.0);
        println!(
            "-- chunk {} ({:.2}s, {} words timed)",
            chunk_id, duration, started.timed_words
        );

        let mut clock = 0.0;
        while clock <= duration {
            let response = position
                .handle(UpdatePlaybackPositionCommand {
                    session_id: session_id.clone(),
                    time_seconds: clock,
                })
                .await?;
            if let (true, Some(word)) = (response.highlight.changed, response.highlight.word_index)
            {
                let text = words.get(word).map(String::as_str).unwrap_or("?");
                println!("  [{:6.2}s] word {:4} {}", clock, word, text);
            }
            clock += CLOCK_STEP;
        }
    }

    // 听写演示：把第一句读出来，夹一个口头语
    StartDictationHandler::new(session_manager.clone())
        .handle(StartDictationCommand {
            session_id: session_id.clone(),
        })
        .await?;
    let recognized = simulated_recognition(&words);
    let ingested = IngestRecognitionHandler::new(session_manager.clone(), event_publisher.clone())
        .handle(IngestRecognitionCommand {
            session_id: session_id.clone(),
            words: recognized,
        })
        .await?;
    println!(
        "-- dictation: last match {:?}, cursor {}",
        ingested.matched_word, ingested.aligner_cursor
    );

    StopReadingHandler::new(session_manager.clone())
        .handle(StopReadingCommand {
            session_id: session_id.clone(),
        })
        .await?;

    let view = GetDocumentHandler::new(session_manager.clone())
        .handle(GetDocument {
            session_id: session_id.clone(),
        })
        .await?;
    println!("{}", serde_json::to_string_pretty(&view)?);

    CloseSessionHandler::new(session_manager, event_publisher)
        .handle(CloseSessionCommand { session_id })
        .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},readalong={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // 日志写到 stderr，stdout 留给演示输出
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// 第一个参数为文件路径，否则读 stdin
async fn read_input() -> anyhow::Result<String> {
    match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path)),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

async fn word_texts(
    session_manager: &Arc<InMemorySessionManager>,
    session_id: &str,
) -> anyhow::Result<Vec<String>> {
    let view = GetDocumentHandler::new(session_manager.clone())
        .handle(GetDocument {
            session_id: session_id.to_string(),
        })
        .await?;
    Ok(view
        .sentences
        .into_iter()
        .flat_map(|s| s.words.into_iter().map(|w| w.text))
        .collect())
}

/// 前 8 个单词，第 2 个之后插入 "um"
fn simulated_recognition(words: &[String]) -> Vec<RecognizedWord> {
    let mut recognized = Vec::new();
    let mut clock = 0.0;
    for (i, word) in words.iter().take(8).enumerate() {
        recognized.push(RecognizedWord::new(word.to_lowercase(), clock, clock + 0.3, 0.92));
        clock += 0.35;
        if i == 1 {
            recognized.push(RecognizedWord::new("um", clock, clock + 0.2, 0.4));
            clock += 0.25;
        }
    }
    recognized
}

/// 事件以 debug 级别写入日志
fn spawn_event_logger(mut events: broadcast::Receiver<ReadingEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(event = ?event, "Reading event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Event logger lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// 定期关闭空闲会话
fn spawn_session_sweeper(expire: ExpireIdleSessionsHandler, idle_timeout_secs: u64) {
    let period = Duration::from_secs((idle_timeout_secs / 4).max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = expire
                .handle(ExpireIdleSessionsCommand { idle_timeout_secs })
                .await
            {
                tracing::warn!(error = %e, "Idle session sweep failed");
            }
        }
    });
}
