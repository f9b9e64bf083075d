use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use hybrid_ocr_core::EngineKind;
use tokio::sync::broadcast;

/// Stage/percentage updates emitted while a request is in flight.
///
/// 设计目标：
/// - HTTP 层、SSE 流与测试都通过同一个事件类型观察进度；
/// - 事件语义保持稳定，内部实现可变；
/// - 不把引擎内部细节直接暴露到应用层。
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stage {
        stage: u32,
        label: String,
        percent: u8,
        timestamp_ms: u64,
    },

    /// Terminal: the request finished with a result produced by `engine`.
    Completed {
        stage: u32,
        engine: EngineKind,
        timestamp_ms: u64,
    },

    /// Terminal failure marker.
    Failed {
        stage: u32,
        reason: String,
        timestamp_ms: u64,
    },
}

impl ProgressEvent {
    pub fn stage_index(&self) -> u32 {
        match self {
            ProgressEvent::Stage { stage, .. }
            | ProgressEvent::Completed { stage, .. }
            | ProgressEvent::Failed { stage, .. } => *stage,
        }
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            ProgressEvent::Stage { percent, .. } => Some(*percent),
            ProgressEvent::Completed { .. } => Some(100),
            ProgressEvent::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
        )
    }
}

impl serde::Serialize for ProgressEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use ProgressEvent::*;

        match self {
            Stage {
                stage,
                label,
                percent,
                timestamp_ms,
            } => {
                #[derive(serde::Serialize)]
                struct Event<'a> {
                    kind: &'static str,
                    stage: u32,
                    label: &'a str,
                    percent: u8,
                    timestamp_ms: u64,
                }

                Event {
                    kind: "stage",
                    stage: *stage,
                    label,
                    percent: *percent,
                    timestamp_ms: *timestamp_ms,
                }
                .serialize(serializer)
            }
            Completed {
                stage,
                engine,
                timestamp_ms,
            } => {
                #[derive(serde::Serialize)]
                struct Event<'a> {
                    kind: &'static str,
                    stage: u32,
                    engine: &'a EngineKind,
                    percent: u8,
                    timestamp_ms: u64,
                }

                Event {
                    kind: "completed",
                    stage: *stage,
                    engine,
                    percent: 100,
                    timestamp_ms: *timestamp_ms,
                }
                .serialize(serializer)
            }
            Failed {
                stage,
                reason,
                timestamp_ms,
            } => {
                #[derive(serde::Serialize)]
                struct Event<'a> {
                    kind: &'static str,
                    stage: u32,
                    reason: &'a str,
                    timestamp_ms: u64,
                }

                Event {
                    kind: "failed",
                    stage: *stage,
                    reason,
                    timestamp_ms: *timestamp_ms,
                }
                .serialize(serializer)
            }
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ProgressEvent::*;

        match self {
            Stage {
                stage,
                label,
                percent,
                ..
            } => write!(f, "Stage {stage} `{label}` {percent}%"),
            Completed { stage, engine, .. } => write!(f, "Completed {stage} via {engine}"),
            Failed { stage, reason, .. } => write!(f, "Failed {stage}: {reason}"),
        }
    }
}

/// Non-blocking sink for stage updates, passed opaquely to engine adapters.
///
/// 默认实现应是 no-op：推理路径不需要关心有没有观察者。
pub trait ProgressSink: Send + Sync {
    fn emit(&self, _label: &str, _percent: u8) {}
}

#[derive(Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {}

#[derive(Debug)]
struct ChannelState {
    next_stage: u32,
    floor_percent: u8,
    closed: bool,
}

/// Per-request progress channel.
///
/// 设计目标：
/// - `emit` 对推理线程永不阻塞：观察者断开时事件被静默丢弃；
/// - 整个请求的事件序列在 stage 与 percent 上都单调不减（回退到第二个
///   引擎时 percent 被夹到已报告过的下限之上，而不是归零）；
/// - 终止事件（`Completed` 100% 或 `Failed`）恰好发送一次，之后通道关闭，
///   被超时遗弃的工作线程迟到的 `emit` 会被丢弃。
#[derive(Debug)]
pub struct ProgressChannel {
    tx: broadcast::Sender<ProgressEvent>,
    state: Mutex<ChannelState>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            tx,
            state: Mutex::new(ChannelState {
                next_stage: 0,
                floor_percent: 0,
                closed: false,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.state
            .lock()
            .expect("progress channel mutex poisoning detected")
            .closed
    }

    /// Terminal success marker; delivered at most once.
    pub fn complete(&self, engine: EngineKind) {
        let Some(stage) = self.close_with_stage() else {
            return;
        };
        self.send(ProgressEvent::Completed {
            stage,
            engine,
            timestamp_ms: now_ms(),
        });
    }

    /// Terminal failure marker; delivered at most once.
    pub fn fail(&self, reason: impl Into<String>) {
        let Some(stage) = self.close_with_stage() else {
            return;
        };
        self.send(ProgressEvent::Failed {
            stage,
            reason: reason.into(),
            timestamp_ms: now_ms(),
        });
    }

    fn close_with_stage(&self) -> Option<u32> {
        let mut state = self
            .state
            .lock()
            .expect("progress channel mutex poisoning detected");
        if state.closed {
            return None;
        }
        state.closed = true;
        let stage = state.next_stage;
        state.next_stage += 1;
        Some(stage)
    }

    fn send(&self, event: ProgressEvent) {
        // Nobody listening (or a lagging receiver) must never stall inference.
        let _ = self.tx.send(event);
    }
}

impl ProgressSink for ProgressChannel {
    fn emit(&self, label: &str, percent: u8) {
        let event = {
            let mut state = self
                .state
                .lock()
                .expect("progress channel mutex poisoning detected");
            if state.closed {
                return;
            }
            let percent = percent.min(100).max(state.floor_percent);
            state.floor_percent = percent;
            let stage = state.next_stage;
            state.next_stage += 1;
            ProgressEvent::Stage {
                stage,
                label: label.to_string(),
                percent,
                timestamp_ms: now_ms(),
            }
        };
        self.send(event);
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
