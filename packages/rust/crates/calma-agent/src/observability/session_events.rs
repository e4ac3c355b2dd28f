//! Stable event ids attached to `tracing` records as the `event` field.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    MemoryAppended,
    MemoryLoaded,
    MemoryExpired,
    MemoryReset,
    BatchOpened,
    BatchJoined,
    WindowClosed,
    PrimaryElected,
    WaiterCancelled,
    BatchReleased,
    TurnSkipped,
    TurnBuffered,
    TurnGenerationFailed,
    TurnRecorded,
    TurnFallbackReply,
    ArchiveEnqueued,
    ArchiveQueueFull,
    ArchiveWriteSucceeded,
    ArchiveWriteFailed,
    ArchiveWorkerStopped,
    GatewayStarted,
    GatewayStopped,
}

impl SessionEvent {
    #[allow(dead_code)]
    pub const ALL: [Self; 22] = [
        Self::MemoryAppended,
        Self::MemoryLoaded,
        Self::MemoryExpired,
        Self::MemoryReset,
        Self::BatchOpened,
        Self::BatchJoined,
        Self::WindowClosed,
        Self::PrimaryElected,
        Self::WaiterCancelled,
        Self::BatchReleased,
        Self::TurnSkipped,
        Self::TurnBuffered,
        Self::TurnGenerationFailed,
        Self::TurnRecorded,
        Self::TurnFallbackReply,
        Self::ArchiveEnqueued,
        Self::ArchiveQueueFull,
        Self::ArchiveWriteSucceeded,
        Self::ArchiveWriteFailed,
        Self::ArchiveWorkerStopped,
        Self::GatewayStarted,
        Self::GatewayStopped,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MemoryAppended => "session.memory.appended",
            Self::MemoryLoaded => "session.memory.loaded",
            Self::MemoryExpired => "session.memory.expired",
            Self::MemoryReset => "session.memory.reset",
            Self::BatchOpened => "session.coalescer.batch_opened",
            Self::BatchJoined => "session.coalescer.batch_joined",
            Self::WindowClosed => "session.coalescer.window_closed",
            Self::PrimaryElected => "session.coalescer.primary_elected",
            Self::WaiterCancelled => "session.coalescer.waiter_cancelled",
            Self::BatchReleased => "session.coalescer.batch_released",
            Self::TurnSkipped => "chat.turn.skipped",
            Self::TurnBuffered => "chat.turn.buffered",
            Self::TurnGenerationFailed => "chat.turn.generation_failed",
            Self::TurnRecorded => "chat.turn.recorded",
            Self::TurnFallbackReply => "chat.turn.fallback_reply",
            Self::ArchiveEnqueued => "chat.archive.enqueued",
            Self::ArchiveQueueFull => "chat.archive.queue_full",
            Self::ArchiveWriteSucceeded => "chat.archive.write_succeeded",
            Self::ArchiveWriteFailed => "chat.archive.write_failed",
            Self::ArchiveWorkerStopped => "chat.archive.worker_stopped",
            Self::GatewayStarted => "chat.gateway.started",
            Self::GatewayStopped => "chat.gateway.stopped",
        }
    }
}
