//! Queue change type definitions

use serde::{Deserialize, Serialize};

/// Why the queue changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueChangeTrigger {
    /// Whole queue replaced (setPlaylist)
    PlaylistReplaced,
    /// Track inserted by play()
    UserPlay,
    /// Track appended without playback
    UserEnqueue,
    /// Entry removed by index
    UserDequeue,
    /// Explicit clear
    Cleared,
    /// Radio batch appended
    RadioBatch,
    /// Radio entry trashed
    RadioTrash,
    /// Rehydrated from persisted snapshot
    Restored,
}

impl std::fmt::Display for QueueChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueChangeTrigger::PlaylistReplaced => write!(f, "PlaylistReplaced"),
            QueueChangeTrigger::UserPlay => write!(f, "UserPlay"),
            QueueChangeTrigger::UserEnqueue => write!(f, "UserEnqueue"),
            QueueChangeTrigger::UserDequeue => write!(f, "UserDequeue"),
            QueueChangeTrigger::Cleared => write!(f, "Cleared"),
            QueueChangeTrigger::RadioBatch => write!(f, "RadioBatch"),
            QueueChangeTrigger::RadioTrash => write!(f, "RadioTrash"),
            QueueChangeTrigger::Restored => write!(f, "Restored"),
        }
    }
}
