//! Link moderation: URL detection and the persistent warn counter.
//!
//! Counts are kept per chat and per user in a single JSON document that
//! is fully reloaded and rewritten on every violation (write-through).
//! Reaching the limit bans the offender and clears their counter.

use crate::storage::{JsonFileStore, StorageError, WARNS_KEY};
use lazy_regex::lazy_regex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Warns a user may accumulate before the ban fires
pub const WARN_LIMIT: u32 = 3;

/// Match http/https URLs anywhere in a message, whatever the casing
static RE_URL: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)https?://[^\s]+");

/// Persisted warn counters: chat id -> user id -> count
///
/// Both ids are stored as strings, matching the JSON document layout.
pub type WarnTable = HashMap<String, HashMap<String, u32>>;

/// Result of recording one violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarnVerdict {
    /// The count the violation brought the user to
    pub count: u32,
    /// True when the count reached the limit and the user must be banned
    pub banned: bool,
}

/// Whether the text contains a link the moderation rules care about
#[must_use]
pub fn contains_link(text: &str) -> bool {
    RE_URL.is_match(text)
}

/// Warn bookkeeping around the persistent [`WarnTable`]
///
/// A single mutex serialises the load-increment-save sequence; without it
/// two concurrent violations could both read the same count and lose an
/// increment across the persistence boundary.
pub struct ModerationService {
    store: Arc<JsonFileStore>,
    guard: Mutex<()>,
}

impl ModerationService {
    /// Create a service persisting through the given store
    #[must_use]
    pub fn new(store: Arc<JsonFileStore>) -> Self {
        Self {
            store,
            guard: Mutex::new(()),
        }
    }

    async fn load_table(&self) -> Result<WarnTable, StorageError> {
        match self.store.load_json::<WarnTable>(WARNS_KEY).await {
            Ok(Some(table)) => Ok(table),
            Ok(None) => Ok(WarnTable::default()),
            // An unreadable document starts fresh rather than wedging
            // moderation; the broken content is overwritten on save.
            Err(StorageError::Json(e)) => {
                warn!("Warn table is corrupt, starting fresh: {e}");
                Ok(WarnTable::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Record one violation and persist the updated table immediately
    ///
    /// At [`WARN_LIMIT`] the verdict asks the caller to ban and the
    /// user's counter is deleted before a second persist. A write failure
    /// is fatal for this request; nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` when the table cannot be read or written.
    pub async fn record_violation(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<WarnVerdict, StorageError> {
        let _serialized = self.guard.lock().await;

        let mut table = self.load_table().await?;
        let chat_key = chat_id.to_string();
        let user_key = user_id.to_string();

        let count = {
            let entry = table
                .entry(chat_key.clone())
                .or_default()
                .entry(user_key.clone())
                .or_insert(0);
            *entry += 1;
            *entry
        };
        self.store.save_json(WARNS_KEY, &table).await?;

        if count >= WARN_LIMIT {
            if let Some(chat) = table.get_mut(&chat_key) {
                chat.remove(&user_key);
                if chat.is_empty() {
                    table.remove(&chat_key);
                }
            }
            self.store.save_json(WARNS_KEY, &table).await?;
            return Ok(WarnVerdict {
                count,
                banned: true,
            });
        }

        Ok(WarnVerdict {
            count,
            banned: false,
        })
    }
}
