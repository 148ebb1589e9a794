use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::sanitize::sanitize_text;
use crate::secure_store::SecureStore;
use crate::segments::NOTES_KEY;
use crate::storage::StorageBackend;

/// Shown as a transient, dismissible notification; never blocks navigation.
pub const LOCAL_ONLY_NOTICE: &str =
    "Notes were saved locally but not to the server. Your progress is still preserved.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesOutcome {
    /// Server acknowledged with a 2xx.
    Saved,
    /// Server rejected or was unreachable; the local copy remains
    /// authoritative and the failure is never retried.
    SavedLocallyOnly { notice: String },
}

/// Persist the sanitized notes text through the secure store. Always done
/// before (and regardless of) the server push.
pub fn save_notes_local<B: StorageBackend>(store: &SecureStore<B>, notes: &str) -> bool {
    store.put(NOTES_KEY, &Value::String(sanitize_text(notes)), "")
}

/// Fire-and-forget mirror of the notes field to the save-notes endpoint.
pub struct NotesClient {
    http: Client,
    endpoint: String,
}

impl NotesClient {
    pub fn new(endpoint: &str) -> Self {
        NotesClient {
            http: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Form-encoded request body, `notes=<value>`.
    pub fn form_body(notes: &str) -> String {
        format!("notes={}", urlencoding::encode(notes))
    }

    /// POST the notes with the CSRF token from the page meta tag. Any
    /// non-2xx response or transport error degrades to a soft outcome.
    pub async fn push(&self, notes: &str, csrf_token: &str) -> NotesOutcome {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("X-CSRFToken", csrf_token)
            .body(Self::form_body(notes))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("✅ Notes saved to server");
                NotesOutcome::Saved
            }
            Ok(resp) => {
                warn!("⚠️ Server refused notes save: {}", resp.status());
                NotesOutcome::SavedLocallyOnly {
                    notice: LOCAL_ONLY_NOTICE.to_string(),
                }
            }
            Err(e) => {
                warn!("⚠️ Failed to reach notes endpoint: {}", e);
                NotesOutcome::SavedLocallyOnly {
                    notice: LOCAL_ONLY_NOTICE.to_string(),
                }
            }
        }
    }
}
