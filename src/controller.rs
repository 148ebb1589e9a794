use log::{info, warn};
use serde_json::Value;

use crate::completion::{CompletionTracker, LiveForm};
use crate::export::ExportDocument;
use crate::sanitize::{mask_for_log, sanitize_form_data};
use crate::score::{total_score, AssessmentResult};
use crate::secure_store::SecureStore;
use crate::segments::{
    self, AnswerRecord, MASTER_RECORD_KEY, NOTES_KEY, RESULT_KEY, SEGMENT_COUNT,
    SIDEBAR_COLLAPSED_FLAG, SIDEBAR_NAV_FLAG,
};
use crate::storage::StorageBackend;

/// A segment as presented by the blocking modal: id, display title and the
/// link target used for direct navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    pub id: u8,
    pub title: &'static str,
    pub nav_target: String,
}

impl SegmentRef {
    fn new(id: u8) -> Self {
        SegmentRef {
            id,
            title: segments::segment_title(id).unwrap_or("Unknown"),
            nav_target: segments::navigation_target(id),
        }
    }
}

/// Verdict for a submission attempt on the final segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The final segment itself is unanswered; reported alone before
    /// anything else.
    BlockedCurrentSegment(SegmentRef),
    /// Earlier segments are incomplete; listed in ascending order for the
    /// blocking modal.
    BlockedIncomplete(Vec<SegmentRef>),
}

/// Verdict for entering the results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsVerdict {
    Proceed,
    Redirect { target: String, notice: String },
}

/// Orchestrates save-on-change, load-on-page-entry, clearing, submission
/// gating and the sidebar flags over one [`SecureStore`].
pub struct AssessmentController<B: StorageBackend> {
    store: SecureStore<B>,
}

impl<B: StorageBackend> AssessmentController<B> {
    pub fn new(store: SecureStore<B>) -> Self {
        AssessmentController { store }
    }

    pub fn store(&self) -> &SecureStore<B> {
        &self.store
    }

    /// Sanitize and persist one segment's answers, updating the master
    /// record mirror in the same operation.
    pub fn save_segment(&self, segment: u8, raw: &AnswerRecord) -> bool {
        if !segments::valid_segment(segment) {
            warn!("⚠️ Refusing to save out-of-range segment {}", segment);
            return false;
        }

        let sanitized = sanitize_form_data(raw);
        info!(
            "💾 Saving segment {} ({} fields): {:?}",
            segment,
            sanitized.len(),
            mask_for_log(&sanitized)
        );

        let key = segments::storage_key(segment);
        let saved = self.store.put(&key, &Value::Object(sanitized.clone()), "");

        // Master record must stay consistent with the per-segment entry
        let mut master = self
            .store
            .get(MASTER_RECORD_KEY, "")
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        master.insert(key, Value::Object(sanitized));
        let mirrored = self.store.put(MASTER_RECORD_KEY, &Value::Object(master), "");

        saved && mirrored
    }

    /// Read one segment's answers back for restoring the page's form state.
    pub fn load_segment(&self, segment: u8) -> Option<AnswerRecord> {
        self.store
            .get(&segments::storage_key(segment), "")
            .and_then(|v| v.as_object().cloned())
    }

    /// Wholesale reset when the user starts a new assessment or lands on
    /// the index page. UI presentation flags other than the navigation flag
    /// survive; everything assessment-related goes.
    pub fn clear_all(&self) {
        info!("🧹 Clearing all assessment data");

        for segment in 0..=SEGMENT_COUNT {
            self.store.remove(&segments::storage_key(segment));
        }
        self.store.remove(MASTER_RECORD_KEY);
        self.store.remove(RESULT_KEY);
        self.store.remove(NOTES_KEY);
        self.store.backend().remove_item(SIDEBAR_NAV_FLAG);

        // Legacy unencrypted entries from earlier releases
        let leftovers: Vec<String> = self
            .store
            .backend()
            .keys()
            .into_iter()
            .filter(|k| {
                k.starts_with("segment_")
                    || k.starts_with("seg")
                    || k.contains("assessment")
                    || k.contains("risk")
            })
            .collect();
        for key in leftovers {
            self.store.backend().remove_item(&key);
        }
    }

    /// Gate a submission from the final segment. The current segment is
    /// checked first and reported alone; only then are earlier segments
    /// allowed to block.
    pub fn submit_final_segment(&self, live: Option<&LiveForm>) -> SubmitOutcome {
        let incomplete = match live {
            Some(form) => CompletionTracker::with_live_form(&self.store, form).incomplete_segments(),
            None => CompletionTracker::new(&self.store).incomplete_segments(),
        };

        if incomplete.contains(&SEGMENT_COUNT) {
            return SubmitOutcome::BlockedCurrentSegment(SegmentRef::new(SEGMENT_COUNT));
        }

        if !incomplete.is_empty() {
            return SubmitOutcome::BlockedIncomplete(
                incomplete.into_iter().map(SegmentRef::new).collect(),
            );
        }

        SubmitOutcome::Accepted
    }

    /// Gate entry to the results page: incomplete assessments are bounced
    /// to their first incomplete segment with a soft notice.
    pub fn results_entry(&self) -> ResultsVerdict {
        let incomplete = CompletionTracker::new(&self.store).incomplete_segments();
        match incomplete.first() {
            None => ResultsVerdict::Proceed,
            Some(first) => ResultsVerdict::Redirect {
                target: segments::navigation_target(*first),
                notice: "All segments must be completed before viewing results.".to_string(),
            },
        }
    }

    /// Compute and persist the final result once every segment is
    /// complete. Returns None (and writes nothing) otherwise.
    pub fn finalize(&self) -> Option<AssessmentResult> {
        if !CompletionTracker::new(&self.store).all_segments_complete() {
            return None;
        }

        let master = self
            .store
            .get(MASTER_RECORD_KEY, "")
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        let result = AssessmentResult::new(total_score(&master));

        match serde_json::to_value(&result) {
            Ok(value) => {
                self.store.put(RESULT_KEY, &value, "");
                Some(result)
            }
            Err(e) => {
                warn!("⚠️ Could not serialize assessment result: {}", e);
                None
            }
        }
    }

    pub fn export(&self) -> Option<ExportDocument> {
        ExportDocument::from_store(&self.store)
    }

    // Sidebar flags carry no sensitive content and bypass the secure store

    pub fn set_sidebar_navigation(&self, active: bool) {
        let _ = self
            .store
            .backend()
            .set_item(SIDEBAR_NAV_FLAG, if active { "true" } else { "false" });
    }

    pub fn came_from_sidebar(&self) -> bool {
        self.store.backend().get_item(SIDEBAR_NAV_FLAG).as_deref() == Some("true")
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        let _ = self
            .store
            .backend()
            .set_item(SIDEBAR_COLLAPSED_FLAG, if collapsed { "true" } else { "false" });
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.store.backend().get_item(SIDEBAR_COLLAPSED_FLAG).as_deref() == Some("true")
    }
}
