use serde_json::{Map, Value};

/// One segment's answers, keyed by question field name (`seg<n>_q<m>` for
/// radio groups, free names for text fields).
pub type AnswerRecord = Map<String, Value>;

pub const SEGMENT_COUNT: u8 = 8;

/// Expected radio-question count per segment, fixed at build time.
pub const EXPECTED_ANSWER_COUNTS: [usize; 8] = [6, 3, 5, 6, 6, 4, 7, 5];

pub const SEGMENT_TITLES: [&str; 8] = [
    "Criminal History",
    "Pro-Criminal Companions",
    "Pro-Criminal Attitudes & Cognitions",
    "Anti-Social Personality Patterns",
    "Education And Employment",
    "Family And Marital Status",
    "Substance Abuse",
    "Mental Health",
];

/// Storage key for the aggregated master record.
pub const MASTER_RECORD_KEY: &str = "allSegmentData";
/// Storage key for the final computed result.
pub const RESULT_KEY: &str = "riskAssessmentData";
/// Storage key for the free-text notes field.
pub const NOTES_KEY: &str = "notes";

/// UI-only flags, deliberately kept out of the secure store: they carry no
/// sensitive content and other scripts read them synchronously.
pub const SIDEBAR_NAV_FLAG: &str = "isSidebarNavigation";
pub const SIDEBAR_COLLAPSED_FLAG: &str = "sidebarCollapsed";

pub fn valid_segment(segment: u8) -> bool {
    (1..=SEGMENT_COUNT).contains(&segment)
}

pub fn expected_answer_count(segment: u8) -> Option<usize> {
    valid_segment(segment).then(|| EXPECTED_ANSWER_COUNTS[(segment - 1) as usize])
}

pub fn segment_title(segment: u8) -> Option<&'static str> {
    valid_segment(segment).then(|| SEGMENT_TITLES[(segment - 1) as usize])
}

/// Field-name prefix of a segment's radio questions, e.g. `seg3_`.
pub fn field_prefix(segment: u8) -> String {
    format!("seg{}_", segment)
}

/// Storage key of a segment's answer record, e.g. `segment_3`.
pub fn storage_key(segment: u8) -> String {
    format!("segment_{}", segment)
}

/// Navigation target used by the incomplete-segments modal links.
pub fn navigation_target(segment: u8) -> String {
    format!("/navigate/segment_{}", segment)
}
