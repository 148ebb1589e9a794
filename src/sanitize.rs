use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Fields masked before any log line that carries a record.
const SENSITIVE_FIELDS: [&str; 5] = ["email", "client_name", "officer_name", "chief_name", "notes"];

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Escape the five HTML-special characters to prevent stored XSS.
pub fn sanitize_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Basic `local@domain.tld` shape check. Empty is invalid.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_REGEX.is_match(email)
}

/// Sanitize every field of a form record.
///
/// Fields whose name contains "email" keep their value only if it passes
/// validation, otherwise they are blanked. Other string fields are
/// HTML-escaped. Non-string values pass through unchanged.
pub fn sanitize_form_data(form_data: &Map<String, Value>) -> Map<String, Value> {
    let mut sanitized = Map::new();

    for (key, value) in form_data {
        if key.contains("email") {
            let email = value.as_str().unwrap_or("");
            let kept = if validate_email(email) { email } else { "" };
            sanitized.insert(key.clone(), Value::String(kept.to_string()));
        } else if let Some(s) = value.as_str() {
            sanitized.insert(key.clone(), Value::String(sanitize_text(s)));
        } else {
            sanitized.insert(key.clone(), value.clone());
        }
    }

    sanitized
}

/// Mask PII fields before a record reaches persistent storage.
///
/// Both masks are format-preserving truncations and never reversible:
/// an email keeps its first two local-part characters and the domain, a
/// client name keeps its first two and last two characters.
pub fn mask_for_storage(data: &Map<String, Value>) -> Map<String, Value> {
    let mut masked = data.clone();

    if let Some(Value::String(email)) = masked.get("email").cloned() {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            let prefix: String = parts[0].chars().take(2).collect();
            masked.insert(
                "email".to_string(),
                Value::String(format!("{}***@{}", prefix, parts[1])),
            );
        }
    }

    if let Some(Value::String(name)) = masked.get("client_name").cloned() {
        if name.chars().count() > 4 {
            let chars: Vec<char> = name.chars().collect();
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[chars.len() - 2..].iter().collect();
            masked.insert(
                "client_name".to_string(),
                Value::String(format!("{}*****{}", head, tail)),
            );
        }
    }

    masked
}

/// Mask every sensitive field of a record before it appears in a log line.
pub fn mask_for_log(data: &Map<String, Value>) -> Map<String, Value> {
    let mut masked = data.clone();

    for field in SENSITIVE_FIELDS {
        let Some(value) = masked.get(field) else { continue };
        if value.is_null() {
            continue;
        }

        let replacement = if field == "email" {
            match value.as_str().map(|s| s.split('@').collect::<Vec<_>>()) {
                Some(parts) if parts.len() == 2 => format!("***@{}", parts[1]),
                _ => "***@***.***".to_string(),
            }
        } else {
            "******".to_string()
        };

        masked.insert(field.to_string(), Value::String(replacement));
    }

    masked
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn sanitize_text_escapes_all_five_specials() {
        assert_eq!(
            sanitize_text(r#"<b onclick="x('&')">"#),
            "&lt;b onclick=&quot;x(&#039;&amp;&#039;)&quot;&gt;"
        );
    }

    #[test]
    fn sanitize_text_escapes_amp_first() {
        // A pre-existing entity must not be double-escaped into garbage order
        assert_eq!(sanitize_text("&lt;"), "&amp;lt;");
    }

    #[test]
    fn email_validation_shape() {
        assert!(validate_email("probation.officer@doj.gov.ph"));
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("spa ced@x.com"));
    }

    #[test]
    fn form_data_blanks_invalid_emails_and_escapes_strings() {
        let raw = as_map(json!({
            "contact_email": "broken@@",
            "officer_email": "officer@ppa.gov.ph",
            "client_name": "Juan <script>",
            "seg1_q1": 2
        }));

        let clean = sanitize_form_data(&raw);
        assert_eq!(clean["contact_email"], "");
        assert_eq!(clean["officer_email"], "officer@ppa.gov.ph");
        assert_eq!(clean["client_name"], "Juan &lt;script&gt;");
        assert_eq!(clean["seg1_q1"], 2);
    }

    #[test]
    fn storage_mask_truncates_email_and_name() {
        let raw = as_map(json!({
            "email": "juandelacruz@example.com",
            "client_name": "Juan Dela Cruz"
        }));

        let masked = mask_for_storage(&raw);
        assert_eq!(masked["email"], "ju***@example.com");
        assert_eq!(masked["client_name"], "Ju*****uz");
    }

    #[test]
    fn storage_mask_is_idempotent() {
        let raw = as_map(json!({
            "email": "juandelacruz@example.com",
            "client_name": "Juan Dela Cruz"
        }));

        let once = mask_for_storage(&raw);
        let twice = mask_for_storage(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn storage_mask_leaves_short_names_alone() {
        let raw = as_map(json!({ "client_name": "Ana" }));
        assert_eq!(mask_for_storage(&raw)["client_name"], "Ana");
    }

    #[test]
    fn log_mask_covers_all_sensitive_fields() {
        let raw = as_map(json!({
            "email": "juan@example.com",
            "client_name": "Juan Dela Cruz",
            "officer_name": "Officer Reyes",
            "notes": "met at the field office",
            "seg1_q1": "2"
        }));

        let masked = mask_for_log(&raw);
        assert_eq!(masked["email"], "***@example.com");
        assert_eq!(masked["client_name"], "******");
        assert_eq!(masked["officer_name"], "******");
        assert_eq!(masked["notes"], "******");
        // Non-sensitive answer values are untouched
        assert_eq!(masked["seg1_q1"], "2");
    }

    #[test]
    fn log_mask_handles_malformed_email() {
        let raw = as_map(json!({ "email": "not-an-email" }));
        assert_eq!(mask_for_log(&raw)["email"], "***@***.***");
    }
}
