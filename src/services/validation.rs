//! Input checks for the glossary procedures.
//!
//! Every check trims first, so whitespace-only values count as empty.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ApiError;

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_TERM_CHARS: usize = 255;
pub const MAX_IMAGE_URL_CHARS: usize = 2048;
pub const MAX_FILE_NAME_CHARS: usize = 200;

/// Collects per-field failures so one response can report all of them
#[derive(Debug, Default)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(reason) => {
                self.errors.insert(field.to_string(), reason);
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.errors)))
        }
    }
}

fn bounded_text(raw: &str, max_chars: usize) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(format!("must be at most {} characters (got {})", max_chars, len));
    }
    Ok(value.to_string())
}

pub fn title(raw: &str) -> Result<String, String> {
    bounded_text(raw, MAX_TITLE_CHARS)
}

pub fn term(raw: &str) -> Result<String, String> {
    bounded_text(raw, MAX_TERM_CHARS)
}

/// Markdown body; unbounded but non-empty
pub fn definition(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(value.to_string())
}

/// Blank descriptions are stored as absent
pub fn description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Blank URLs map to `None`
pub fn image_url(raw: Option<&str>) -> Result<Option<String>, String> {
    let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let len = value.chars().count();
    if len > MAX_IMAGE_URL_CHARS {
        return Err(format!("must be at most {} characters (got {})", MAX_IMAGE_URL_CHARS, len));
    }
    Ok(Some(value.to_string()))
}

/// Decodes base64 file data, tolerating a `data:<mime>;base64,` prefix
pub fn image_data(raw: &str, max_bytes: usize) -> Result<Vec<u8>, String> {
    let mut payload = raw.trim();
    if payload.starts_with("data:") {
        payload = match payload.split_once(',') {
            Some((_, rest)) => rest,
            None => return Err("malformed data URL".to_string()),
        };
    }

    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        return Err("must not be empty".to_string());
    }

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| format!("is not valid base64: {}", e))?;
    if bytes.is_empty() {
        return Err("must not be empty".to_string());
    }
    if bytes.len() > max_bytes {
        return Err(format!("exceeds the {} byte upload limit", max_bytes));
    }
    Ok(bytes)
}

/// Keeps the last path segment and maps anything outside `[A-Za-z0-9._-]` to `_`
pub fn file_name(raw: &str) -> Result<String, String> {
    let base = raw
        .trim()
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .take(MAX_FILE_NAME_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    if sanitized.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return Err("must name a file".to_string());
    }
    Ok(sanitized)
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(title("  Kotlin  ").unwrap(), "Kotlin");
        assert!(title("").is_err());
        assert!(title("   ").is_err());
        assert!(title(&"é".repeat(255)).is_ok());
        assert!(title(&"x".repeat(256)).is_err());
        assert!(term(&"t".repeat(256)).is_err());
    }

    #[test]
    fn definition_must_have_content() {
        assert_eq!(definition("\n**bold**\n").unwrap(), "**bold**");
        assert!(definition(" \n\t").is_err());
        assert!(definition(&"x".repeat(100_000)).is_ok());
    }

    #[test]
    fn blank_optional_values_become_none() {
        assert_eq!(description(Some("  ")), None);
        assert_eq!(description(None), None);
        assert_eq!(description(Some(" Terms ")), Some("Terms".to_string()));
        assert_eq!(image_url(Some("")).unwrap(), None);
        assert!(image_url(Some(&format!("https://x/{}", "a".repeat(2048)))).is_err());
    }

    #[test]
    fn image_data_accepts_plain_and_data_url_base64() {
        assert_eq!(image_data("aGVsbG8=", 1024).unwrap(), b"hello");
        assert_eq!(image_data("data:image/png;base64,aGVs\nbG8=", 1024).unwrap(), b"hello");
        assert!(image_data("", 1024).is_err());
        assert!(image_data("not base64!", 1024).is_err());
        assert!(image_data("aGVsbG8=", 4).is_err());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_name("photo.png").unwrap(), "photo.png");
        assert_eq!(file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(file_name("C:\\Users\\me\\Moïse 1.jpg").unwrap(), "Mo_se_1.jpg");
        assert!(file_name("").is_err());
        assert!(file_name("..").is_err());
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("noext"), "image/jpeg");
    }

    #[test]
    fn validator_collects_every_failure() {
        let mut v = Validator::new();
        assert_eq!(v.check("term", term("")), None);
        assert_eq!(v.check("definition", definition("")), None);
        assert_eq!(v.check("title", title("ok")), Some("ok".to_string()));
        let err = v.finish().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("term"));
        assert!(fields.contains_key("definition"));
    }
}
