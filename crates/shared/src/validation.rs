//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a client filename in bytes.
///
/// Uploads are stored as `{task_id}_{filename}`; a 36-character task id
/// plus separator must still fit in a 255-byte path component.
pub const MAX_FILENAME_BYTES: usize = 218;

lazy_static::lazy_static! {
    static ref FORBIDDEN_FILENAME_CHARS: regex::Regex =
        regex::Regex::new(r#"[/\\\x00-\x1f\x7f]"#).unwrap();
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a client-supplied document filename.
///
/// The name is used verbatim as a suffix of the on-disk upload path, so it
/// must be a single path component.
pub fn validate_upload_filename(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(validation_error("filename_empty", "Filename cannot be empty"));
    }

    if name.len() > MAX_FILENAME_BYTES {
        return Err(validation_error(
            "filename_length",
            "Filename must be at most 218 bytes",
        ));
    }

    if FORBIDDEN_FILENAME_CHARS.is_match(name) || name.contains("..") {
        return Err(validation_error(
            "filename_invalid",
            "Filename must not contain path separators or control characters",
        ));
    }

    Ok(())
}

/// Validates an artifact name requested through the download endpoint.
///
/// Same rules as uploads, and additionally rejects hidden names so that
/// in-progress temporary files are never served.
pub fn validate_download_filename(name: &str) -> Result<(), ValidationError> {
    validate_upload_filename(name)?;

    if name.starts_with('.') {
        return Err(validation_error(
            "filename_hidden",
            "Hidden files cannot be downloaded",
        ));
    }

    Ok(())
}

/// Validates that a margin percentage is a finite number.
///
/// Zero and negative margins are accepted and produce cost-priced or
/// loss-priced proposals.
pub fn validate_margin_percent(margin: f64) -> Result<(), ValidationError> {
    if margin.is_finite() {
        Ok(())
    } else {
        Err(validation_error(
            "margin_not_finite",
            "Margin percent must be a finite number",
        ))
    }
}
