/// Name stored when an upload carries no usable filename.
pub const FALLBACK_FILENAME: &str = "video";

/// Result of validating a flat filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `.` or `..`.
    PathTraversal,
    /// Filename contains control characters (NUL, CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '.' and '..' are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    // Stored names end up in response headers and logs.
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == "." || trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(trimmed)
}

/// Filename to store for an upload: the declared name when it is valid,
/// otherwise [`FALLBACK_FILENAME`].
pub fn stored_filename(declared: Option<&str>) -> String {
    match declared.map(validate_flat_filename) {
        Some(Ok(name)) => name.to_string(),
        Some(Err(e)) => {
            tracing::debug!(reason = e.message(), "Replacing invalid upload filename");
            FALLBACK_FILENAME.to_string()
        }
        None => FALLBACK_FILENAME.to_string(),
    }
}

/// Content type for an upload: the declared part type, else a guess from
/// the filename extension, else `application/octet-stream`.
pub fn content_type_for(declared: Option<&str>, filename: &str) -> String {
    declared
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(filename)
                .first_or_octet_stream()
                .to_string()
        })
}
