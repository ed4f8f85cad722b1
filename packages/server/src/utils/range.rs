use std::ops::Range;

/// Outcome of interpreting a `Range` request header against a file length.
#[derive(Debug, PartialEq, Eq)]
pub enum ByteRange {
    /// Serve the whole file (no header, an unsupported unit, a malformed
    /// value, or a multi-range request).
    Full,
    /// Serve `start..end` (end exclusive) with `206 Partial Content`.
    Partial(Range<u64>),
    /// The range lies outside the file; answer `416`.
    Unsatisfiable,
}

/// Parse HTTP Range header.
/// Supports formats: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`
pub fn parse_range_header(range_header: Option<&str>, total_size: u64) -> ByteRange {
    let Some(range_str) = range_header
        .map(str::trim)
        .and_then(|h| h.strip_prefix("bytes="))
    else {
        return ByteRange::Full;
    };

    if range_str.contains(',') {
        return ByteRange::Full;
    }

    let Some((first, last)) = range_str.trim().split_once('-') else {
        return ByteRange::Full;
    };

    if first.is_empty() {
        // Suffix range: bytes=-500 means last 500 bytes
        let Ok(suffix) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || total_size == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial(total_size.saturating_sub(suffix)..total_size);
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };

    let end = if last.is_empty() {
        // Open-ended range: bytes=1000-
        total_size
    } else {
        let Ok(end) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if end < start {
            return ByteRange::Full;
        }
        // HTTP ranges are inclusive.
        end.saturating_add(1).min(total_size)
    };

    if start >= total_size {
        return ByteRange::Unsatisfiable;
    }

    ByteRange::Partial(start..end)
}
