pub const DEFAULT_DELIMITER: &str = "---";

/// Return the text after the second `delimiter` occurrence, trimmed.
/// `None` when the delimiter appears fewer than twice or the body is blank.
pub fn extract_body<'a>(content: &'a str, delimiter: &str) -> Option<&'a str> {
    let mut parts = content.splitn(3, delimiter);
    parts.next()?;
    parts.next()?;
    let body = parts.next()?.trim();
    (!body.is_empty()).then_some(body)
}
