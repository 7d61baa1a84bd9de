use super::*;

/// Check a string's length and pattern. Length is counted in characters, not bytes.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let text = match value.as_str() {
        Some(text) => text,
        None => return Ok(()),
    };

    let len = bytecount::num_chars(text.as_bytes());
    if let Some(min) = schema.min_length {
        if len < min {
            checker.add_error(path, format!("must be at least {} characters long", min));
        }
    }
    if let Some(max) = schema.max_length {
        if len > max {
            checker.add_error(path, format!("must be at most {} characters long", max));
        }
    }
    if let Some(ref pattern) = schema.pattern {
        if !pattern.is_match(text) {
            checker.add_error(
                path,
                format!("does not match the regex pattern {}", pattern.as_str()),
            );
        }
    }
    Ok(())
}
