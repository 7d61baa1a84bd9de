use super::*;

/// Check that a value equals at least one `enum` member. Maps compare without regard to key
/// order, numbers by value.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let members = match schema.enum_values {
        Some(ref members) => members,
        None => return Ok(()),
    };
    if !members.iter().any(|member| member == value) {
        let listed: Vec<String> = members.iter().map(Value::to_string).collect();
        checker.add_error(
            path,
            format!(
                "does not have a value in the enumeration [{}]",
                listed.join(", ")
            ),
        );
    }
    Ok(())
}
