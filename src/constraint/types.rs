use super::*;
use crate::config::CheckMode;
use crate::schema::{SimpleType, TypeEntry};

/// Both halves of type checking: `type`, then `disallow`.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    check_type(checker, value, schema, path)?;
    check_disallow(checker, value, schema, path)
}

pub(super) fn check_type(
    checker: &mut Checker,
    value: &Value,
    schema: &Schema,
    path: &str,
) -> Result<()> {
    if schema.types.is_empty() {
        return Ok(());
    }
    let cast = checker.config.mode == CheckMode::TypeCast;
    for entry in schema.types.iter() {
        if matches_entry(checker, value, entry, path, cast)? {
            return Ok(());
        }
    }
    checker.add_error(
        path,
        format!(
            "{} value found, but {} is required",
            value.type_name(),
            describe(&schema.types)
        ),
    );
    Ok(())
}

pub(super) fn check_disallow(
    checker: &mut Checker,
    value: &Value,
    schema: &Schema,
    path: &str,
) -> Result<()> {
    for entry in schema.disallow.iter() {
        if matches_entry(checker, value, entry, path, false)? {
            checker.add_error(
                path,
                format!(
                    "{} value found, but {} is disallowed",
                    value.type_name(),
                    describe(std::slice::from_ref(entry))
                ),
            );
            return Ok(());
        }
    }
    Ok(())
}

fn matches_entry(
    checker: &mut Checker,
    value: &Value,
    entry: &TypeEntry,
    path: &str,
    cast: bool,
) -> Result<bool> {
    match entry {
        TypeEntry::Simple(ty) => Ok(matches_simple(value, *ty)
            || (cast && checker.config.coercion.coerces_to(value, *ty))),
        TypeEntry::Schema(schema) => checker.passes(value, schema, path),
    }
}

fn matches_simple(value: &Value, ty: SimpleType) -> bool {
    match ty {
        SimpleType::Any => true,
        SimpleType::String => value.is_str(),
        SimpleType::Number => value.is_number(),
        SimpleType::Integer => value.is_integer(),
        SimpleType::Boolean => value.is_bool(),
        SimpleType::Object => value.is_map(),
        SimpleType::Array => value.is_array(),
        SimpleType::Null => value.is_null(),
    }
}

fn describe(entries: &[TypeEntry]) -> String {
    let names: Vec<&str> = entries
        .iter()
        .map(|entry| match entry {
            TypeEntry::Simple(ty) => ty.name(),
            TypeEntry::Schema(schema) => schema.title.as_deref().unwrap_or("a schema"),
        })
        .collect();
    names.join(" or ")
}
