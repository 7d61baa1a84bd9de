use super::*;
use crate::schema::{Additional, Dependency, Requires};
use crate::value::Map;

/// Check a map's properties. Does nothing for any other kind of value.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let map = match value.as_map() {
        Some(map) => map,
        None => return Ok(()),
    };

    for property in schema.properties.iter() {
        let name = property.name();
        let child_path = increment_path(path, name);
        let child = match map.get(name) {
            Some(child) => child,
            None => {
                if property.is_required() || schema.required_properties.iter().any(|r| r == name)
                {
                    checker.add_error(&child_path, "is missing and it is required");
                }
                continue;
            }
        };
        schema::check(checker, child, property, &child_path)?;
        match property.requires {
            Some(Requires::Property(ref sibling)) if !map.contains_key(sibling) => {
                checker.add_error(&child_path, format!("{} requires {}", name, sibling));
            }
            Some(Requires::Schema(ref parent)) => schema::check(checker, value, parent, path)?,
            _ => (),
        }
    }

    for name in schema.required_properties.iter() {
        if !schema.has_property(name) && !map.contains_key(name) {
            checker.add_error(
                &increment_path(path, name),
                "is missing and it is required",
            );
        }
    }

    check_dependencies(checker, value, map, schema, path)?;
    check_undeclared(checker, map, schema, path)
}

fn check_dependencies(
    checker: &mut Checker,
    value: &Value,
    map: &Map,
    schema: &Schema,
    path: &str,
) -> Result<()> {
    for (name, dependency) in schema.dependencies.iter() {
        if !map.contains_key(name) {
            continue;
        }
        match dependency {
            Dependency::Properties(others) => {
                for other in others.iter().filter(|other| !map.contains_key(other)) {
                    checker.add_error(
                        &increment_path(path, name),
                        format!("{} requires {}", name, other),
                    );
                }
            }
            Dependency::Schema(parent) => schema::check(checker, value, parent, path)?,
        }
    }
    Ok(())
}

fn check_undeclared(checker: &mut Checker, map: &Map, schema: &Schema, path: &str) -> Result<()> {
    for (key, child) in map.iter() {
        if key == checker.config.inline_schema_property || schema.has_property(key) {
            continue;
        }
        let child_path = increment_path(path, key);
        let mut matched = false;
        for (regex, pattern_schema) in schema.pattern_properties.iter() {
            if regex.is_match(key) {
                matched = true;
                schema::check(checker, child, pattern_schema, &child_path)?;
            }
        }
        if matched {
            continue;
        }
        match schema.additional_properties {
            Additional::Allowed(true) => (),
            Additional::Allowed(false) => checker.add_error(
                path,
                format!(
                    "The property {} is not defined and the definition does not allow additional properties",
                    key
                ),
            ),
            Additional::Schema(ref extra) => schema::check(checker, child, extra, &child_path)?,
        }
    }
    Ok(())
}
