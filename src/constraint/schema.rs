use super::*;
use crate::schema::{Additional, Dependency, Extends, Items, Requires, TypeEntry};
use crate::uri::Uri;
use std::borrow::Cow;
use std::iter::Peekable;
use tracing::{debug, trace};

/// Check `value` against every constraint in `schema`, following `$ref` and `extends` first.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    checker.enter()?;
    let result = check_in_scope(checker, value, schema, path);
    checker.leave();
    result
}

/// Same as [`check`] without taking a depth step. Links followed at the same spot in the value
/// use this, so only nesting counts against the limit.
fn check_in_scope(
    checker: &mut Checker,
    value: &Value,
    schema: &Schema,
    path: &str,
) -> Result<()> {
    let base = match schema.id {
        Some(ref id) => Some(checker.resolver.resolve(id, checker.base())?),
        None => None,
    };
    let pushed_base = base.is_some();
    if let Some(base) = base {
        checker.bases.push(base);
    }

    let result = check_all(checker, value, schema, path);

    if pushed_base {
        checker.bases.pop();
    }
    result
}

fn check_all(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    if let Some(ref reference) = schema.reference {
        trace!(reference = reference.as_str(), "following $ref");
        check_link(checker, value, reference, path)?;
    }

    for parent in schema.extends.iter() {
        match parent {
            Extends::Schema(parent) => check(checker, value, parent, path)?,
            Extends::Uri(uri) => {
                debug!(uri = uri.as_str(), base = checker.base(), "resolving extends");
                check_link(checker, value, uri, path)?
            }
        }
    }

    types::check_type(checker, value, schema, path)?;
    enum_set::check(checker, value, schema, path)?;
    format::check(checker, value, schema, path)?;
    object::check(checker, value, schema, path)?;
    array::check(checker, value, schema, path)?;
    string::check(checker, value, schema, path)?;
    number::check(checker, value, schema, path)?;
    types::check_disallow(checker, value, schema, path)
}

/// Check `value` against the schema a `$ref` or `extends` URI points at.
///
/// The part before `#` picks the document: the enclosing one when empty, or else the URI
/// resolved against the current base and imported through the registry. The part after `#` is a
/// JSON pointer into that document. A link that is already being applied to the same spot in
/// the value is skipped, which is what stops self-referencing schemas from looping.
pub(super) fn check_link(
    checker: &mut Checker,
    value: &Value,
    link: &str,
    path: &str,
) -> Result<()> {
    let (doc, fragment) = link.split_once('#').unwrap_or((link, ""));

    let current = checker
        .document()
        .map(|d| (d.key.clone(), Arc::clone(&d.schema)));
    let (key, document, base) = if doc.is_empty() {
        let (key, document) = current.ok_or_else(|| Error::InvalidSourceUri(link.to_string()))?;
        (key, document, None)
    } else {
        let resolved = checker.resolver.resolve(doc, checker.base())?;
        if !Uri::is_valid(&resolved) {
            return Err(Error::InvalidSourceUri(resolved));
        }
        match current {
            Some((key, document)) if key == resolved => (key, document, None),
            _ => {
                let document = checker.registry.import(&resolved)?;
                (resolved.clone(), document, Some(resolved))
            }
        }
    };

    let active = (format!("{}#{}", key, fragment), path.to_string());
    if checker.active.contains(&active) {
        trace!(link, path, "link already applied here, skipping");
        return Ok(());
    }

    let target = if fragment.is_empty() || fragment == "/" {
        Cow::Borrowed(document.as_ref())
    } else {
        Cow::Owned(pointer_target(&document, fragment)?)
    };

    checker.active.push(active);
    let result = checker.with_document(key, Arc::clone(&document), base, |checker| {
        check_in_scope(checker, value, &target, path)
    });
    checker.active.pop();
    result
}

enum Cursor<'a> {
    Schema(&'a Schema),
    Raw(&'a Value),
}

fn next_segment<I: Iterator<Item = String>>(
    segments: &mut Peekable<I>,
    not_found: &impl Fn() -> Error,
) -> Result<String> {
    segments.next().ok_or_else(not_found)
}

fn next_index<I: Iterator<Item = String>>(
    segments: &mut Peekable<I>,
    not_found: &impl Fn() -> Error,
) -> Result<usize> {
    next_segment(segments, not_found)?
        .parse()
        .map_err(|_| not_found())
}

/// Follow a JSON pointer (`/properties/name`, `/items/0`, `/definitions/thing`, ...) from the
/// root of a schema document.
fn pointer_target(root: &Schema, pointer: &str) -> Result<Schema> {
    let not_found =
        || Error::InvalidSchema(format!("reference target \"#{}\" does not exist", pointer));
    let mut segments = pointer
        .strip_prefix('/')
        .ok_or_else(not_found)?
        .split('/')
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .peekable();

    let mut cursor = Cursor::Schema(root);
    while let Some(segment) = segments.next() {
        cursor = match cursor {
            Cursor::Schema(schema) => match segment.as_str() {
                "properties" => {
                    let name = next_segment(&mut segments, &not_found)?;
                    let property = schema.property_named(&name).ok_or_else(not_found)?;
                    Cursor::Schema(property.schema())
                }
                "patternProperties" => {
                    let source = next_segment(&mut segments, &not_found)?;
                    schema
                        .pattern_properties
                        .iter()
                        .find(|(regex, _)| regex.as_str() == source)
                        .map(|(_, s)| Cursor::Schema(s))
                        .ok_or_else(not_found)?
                }
                "items" => match schema.items {
                    Some(Items::Schema(ref s)) => Cursor::Schema(s),
                    Some(Items::Tuple(ref list)) => {
                        let index = next_index(&mut segments, &not_found)?;
                        Cursor::Schema(list.get(index).ok_or_else(not_found)?)
                    }
                    None => return Err(not_found()),
                },
                "additionalProperties" => match schema.additional_properties {
                    Additional::Schema(ref s) => Cursor::Schema(s),
                    Additional::Allowed(_) => return Err(not_found()),
                },
                "additionalItems" => match schema.additional_items {
                    Additional::Schema(ref s) => Cursor::Schema(s),
                    Additional::Allowed(_) => return Err(not_found()),
                },
                "extends" => {
                    let index = match segments.peek().and_then(|s| s.parse::<usize>().ok()) {
                        Some(index) => {
                            segments.next();
                            index
                        }
                        None if schema.extends.len() == 1 => 0,
                        None => return Err(not_found()),
                    };
                    match schema.extends.get(index) {
                        Some(Extends::Schema(s)) => Cursor::Schema(s),
                        _ => return Err(not_found()),
                    }
                }
                "type" | "disallow" => {
                    let list = if segment == "type" {
                        &schema.types
                    } else {
                        &schema.disallow
                    };
                    let index = next_index(&mut segments, &not_found)?;
                    match list.get(index) {
                        Some(TypeEntry::Schema(s)) => Cursor::Schema(s),
                        _ => return Err(not_found()),
                    }
                }
                "dependencies" => {
                    let name = next_segment(&mut segments, &not_found)?;
                    match schema.dependencies.iter().find(|(n, _)| *n == name) {
                        Some((_, Dependency::Schema(s))) => Cursor::Schema(s),
                        _ => return Err(not_found()),
                    }
                }
                "requires" => match schema.requires {
                    Some(Requires::Schema(ref s)) => Cursor::Schema(s),
                    _ => return Err(not_found()),
                },
                other => Cursor::Raw(schema.extra.get(other).ok_or_else(not_found)?),
            },
            Cursor::Raw(raw) => {
                let next = match raw {
                    Value::Map(map) => map.get(&segment),
                    Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
                    _ => None,
                };
                Cursor::Raw(next.ok_or_else(not_found)?)
            }
        };
    }

    match cursor {
        Cursor::Schema(schema) => Ok(schema.clone()),
        Cursor::Raw(raw) => Schema::from_value(raw),
    }
}
