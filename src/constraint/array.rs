use super::*;
use crate::schema::{Additional, Items};

/// Check an array's length, items, and uniqueness. Does nothing for any other kind of value.
pub(super) fn check(checker: &mut Checker, value: &Value, schema: &Schema, path: &str) -> Result<()> {
    let list = match value.as_array() {
        Some(list) => list,
        None => return Ok(()),
    };

    if let Some(min) = schema.min_items {
        if list.len() < min {
            checker.add_error(
                path,
                format!("There must be a minimum of {} items in the array", min),
            );
        }
    }
    if let Some(max) = schema.max_items {
        if list.len() > max {
            checker.add_error(
                path,
                format!("There must be a maximum of {} items in the array", max),
            );
        }
    }

    match schema.items {
        Some(Items::Schema(ref items)) => {
            for (index, item) in list.iter().enumerate() {
                schema::check(checker, item, items, &index_path(path, index))?;
            }
        }
        Some(Items::Tuple(ref tuple)) => {
            for (index, (item, item_schema)) in list.iter().zip(tuple.iter()).enumerate() {
                schema::check(checker, item, item_schema, &index_path(path, index))?;
            }
            if list.len() > tuple.len() {
                match schema.additional_items {
                    Additional::Allowed(true) => (),
                    Additional::Allowed(false) => checker.add_error(
                        path,
                        format!(
                            "The array may have at most {} items; the definition does not allow additional items",
                            tuple.len()
                        ),
                    ),
                    Additional::Schema(ref extra) => {
                        for (index, item) in list.iter().enumerate().skip(tuple.len()) {
                            schema::check(checker, item, extra, &index_path(path, index))?;
                        }
                    }
                }
            }
        }
        None => (),
    }

    if schema.unique_items {
        let duplicate = list.iter().enumerate().find_map(|(index, lhs)| {
            list[index + 1..]
                .iter()
                .position(|rhs| lhs == rhs)
                .map(|offset| (index, index + 1 + offset))
        });
        if let Some((first, second)) = duplicate {
            checker.add_error(
                path,
                format!(
                    "There are no duplicates allowed in the array (items {} and {} are equal)",
                    first, second
                ),
            );
        }
    }
    Ok(())
}
