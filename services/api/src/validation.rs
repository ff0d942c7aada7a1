//! Input validation for recipe payloads

use base64::Engine;
use std::collections::HashSet;

use crate::models::recipe::IngredientEntry;

/// Minimum accepted value for amounts and cooking time
pub const MIN_VALUE: i32 = 1;

/// Validate the tag id list of a create/update payload
pub fn validate_tag_ids(tags: &[i64]) -> Result<(), String> {
    if tags.is_empty() {
        return Err("at least one tag must be specified".to_string());
    }

    let unique: HashSet<i64> = tags.iter().copied().collect();
    if unique.len() != tags.len() {
        return Err("the same tag cannot be specified more than once".to_string());
    }

    Ok(())
}

/// Validate the ingredient list of a create/update payload
///
/// Whether an omitted amount is acceptable depends on the ingredient's
/// measurement unit, which is only known once the ids are resolved against
/// the store; that check lives in the recipe repository.
pub fn validate_ingredient_entries(entries: &[IngredientEntry]) -> Result<(), String> {
    if entries.is_empty() {
        return Err("at least one ingredient must be specified".to_string());
    }

    let unique: HashSet<i64> = entries.iter().map(|e| e.id).collect();
    if unique.len() != entries.len() {
        return Err("the same ingredient cannot be specified more than once".to_string());
    }

    for entry in entries {
        if let Some(amount) = entry.amount {
            if amount < MIN_VALUE {
                return Err(format!("ingredient amount must be at least {}", MIN_VALUE));
            }
        }
    }

    Ok(())
}

/// Validate cooking time
pub fn validate_cooking_time(minutes: i32) -> Result<(), String> {
    if minutes < MIN_VALUE {
        return Err(format!("cooking time must be at least {}", MIN_VALUE));
    }

    Ok(())
}

/// Validate a base64-encoded image payload
///
/// Accepts either a bare base64 string or a `data:<mime>;base64,` prefixed
/// one as sent by browsers.
pub fn validate_image(data: &str) -> Result<(), String> {
    if data.is_empty() {
        return Err("image must not be empty".to_string());
    }

    let encoded = match data.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => data,
    };

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| "image must be valid base64 data".to_string())?;

    Ok(())
}
