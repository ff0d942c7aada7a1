//! Shopping list aggregation and text rendering
//!
//! Merges the ingredient quantities of every recipe in a user's cart by
//! ingredient name, keeping first-seen order, and renders the result as a
//! downloadable plain-text report.

use std::collections::HashMap;

/// Measurement-unit sentinel meaning the ingredient has no fixed quantity
pub const TO_TASTE_UNIT: &str = "to taste";

/// Greeting placed at the top of the rendered report
pub const GREETING: &str =
    "Hi!\nHere is everything you need to buy for the dishes you picked:\n\n";

/// One ingredient-quantity row as read from the store, in encounter order
#[derive(Debug, Clone)]
pub struct QuantityRow {
    pub ingredient_name: String,
    pub amount: Option<i64>,
    pub measurement_unit: String,
}

/// One merged entry of the shopping list report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub amount: Option<i64>,
    pub unit: String,
}

/// Merge quantity rows by exact ingredient name, preserving first-seen order.
///
/// A "to taste" occurrence marks the whole entry: its amount becomes absent
/// and stays absent, and numeric amounts for the same name are silently
/// dropped regardless of where they appear in the walk. Otherwise amounts
/// are summed and the first numeric occurrence's unit is kept. Rows with a
/// numeric unit but no amount carry no information and are skipped.
pub fn merge_quantities(rows: impl IntoIterator<Item = QuantityRow>) -> Vec<ShoppingListEntry> {
    let mut entries: Vec<ShoppingListEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let to_taste = row.measurement_unit == TO_TASTE_UNIT;

        let amount = match row.amount {
            None if !to_taste => continue,
            amount => amount,
        };

        match index.get(&row.ingredient_name) {
            None => {
                index.insert(row.ingredient_name.clone(), entries.len());
                entries.push(ShoppingListEntry {
                    name: row.ingredient_name,
                    amount: if to_taste { None } else { amount },
                    unit: row.measurement_unit,
                });
            }
            Some(&at) => {
                let entry = &mut entries[at];
                if to_taste {
                    entry.amount = None;
                    entry.unit = TO_TASTE_UNIT.to_string();
                } else if entry.unit != TO_TASTE_UNIT {
                    if let Some(amount) = amount {
                        *entry.amount.get_or_insert(0) += amount;
                    }
                }
            }
        }
    }

    entries
}

/// Render the merged report as a line-oriented text document
pub fn render_text(entries: &[ShoppingListEntry]) -> String {
    let mut out = String::from(GREETING);

    for entry in entries {
        match entry.amount {
            Some(amount) => {
                out.push_str(&format!("{} - {} - {}\n", entry.name, amount, entry.unit))
            }
            None => out.push_str(&format!("{} - {}\n", entry.name, entry.unit)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, amount: Option<i64>, unit: &str) -> QuantityRow {
        QuantityRow {
            ingredient_name: name.to_string(),
            amount,
            measurement_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_duplicate_amounts_are_summed() {
        let merged = merge_quantities([
            row("Flour", Some(200), "g"),
            row("Flour", Some(100), "g"),
        ]);

        assert_eq!(
            merged,
            vec![ShoppingListEntry {
                name: "Flour".to_string(),
                amount: Some(300),
                unit: "g".to_string(),
            }]
        );
    }

    #[test]
    fn test_to_taste_first_suppresses_later_amounts() {
        let merged = merge_quantities([
            row("Salt", Some(5), TO_TASTE_UNIT),
            row("Salt", Some(10), "g"),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].amount, None);
        assert_eq!(merged[0].unit, TO_TASTE_UNIT);
    }

    #[test]
    fn test_to_taste_later_still_suppresses_amount() {
        let merged = merge_quantities([
            row("Salt", Some(10), "g"),
            row("Salt", None, TO_TASTE_UNIT),
            row("Salt", Some(3), "g"),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].amount, None);
        assert_eq!(merged[0].unit, TO_TASTE_UNIT);
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let merged = merge_quantities([
            row("Zucchini", Some(2), "pcs"),
            row("Avocado", Some(1), "pcs"),
            row("Zucchini", Some(3), "pcs"),
            row("Milk", Some(500), "ml"),
        ]);

        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Zucchini", "Avocado", "Milk"]);
        assert_eq!(merged[0].amount, Some(5));
    }

    #[test]
    fn test_amountless_numeric_rows_are_skipped() {
        let merged = merge_quantities([
            row("Pepper", None, "g"),
            row("Flour", Some(200), "g"),
            row("Flour", None, "g"),
        ]);

        assert_eq!(
            merged,
            vec![ShoppingListEntry {
                name: "Flour".to_string(),
                amount: Some(200),
                unit: "g".to_string(),
            }]
        );
    }

    #[test]
    fn test_ingredient_names_merge_case_sensitively() {
        let merged = merge_quantities([row("salt", Some(1), "g"), row("Salt", Some(1), "g")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty_cart_renders_greeting_only() {
        let merged = merge_quantities([]);
        assert!(merged.is_empty());
        assert_eq!(render_text(&merged), GREETING);
    }

    #[test]
    fn test_render_line_shapes() {
        let entries = vec![
            ShoppingListEntry {
                name: "Salt".to_string(),
                amount: None,
                unit: TO_TASTE_UNIT.to_string(),
            },
            ShoppingListEntry {
                name: "Flour".to_string(),
                amount: Some(300),
                unit: "g".to_string(),
            },
        ];

        let text = render_text(&entries);
        assert!(text.starts_with(GREETING));
        assert!(text.contains("Salt - to taste\n"));
        assert!(text.contains("Flour - 300 - g\n"));
    }
}
