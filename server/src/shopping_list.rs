//! Shopping-list aggregation and export rendering.
//!
//! The download endpoint joins every ingredient line of the recipes in the
//! caller's cart; this module folds those rows into per-ingredient totals
//! and renders them as plain text, CSV or a printable PDF.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Groups raw `(name, unit, amount)` rows by ingredient and sums the
/// amounts. The same ingredient name under two different units stays
/// separate. Output is ordered by name (then unit).
pub fn aggregate(rows: impl IntoIterator<Item = (String, String, i32)>) -> Vec<ShoppingListEntry> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for (name, unit, amount) in rows {
        *totals.entry((name, unit)).or_insert(0) += i64::from(amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListEntry {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

pub fn render_txt(entries: &[ShoppingListEntry]) -> String {
    let mut text = String::from("Shopping list:\n\n");
    for entry in entries {
        text.push_str(&format!(
            "- {} ({}): {}\n",
            entry.name, entry.measurement_unit, entry.total_amount
        ));
    }
    text
}

pub fn render_csv(entries: &[ShoppingListEntry]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Ingredient", "Amount"])
        .map_err(|e| e.to_string())?;
    for entry in entries {
        writer
            .write_record([
                format!("{} ({})", entry.name, entry.measurement_unit),
                entry.total_amount.to_string(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer
        .into_inner()
        .map_err(|e| e.to_string())
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_STEP_MM: f32 = 8.0;

/// Renders the printable shopping list: title, user/date block, ingredient
/// table and a trailing total count. Long lists flow onto extra pages.
pub fn render_pdf(
    entries: &[ShoppingListEntry],
    user_label: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(
        "Foodgram shopping list",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - 30.0;

    layer_ref.use_text("Foodgram shopping list", 24.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 2.0 * LINE_STEP_MM;

    layer_ref.use_text(
        format!("User: {}", user_label),
        12.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= LINE_STEP_MM;
    layer_ref.use_text(
        format!("Generated: {}", generated_at.format("%d.%m.%Y %H:%M")),
        12.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 2.0 * LINE_STEP_MM;

    layer_ref.use_text("Ingredient", 14.0, Mm(MARGIN_MM), Mm(y), &bold);
    layer_ref.use_text("Amount", 14.0, Mm(150.0), Mm(y), &bold);
    y -= LINE_STEP_MM;

    for entry in entries {
        if y < MARGIN_MM {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT_MM - 30.0;
        }

        write_entry_line(&layer_ref, entry, y, &font);
        y -= LINE_STEP_MM;
    }

    y -= LINE_STEP_MM;
    if y < MARGIN_MM {
        let (next_page, next_layer) =
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        layer_ref = doc.get_page(next_page).get_layer(next_layer);
        y = PAGE_HEIGHT_MM - 30.0;
    }
    layer_ref.use_text(
        format!("Total ingredients: {}", entries.len()),
        12.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );

    doc.save_to_bytes()
}

fn write_entry_line(
    layer: &PdfLayerReference,
    entry: &ShoppingListEntry,
    y: f32,
    font: &IndirectFontRef,
) {
    layer.use_text(
        format!("{} ({})", entry.name, entry.measurement_unit),
        12.0,
        Mm(MARGIN_MM),
        Mm(y),
        font,
    );
    layer.use_text(
        entry.total_amount.to_string(),
        12.0,
        Mm(150.0),
        Mm(y),
        font,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> (String, String, i32) {
        (name.to_string(), unit.to_string(), amount)
    }

    #[test]
    fn test_aggregate_sums_across_recipes() {
        // Recipe A: 200g flour. Recipe B: 50g flour, 100g sugar.
        let entries = aggregate(vec![
            row("flour", "g", 200),
            row("flour", "g", 50),
            row("sugar", "g", 100),
        ]);

        assert_eq!(
            entries,
            vec![
                ShoppingListEntry {
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 250,
                },
                ShoppingListEntry {
                    name: "sugar".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 100,
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_keeps_units_separate() {
        let entries = aggregate(vec![row("milk", "ml", 200), row("milk", "tbsp", 2)]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].measurement_unit, "ml");
        assert_eq!(entries[1].measurement_unit, "tbsp");
    }

    #[test]
    fn test_aggregate_sorts_by_name() {
        let entries = aggregate(vec![
            row("zucchini", "pc", 1),
            row("apple", "pc", 3),
            row("flour", "g", 100),
        ]);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "flour", "zucchini"]);
    }

    #[test]
    fn test_aggregate_empty_cart() {
        let entries = aggregate(Vec::new());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_render_txt() {
        let entries = aggregate(vec![row("flour", "g", 250), row("sugar", "g", 100)]);
        let text = render_txt(&entries);
        assert_eq!(text, "Shopping list:\n\n- flour (g): 250\n- sugar (g): 100\n");
    }

    #[test]
    fn test_render_txt_empty() {
        assert_eq!(render_txt(&[]), "Shopping list:\n\n");
    }

    #[test]
    fn test_render_csv() {
        let entries = aggregate(vec![row("flour", "g", 250)]);
        let bytes = render_csv(&entries).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Ingredient,Amount\nflour (g),250\n");
    }

    #[test]
    fn test_render_csv_quotes_commas() {
        let entries = aggregate(vec![row("salt, coarse", "g", 10)]);
        let text = String::from_utf8(render_csv(&entries).unwrap()).unwrap();
        assert!(text.contains("\"salt, coarse (g)\""));
    }

    #[test]
    fn test_render_pdf_produces_document() {
        let entries = aggregate(vec![row("flour", "g", 250), row("sugar", "g", 100)]);
        let bytes = render_pdf(&entries, "Ada Lovelace", Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_paginates_long_lists() {
        let rows: Vec<_> = (0..120).map(|i| row(&format!("item-{i:03}"), "g", 1)).collect();
        let entries = aggregate(rows);
        let bytes = render_pdf(&entries, "tester", Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
