use std::fmt::Write;

use super::ContextLimits;
use crate::sheet::{header_row, CellValue, Dataset, Sheet};

/// Rendered context for one query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchContext {
    pub main: String,
    /// `(sheet name, rendered glossary)` when a glossary sheet is selected and present
    pub glossary: Option<(String, String)>,
}

/// Render the main and glossary context of a dataset snapshot
pub fn build_context(dataset: &Dataset, limits: &ContextLimits) -> SearchContext {
    SearchContext {
        main: build_main_context(&dataset.sheets, limits),
        glossary: dataset
            .glossary()
            .map(|sheet| (sheet.name.clone(), build_glossary_context(sheet, limits))),
    }
}

/// Render every sheet as headers, sample rows and formulas, capped at `main_context_chars`
pub fn build_main_context(sheets: &[Sheet], limits: &ContextLimits) -> String {
    let mut context = String::new();

    for sheet in sheets {
        let _ = writeln!(context, "\nSHEET: {}", sheet.name);

        if let Some(header) = header_row(&sheet.rows) {
            let headers: Vec<String> = header
                .values()
                .filter(|v| !v.is_blank())
                .map(CellValue::to_string)
                .collect();
            let _ = writeln!(context, "HEADERS: {}", headers.join(", "));

            context.push_str("SAMPLE DATA:\n");
            for (index, row) in sheet.rows.iter().take(limits.sample_rows).enumerate() {
                let values: Vec<String> = row.values().map(CellValue::to_string).collect();
                let _ = writeln!(context, "Row {}: {}", index + 1, values.join(" | "));
            }

            let formulas: Vec<String> = sheet
                .formulas()
                .take(limits.max_formulas)
                .map(|(reference, formula)| format!("{}: {}", reference, formula))
                .collect();
            if !formulas.is_empty() {
                let _ = writeln!(context, "FORMULAS: {}", formulas.join(", "));
            }
        }
        context.push('\n');
    }

    truncate_chars(context, limits.main_context_chars)
}

/// Render columns A and B of the glossary sheet as `term: definition` lines
pub fn build_glossary_context(sheet: &Sheet, limits: &ContextLimits) -> String {
    let mut context = String::from("DEFINITIONS AND BUSINESS TERMS:\n");

    for row in &sheet.rows {
        let term = row.get_column("A").and_then(CellValue::as_text);
        let definition = row.get_column("B").and_then(CellValue::as_text);

        if let (Some(term), Some(definition)) = (term, definition) {
            if !term.is_empty() && !definition.is_empty() {
                let _ = writeln!(context, "{}: {}", term, definition);
            }
        }
    }

    truncate_chars(context, limits.glossary_context_chars)
}

/// Keep the first `max` characters; may cut mid-line
fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max) {
        text.truncate(byte_idx);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Row;
    use chrono::Utc;
    use std::sync::Arc;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells.iter().cloned().collect()
    }

    fn text_row(cells: &[(&str, &str)]) -> Row {
        cells.iter().map(|(k, v)| (*k, CellValue::from(*v))).collect()
    }

    fn sales_sheet() -> Sheet {
        Sheet::new(
            "Sales",
            vec![
                text_row(&[("A", "Region"), ("B", "Revenue"), ("C", "")]),
                row(&[("A", CellValue::from("North")), ("B", CellValue::Number(1200.0))]),
                row(&[("A", CellValue::from("South")), ("B", CellValue::Number(800.5))]),
                text_row(&[("A", "Total"), ("B", "=SUM(B2:B3)")]),
            ],
        )
    }

    #[test]
    fn test_main_context_layout() {
        let context = build_main_context(&[sales_sheet()], &ContextLimits::default());

        assert_eq!(
            context,
            "\nSHEET: Sales\n\
             HEADERS: Region, Revenue\n\
             SAMPLE DATA:\n\
             Row 1: Region | Revenue | \n\
             Row 2: North | 1200\n\
             Row 3: South | 800.5\n\
             Row 4: Total | =SUM(B2:B3)\n\
             FORMULAS: B4: =SUM(B2:B3)\n\
             \n"
        );
    }

    #[test]
    fn test_sample_rows_and_formulas_are_capped() {
        let rows: Vec<Row> = (0..30)
            .map(|i| text_row(&[("A", format!("=A{}+1", i + 1).as_str()), ("B", "x")]))
            .collect();
        let sheet = Sheet::new("Big", rows);
        let limits = ContextLimits::default();

        let context = build_main_context(&[sheet], &limits);
        assert!(context.contains("Row 5:"));
        assert!(!context.contains("Row 6:"));

        let formulas_line = context.lines().find(|l| l.starts_with("FORMULAS:")).unwrap();
        assert_eq!(formulas_line.matches(": =").count(), 10);
        assert!(formulas_line.contains("A10: =A10+1"));
        assert!(!formulas_line.contains("A11:"));
    }

    #[test]
    fn test_main_context_never_exceeds_limit() {
        let sheets: Vec<Sheet> = (0..50)
            .map(|i| {
                Sheet::new(
                    format!("Sheet{}", i),
                    vec![text_row(&[("A", "é".repeat(200).as_str()), ("B", "header")])],
                )
            })
            .collect();

        let limits = ContextLimits::default();
        let context = build_main_context(&sheets, &limits);
        assert_eq!(context.chars().count(), 4000);
    }

    #[test]
    fn test_glossary_context() {
        let glossary = Sheet::new(
            "Terms",
            vec![
                text_row(&[("A", "ARR"), ("B", "Annual recurring revenue")]),
                row(&[("a", CellValue::from("GM")), ("b", CellValue::from("Gross margin"))]),
                row(&[("A", CellValue::from("Count")), ("B", CellValue::Number(3.0))]),
                text_row(&[("A", "Orphan")]),
                text_row(&[("A", ""), ("B", "No term")]),
            ],
        );

        let context = build_glossary_context(&glossary, &ContextLimits::default());
        assert_eq!(
            context,
            "DEFINITIONS AND BUSINESS TERMS:\nARR: Annual recurring revenue\nGM: Gross margin\n"
        );
    }

    #[test]
    fn test_glossary_context_never_exceeds_limit() {
        let rows = (0..200)
            .map(|i| {
                let term = format!("term{}", i);
                text_row(&[("A", term.as_str()), ("B", "a fairly long definition")])
            })
            .collect();
        let context = build_glossary_context(&Sheet::new("G", rows), &ContextLimits::default());
        assert_eq!(context.chars().count(), 1000);
    }

    #[test]
    fn test_build_context_is_deterministic_and_resolves_glossary() {
        let dataset = Dataset {
            id: "d".to_string(),
            name: "Book".to_string(),
            sheets: Arc::new(vec![
                sales_sheet(),
                Sheet::new(
                    "Terms",
                    vec![text_row(&[("A", "ARR"), ("B", "Annual recurring revenue")])],
                ),
            ]),
            loaded_at: Utc::now(),
            checksum: None,
            glossary_sheet: Some("Terms".to_string()),
        };

        let limits = ContextLimits::default();
        let first = build_context(&dataset, &limits);
        let second = build_context(&dataset, &limits);
        assert_eq!(first, second);

        let (name, glossary) = first.glossary.unwrap();
        assert_eq!(name, "Terms");
        assert!(glossary.contains("ARR: Annual recurring revenue"));

        let unresolved = Dataset {
            glossary_sheet: Some("Gone".to_string()),
            ..dataset
        };
        assert!(build_context(&unresolved, &limits).glossary.is_none());
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), "hé");
        assert_eq!(truncate_chars("abc".to_string(), 10), "abc");
        assert_eq!(truncate_chars("abc".to_string(), 0), "");
    }
}
