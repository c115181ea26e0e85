use super::types::Row;

/// Index of the row that carries column headers
pub const HEADER_ROW: usize = 0;

/// Convert column index (0-based) to a column letter (A, B, ..., Z, AA, AB, ...)
pub fn column_index_to_letter(index: usize) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert a column letter back to its 0-based index. Case-insensitive.
pub fn letter_to_column_index(letter: &str) -> Option<usize> {
    if letter.is_empty() {
        return None;
    }

    let mut n: usize = 0;
    for c in letter.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }

    Some(n - 1)
}

/// A1-style reference for a column label and a 0-based row index
pub fn cell_reference(column: &str, row_index: usize) -> String {
    format!("{}{}", column, row_index + 1)
}

/// The header row of a sheet, if the sheet has any rows
pub fn header_row(rows: &[Row]) -> Option<&Row> {
    rows.get(HEADER_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(1), "B");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(27), "AB");
        assert_eq!(column_index_to_letter(51), "AZ");
        assert_eq!(column_index_to_letter(52), "BA");
        assert_eq!(column_index_to_letter(701), "ZZ");
        assert_eq!(column_index_to_letter(702), "AAA");
    }

    #[test]
    fn test_letter_to_column_index() {
        assert_eq!(letter_to_column_index("A"), Some(0));
        assert_eq!(letter_to_column_index("z"), Some(25));
        assert_eq!(letter_to_column_index("AA"), Some(26));
        assert_eq!(letter_to_column_index("AAA"), Some(702));
        assert_eq!(letter_to_column_index(""), None);
        assert_eq!(letter_to_column_index("A1"), None);

        for i in [0, 9, 25, 26, 300, 18277] {
            assert_eq!(letter_to_column_index(&column_index_to_letter(i)), Some(i));
        }
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference("C", 0), "C1");
        assert_eq!(cell_reference("AB", 41), "AB42");
    }

    #[test]
    fn test_header_row() {
        assert!(header_row(&[]).is_none());

        let mut first = Row::new();
        first.insert("A", CellValue::from("Revenue"));
        let rows = vec![first, Row::new()];
        let header = header_row(&rows).unwrap();
        assert_eq!(header.get("A"), Some(&CellValue::from("Revenue")));
    }
}
