//! Column-letter and A1 helpers.

use crate::AddressError;

pub const MAX_ROW_COUNT: u32 = 1_048_576;
pub const MAX_COLUMN_COUNT: u16 = 16_384;

/// Convert a zero-based column index to letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_name(index: u16) -> String {
    let mut n = u32::from(index);
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Convert column letters to a zero-based index (A -> 0, AA -> 26).
///
/// Letters are case-insensitive. Columns past `XFD` are rejected.
pub fn column_index(letters: &str) -> Result<u16, AddressError> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err(AddressError::InvalidColumn(letters.to_string()));
    }
    let mut result: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(AddressError::InvalidColumn(letters.to_string()));
        }
        let value = u32::from(ch.to_ascii_uppercase() as u8 - b'A' + 1);
        result = result * 26 + value;
        if result > u32::from(MAX_COLUMN_COUNT) {
            return Err(AddressError::InvalidColumn(letters.to_string()));
        }
    }
    Ok((result - 1) as u16)
}

/// A1 name of a zero-based cell (row 1, col 2 -> "C2").
pub fn cell_name(row: u32, col: u16) -> String {
    format!("{}{}", column_name(col), u64::from(row) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
        assert_eq!(column_name(16_383), "XFD");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A").unwrap(), 0);
        assert_eq!(column_index("z").unwrap(), 25);
        assert_eq!(column_index("AA").unwrap(), 26);
        assert_eq!(column_index("XFD").unwrap(), 16_383);
        assert!(column_index("XFE").is_err());
        assert!(column_index("").is_err());
        assert!(column_index("A1").is_err());
    }

    #[test]
    fn test_cell_name() {
        assert_eq!(cell_name(0, 0), "A1");
        assert_eq!(cell_name(1, 2), "C2");
        assert_eq!(cell_name(14, 3), "D15");
    }
}
