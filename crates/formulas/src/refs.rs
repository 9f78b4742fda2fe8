//! Relative cell tokens used inside `FORMULA RELATIVE` text.
//!
//! A token is `col` or `row`, a sign (`m` subtracts, `p` adds) and a three
//! digit offset from the cell being written: `colm002` is two columns to the
//! left, `rowp001` the next row down. Rows come out 1-based.

use regex::{Captures, Regex};

use tabxl_primitives::{column_name, MAX_COLUMN_COUNT, MAX_ROW_COUNT};

use crate::error::DirectiveError;

/// Replace every relative token in `formula` with an absolute column letter
/// or row number, relative to the zero-based `current_row`/`current_col`.
///
/// Tokens that cannot be resolved (an offset mixing digits and letters, a
/// target outside the sheet) are replaced by an empty string and reported.
/// Offsets without any digit are ordinary text and left alone.
pub fn locate_cells(
    formula: &str,
    current_row: u32,
    current_col: u16,
) -> (String, Vec<DirectiveError>) {
    let mut problems = Vec::new();
    let located = token_regex()
        .replace_all(formula, |caps: &Captures| {
            // Plain words such as "rowmore" are not references
            if !caps["offset"].bytes().any(|b| b.is_ascii_digit()) {
                return caps[0].to_string();
            }
            match locate_token(caps, current_row, current_col) {
                Ok(replacement) => replacement,
                Err(problem) => {
                    problems.push(problem);
                    String::new()
                }
            }
        })
        .into_owned();
    (located, problems)
}

fn locate_token(
    caps: &Captures,
    current_row: u32,
    current_col: u16,
) -> Result<String, DirectiveError> {
    let token = &caps[0];
    let offset: u32 = caps["offset"]
        .parse()
        .map_err(|_| DirectiveError::MalformedOffset(token.to_string()))?;
    let add = &caps["sign"] == "p";
    let out_of_range = || DirectiveError::OutOfRange {
        token: token.to_string(),
    };

    if &caps["axis"] == "col" {
        let current = u32::from(current_col);
        let col = if add {
            current + offset
        } else {
            current.checked_sub(offset).ok_or_else(out_of_range)?
        };
        if col >= u32::from(MAX_COLUMN_COUNT) {
            return Err(out_of_range());
        }
        Ok(column_name(col as u16))
    } else {
        let number = u64::from(current_row) + 1;
        let row = if add {
            number + u64::from(offset)
        } else {
            number
                .checked_sub(u64::from(offset))
                .filter(|&r| r > 0)
                .ok_or_else(out_of_range)?
        };
        if row > u64::from(MAX_ROW_COUNT) {
            return Err(out_of_range());
        }
        Ok(row.to_string())
    }
}

fn token_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<axis>col|row)(?P<sign>[mp])(?P<offset>[[:alnum:]]{3})")
            .expect("valid regex")
    })
}
