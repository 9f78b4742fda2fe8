use tabxl_formulas::{locate_cells, resolve_directive, DirectiveError, FormulaDirective};
use tabxl_primitives::CellAddress;

#[test]
fn test_sum_row_range_uses_one_based_current_row() {
    for row in [0u32, 1, 9, 99] {
        let resolved = resolve_directive("SUM ROW B-D", CellAddress::new(row, 4), None);
        assert_eq!(resolved.formula, format!("=SUM(B{0}:D{0})", row + 1));
    }
}

#[test]
fn test_sum_row_list() {
    let resolved = resolve_directive("SUM ROW A,C", CellAddress::new(1, 2), None);
    assert_eq!(resolved.formula, "=SUM(A2+C2)");

    let resolved = resolve_directive("SUM ROW B,D,F", CellAddress::new(4, 7), None);
    assert_eq!(resolved.formula, "=SUM(B5+D5+F5)");
}

#[test]
fn test_sum_col_spans_first_data_row_to_row_above() {
    let resolved = resolve_directive("SUM COL", CellAddress::new(3, 2), Some(1));
    assert_eq!(resolved.formula, "=SUM(C2:C3)");

    let resolved = resolve_directive("SUM COL", CellAddress::new(12, 27), Some(4));
    assert_eq!(resolved.formula, "=SUM(AB5:AB12)");
}

#[test]
fn test_relative_formula() {
    let directive: FormulaDirective = "FORMULA RELATIVE (colm001rowp000-colm002rowp000)/colm001rowp000"
        .parse()
        .expect("directive");
    let resolved = directive.resolve(CellAddress::new(12, 6), None);
    assert_eq!(resolved.formula, "=(F13-E13)/F13");
}

#[test]
fn test_relative_formula_reports_bad_tokens_but_keeps_the_rest() {
    let resolved = resolve_directive(
        "FORMULA RELATIVE colm0a1rowp000+colm001rowp000",
        CellAddress::new(0, 3),
        None,
    );
    assert_eq!(resolved.formula, "=1+C1");
    assert_eq!(
        resolved.problems,
        vec![DirectiveError::MalformedOffset("colm0a1".to_string())]
    );
}

#[test]
fn test_locate_cells_matches_documented_example() {
    let (located, problems) = locate_cells("colm001rowp000 + colm002rowp001", 13, 5);
    assert_eq!(located, "E14 + D15");
    assert!(problems.is_empty());
}

#[test]
fn test_unknown_keyword_resolves_to_nothing() {
    let resolved = resolve_directive("FORMULA ABSOLUTE A1", CellAddress::new(0, 0), None);
    assert!(resolved.formula.is_empty());
    assert!(matches!(resolved.problems[0], DirectiveError::Unknown(_)));
}

#[test]
fn test_sum_col_in_first_data_row_has_nothing_to_sum() {
    let resolved = resolve_directive("SUM COL", CellAddress::new(1, 1), Some(1));
    assert!(resolved.formula.is_empty());
    assert_eq!(resolved.problems, vec![DirectiveError::NoRowsAbove { row: 1 }]);

    let resolved = resolve_directive("SUM COL", CellAddress::new(2, 1), Some(1));
    assert_eq!(resolved.formula, "=SUM(B2:B2)");
}

#[test]
fn test_relative_formula_leaves_plain_words_alone() {
    let resolved = resolve_directive(
        "FORMULA RELATIVE IF(colm001rowp000>0,\"rowmore\",\"\")",
        CellAddress::new(4, 2),
        None,
    );
    assert_eq!(resolved.formula, "=IF(B5>0,\"rowmore\",\"\")");
    assert!(resolved.is_clean());
}
