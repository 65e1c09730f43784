use crate::data::{Record, Table};

use super::{classify, normalize, similarity, SearchIntent, SuperlativeTarget, FUZZY_THRESHOLD};

/// Classify a query and execute it against the table in one step.
/// Returns at most one record; `None` is a normal "no match" outcome.
pub fn classify_and_match<'a>(table: &'a Table, raw_query: &str) -> Option<&'a Record> {
    let intent = classify(raw_query, table);
    log::debug!("Query {:?} classified as {:?}", raw_query, intent);
    find_match(table, &intent)
}

/// Execute a classified intent. Deterministic: ties always break in
/// table order.
pub fn find_match<'a>(table: &'a Table, intent: &SearchIntent) -> Option<&'a Record> {
    match intent {
        SearchIntent::NameMatch { query } => match_by_name(table, query),
        SearchIntent::Superlative(target) => match_superlative(table, target),
        SearchIntent::AttributeComparison {
            column,
            keyword,
            comparison,
        } => match_attribute(table, column, keyword, *comparison),
        SearchIntent::PositionSynonym { code } => table
            .rows()
            .iter()
            .find(|row| row.get_or_unknown("Pos").eq_ignore_ascii_case(code)),
        SearchIntent::Substring { query } => match_substring(table, query),
    }
}

fn match_by_name<'a>(table: &'a Table, query: &str) -> Option<&'a Record> {
    let key_column = table.key_column().to_string();

    // Exact case-insensitive match first.
    if let Some(row) = table
        .rows()
        .iter()
        .find(|row| normalize(row.get_or_unknown(&key_column)) == *query)
    {
        return Some(row);
    }

    // Otherwise the single best fuzzy candidate, if it clears the bar.
    let mut best: Option<(&Record, f64)> = None;
    for row in table.rows() {
        let score = similarity(query, row.get_or_unknown(&key_column));
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((row, score));
        }
    }
    best.and_then(|(row, score)| (score >= FUZZY_THRESHOLD).then_some(row))
}

/// First row holding the maximum of `score`; non-numeric cells rank as 0.
fn rank_first<'a>(table: &'a Table, score: impl Fn(&Record) -> f64) -> Option<&'a Record> {
    let mut best: Option<(&Record, f64)> = None;
    for row in table.rows() {
        let value = score(row);
        if best.map_or(true, |(_, s)| value > s) {
            best = Some((row, value));
        }
    }
    best.map(|(row, _)| row)
}

fn match_superlative<'a>(table: &'a Table, target: &SuperlativeTarget) -> Option<&'a Record> {
    match target {
        SuperlativeTarget::Goals => rank_first(table, |row| row.numeric_or("Gls", 0.0)),
        SuperlativeTarget::Assists => rank_first(table, |row| row.numeric_or("Ast", 0.0)),
        SuperlativeTarget::MarketValue => {
            if table.has_column("Value") {
                rank_first(table, |row| row.numeric_or("Value", 0.0))
            } else {
                // No value column: rank by goal involvement instead.
                rank_first(table, |row| {
                    row.numeric_or("Gls", 0.0) + 0.8 * row.numeric_or("Ast", 0.0)
                })
            }
        }
    }
}

fn match_attribute<'a>(
    table: &'a Table,
    column: &str,
    keyword: &str,
    comparison: Option<(super::CompareOp, i64)>,
) -> Option<&'a Record> {
    if let Some((op, value)) = comparison {
        // Non-numeric cells are excluded from the comparison entirely.
        let hit = table
            .rows()
            .iter()
            .find(|row| row.numeric(column).is_some_and(|v| op.matches(v, value as f64)));
        if hit.is_some() {
            return hit;
        }
    }
    // No comparison, or nothing survived it: substring on the same column.
    column_contains(table, column, keyword)
}

fn column_contains<'a>(table: &'a Table, column: &str, needle: &str) -> Option<&'a Record> {
    let needle = needle.to_lowercase();
    table
        .rows()
        .iter()
        .find(|row| row.get_or_unknown(column).to_lowercase().contains(&needle))
}

/// Category text columns given a fuzzy pass before the final
/// any-column substring fallback.
const FUZZY_COLUMNS: &[&str] = &["Squad", "Nation", "Pos"];

fn match_substring<'a>(table: &'a Table, query: &str) -> Option<&'a Record> {
    for column in FUZZY_COLUMNS {
        if !table.has_column(column) {
            continue;
        }
        let mut best: Option<(&Record, f64)> = None;
        for row in table.rows() {
            let score = similarity(query, row.get_or_unknown(column));
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((row, score));
            }
        }
        if let Some((row, score)) = best {
            if score >= FUZZY_THRESHOLD {
                return Some(row);
            }
        }
    }

    // Final fallback: first column in table order with any substring hit,
    // first matching row within it.
    for column in table.columns() {
        if let Some(row) = column_contains(table, column, query) {
            return Some(row);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::CompareOp;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> Record {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Record::new(values)
    }

    fn table(rows: Vec<Record>) -> Table {
        let columns = ["Player", "Squad", "Nation", "Pos", "Gls", "Ast", "MP", "Age"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Table::new("Player".to_string(), columns, rows)
    }

    fn sample() -> Table {
        table(vec![
            row(&[
                ("Player", "Leo Messi"),
                ("Squad", "Inter Miami"),
                ("Nation", "Argentina"),
                ("Pos", "FW"),
                ("Gls", "3"),
                ("Ast", "12"),
                ("MP", "20"),
                ("Age", "36"),
            ]),
            row(&[
                ("Player", "Leo Messy"),
                ("Squad", "Sunday FC"),
                ("Nation", "England"),
                ("Pos", "MF"),
                ("Gls", "7"),
                ("Ast", "1"),
                ("MP", "10"),
                ("Age", "29"),
            ]),
            row(&[
                ("Player", "Erling Haaland"),
                ("Squad", "Man City"),
                ("Nation", "Norway"),
                ("Pos", "FW"),
                ("Gls", "5"),
                ("Ast", "2"),
                ("MP", "30"),
                ("Age", "23"),
            ]),
        ])
    }

    #[test]
    fn exact_name_takes_priority_over_fuzzy() {
        let t = sample();
        let hit = classify_and_match(&t, "Leo Messi").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messi"));

        let hit = classify_and_match(&t, "Leo Messy").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messy"));
    }

    #[test]
    fn fuzzy_name_match_returns_best_candidate() {
        let t = sample();
        let hit = classify_and_match(&t, "Erling Haland").unwrap();
        assert_eq!(hit.get("Player"), Some("Erling Haaland"));
    }

    #[test]
    fn top_scorer_returns_row_with_most_goals() {
        let t = sample();
        let hit = classify_and_match(&t, "top scorer").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messy"));
        assert_eq!(hit.get("Gls"), Some("7"));
    }

    #[test]
    fn most_assists_ranks_by_assist_column() {
        let t = sample();
        let hit = classify_and_match(&t, "most assists").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messi"));
    }

    #[test]
    fn highest_value_without_value_column_uses_goal_involvement() {
        let t = sample();
        // Messi: 3 + 0.8*12 = 12.6 beats Messy 7.8 and Haaland 6.6.
        let hit = classify_and_match(&t, "most valuable player").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messi"));
    }

    #[test]
    fn superlative_tie_breaks_in_table_order() {
        let t = table(vec![
            row(&[("Player", "A"), ("Gls", "5")]),
            row(&[("Player", "B"), ("Gls", "5")]),
        ]);
        let hit = find_match(&t, &SearchIntent::Superlative(SuperlativeTarget::Goals)).unwrap();
        assert_eq!(hit.get("Player"), Some("A"));
    }

    #[test]
    fn comparison_returns_first_surviving_row() {
        let t = table(vec![
            row(&[("Player", "A"), ("Gls", "5")]),
            row(&[("Player", "B"), ("Gls", "12")]),
            row(&[("Player", "C"), ("Gls", "20")]),
        ]);
        let hit = classify_and_match(&t, "more than 10 goals").unwrap();
        assert_eq!(hit.get("Player"), Some("B"));
    }

    #[test]
    fn comparison_excludes_non_numeric_cells() {
        let t = table(vec![
            row(&[("Player", "A"), ("Gls", "Unknown")]),
            row(&[("Player", "B"), ("Gls", "15")]),
        ]);
        let hit = classify_and_match(&t, "more than 10 goals").unwrap();
        assert_eq!(hit.get("Player"), Some("B"));
    }

    #[test]
    fn empty_comparison_falls_back_to_column_substring() {
        let t = table(vec![row(&[("Player", "A"), ("Pos", "GK, FW")])]);
        let intent = SearchIntent::AttributeComparison {
            column: "Pos".to_string(),
            keyword: "pos".to_string(),
            comparison: Some((CompareOp::Gt, 100)),
        };
        // Numeric filter survives nothing and the substring fallback on
        // the same column misses too.
        assert!(find_match(&t, &intent).is_none());
    }

    #[test]
    fn position_synonym_matches_case_insensitively() {
        let t = table(vec![
            row(&[("Player", "A"), ("Pos", "fw")]),
            row(&[("Player", "B"), ("Pos", "GK")]),
        ]);
        let hit = classify_and_match(&t, "goalkeeper").unwrap();
        assert_eq!(hit.get("Player"), Some("B"));
    }

    #[test]
    fn substring_fuzzy_pass_covers_category_columns() {
        let t = sample();
        // Misspelled nation, no keyword, no name hit.
        let hit = classify_and_match(&t, "Argentinia").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messi"));
    }

    #[test]
    fn substring_fallback_scans_columns_in_table_order() {
        let t = sample();
        let hit = classify_and_match(&t, "miami").unwrap();
        assert_eq!(hit.get("Player"), Some("Leo Messi"));
    }

    #[test]
    fn no_match_returns_none() {
        let t = sample();
        assert!(classify_and_match(&t, "zzz qqq xyzzy").is_none());
    }
}
