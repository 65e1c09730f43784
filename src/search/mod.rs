pub mod matcher;

pub use matcher::{classify_and_match, find_match};

use crate::data::Table;

/// English keywords mapped to table columns, in priority order.
/// Earlier entries win when a query mentions several.
const COLUMN_KEYWORDS: &[(&str, &str)] = &[
    ("goals", "Gls"),
    ("goal", "Gls"),
    ("scorer", "Gls"),
    ("assists", "Ast"),
    ("assist", "Ast"),
    ("minutes", "MP"),
    ("minute", "MP"),
    ("mp", "MP"),
    ("age", "Age"),
    ("position", "Pos"),
    ("pos", "Pos"),
    ("team", "Squad"),
    ("club", "Squad"),
    ("squad", "Squad"),
    ("nation", "Nation"),
    ("country", "Nation"),
    ("value", "Value"),
];

/// Position synonyms mapped to the codes used in the Pos column.
const POSITION_SYNONYMS: &[(&str, &str)] = &[
    ("goalkeeper", "GK"),
    ("keeper", "GK"),
    ("gk", "GK"),
    ("defender", "DF"),
    ("df", "DF"),
    ("midfielder", "MF"),
    ("mf", "MF"),
    ("forward", "FW"),
    ("fw", "FW"),
    ("striker", "FW"),
    ("st", "FW"),
    ("attacker", "FW"),
];

/// Comparison operator parsed out of a query phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl CompareOp {
    pub fn matches(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
            Self::Ge => lhs >= rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => (lhs - rhs).abs() < f64::EPSILON,
        }
    }
}

/// Column ranked by a superlative query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperlativeTarget {
    Goals,
    Assists,
    /// Ranks the Value column when present, otherwise a composite
    /// goal-involvement score.
    MarketValue,
}

/// Classified search intent. Variants are tried in declaration order;
/// classification is a strict cascade and never backtracks.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchIntent {
    /// Query looked like a name: exact or fuzzy key-column match.
    NameMatch { query: String },
    /// "top scorer", "most assists", "highest value" style ranking.
    Superlative(SuperlativeTarget),
    /// Keyword bound to a column, optionally with a numeric comparison.
    /// `comparison: None` means substring match on that column.
    AttributeComparison {
        column: String,
        keyword: String,
        comparison: Option<(CompareOp, i64)>,
    },
    /// Position synonym such as "goalkeeper".
    PositionSynonym { code: String },
    /// Case-insensitive substring search across all columns.
    Substring { query: String },
}

/// Trim, lowercase, and collapse internal whitespace.
pub fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized string similarity in [0, 1]; 1.0 iff equal after
/// normalization. Symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize(a), &normalize(b))
}

/// Minimum similarity for a fuzzy match to count.
pub const FUZZY_THRESHOLD: f64 = 0.70;

/// All integers appearing in the text, in order.
pub fn extract_integers(text: &str) -> Vec<i64> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            if let Ok(n) = current.parse() {
                numbers.push(n);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(n) = current.parse() {
            numbers.push(n);
        }
    }
    numbers
}

/// Parse a comparison phrase out of a normalized query.
///
/// Compound operators are recognised before their single-character
/// prefixes so ">= 10" does not read as "> 10". A bare number with no
/// operator phrase defaults to equality.
pub fn parse_comparison(text: &str) -> Option<(CompareOp, i64)> {
    let first = |op: CompareOp| extract_integers(text).first().map(|&n| (op, n));

    if text.contains("at least") || text.contains(">=") {
        if let Some(found) = first(CompareOp::Ge) {
            return Some(found);
        }
    }
    if text.contains("at most") || text.contains("<=") {
        if let Some(found) = first(CompareOp::Le) {
            return Some(found);
        }
    }
    if text.contains("more than")
        || text.contains("over")
        || text.contains("greater than")
        || text.contains('>')
    {
        if let Some(found) = first(CompareOp::Gt) {
            return Some(found);
        }
    }
    if text.contains("less than") || text.contains("under") || text.contains('<') {
        if let Some(found) = first(CompareOp::Lt) {
            return Some(found);
        }
    }
    first(CompareOp::Eq)
}

/// Classify a free-text query against the loaded table.
///
/// Rules are applied in strict priority order; the first rule that fires
/// wins and later rules never override it:
///
/// 1. exact or fuzzy key-column match,
/// 2. superlative ranking phrases,
/// 3. column keyword with an optional numeric comparison,
/// 4. position synonyms,
/// 5. generic substring search.
pub fn classify(raw_query: &str, table: &Table) -> SearchIntent {
    let query = normalize(raw_query);

    // 1) name match, exact first, then fuzzy above the threshold
    for key in table.key_values() {
        if normalize(key) == query {
            return SearchIntent::NameMatch {
                query: query.clone(),
            };
        }
    }
    let best = table
        .key_values()
        .map(|key| similarity(&query, key))
        .fold(0.0_f64, f64::max);
    if best >= FUZZY_THRESHOLD {
        return SearchIntent::NameMatch {
            query: query.clone(),
        };
    }

    // 2) ranked requests and superlatives
    if (query.contains("top scorer")
        || query.contains("most goals")
        || query.contains("highest goals"))
        && table.has_column("Gls")
    {
        return SearchIntent::Superlative(SuperlativeTarget::Goals);
    }
    if (query.contains("most assists") || query.contains("top assist")) && table.has_column("Ast")
    {
        return SearchIntent::Superlative(SuperlativeTarget::Assists);
    }
    if (query.contains("highest value")
        || query.contains("most valuable")
        || query.contains("highest market value"))
        && (table.has_column("Value") || table.has_column("Gls") || table.has_column("Ast"))
    {
        return SearchIntent::Superlative(SuperlativeTarget::MarketValue);
    }

    // 3) column keyword, optionally with a numeric comparison. Keywords
    // must match a whole word: "goalkeeper" mentions neither "goal" nor
    // "keeper" as far as this rule is concerned, leaving synonym queries
    // to rule 4.
    let words: Vec<&str> = query.split_whitespace().collect();
    for (keyword, column) in COLUMN_KEYWORDS {
        if words.iter().any(|w| w == keyword) && table.has_column(column) {
            return SearchIntent::AttributeComparison {
                column: (*column).to_string(),
                keyword: (*keyword).to_string(),
                comparison: parse_comparison(&query),
            };
        }
    }

    // 4) position synonyms
    if table.has_column("Pos") {
        for (synonym, code) in POSITION_SYNONYMS {
            if query.contains(synonym) {
                return SearchIntent::PositionSynonym {
                    code: (*code).to_string(),
                };
            }
        }
    }

    // 5) generic substring search
    SearchIntent::Substring { query }
}
