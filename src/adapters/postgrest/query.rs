//! Structured filter composition for PostgREST table reads.
//!
//! A [`SelectQuery`] is an ordered list of clauses. Each clause is either a
//! single predicate that must hold (AND) or a group of predicates of which at
//! least one must hold (OR). The query compiles to PostgREST query parameters,
//! and can also be evaluated directly against a JSON row.

use crate::domain::codec::{format_iso8601, parse_iso8601};
use crate::domain::model::Row;
use crate::domain::ports::FlightFilters;
use chrono::{Days, NaiveDate, NaiveTime};
use serde_json::Value;
use std::cmp::Ordering;

pub const FLIGHTS_TABLE: &str = "flights";
pub const POSITIONS_TABLE: &str = "flight_positions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive pattern match, `*` is the wildcard.
    ILike,
    Eq,
    Gte,
    Lt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::ILike => "ilike",
            Operator::Eq => "eq",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

impl Predicate {
    fn new(column: &str, operator: Operator, value: String) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value,
        }
    }

    /// `column` contains `term` literally, ignoring case.
    pub fn contains(column: &str, term: &str) -> Self {
        Self::new(column, Operator::ILike, format!("*{}*", escape_like(term)))
    }

    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self::new(column, Operator::Eq, value.to_string())
    }

    pub fn gte(column: &str, value: impl ToString) -> Self {
        Self::new(column, Operator::Gte, value.to_string())
    }

    pub fn lt(column: &str, value: impl ToString) -> Self {
        Self::new(column, Operator::Lt, value.to_string())
    }

    /// Right-hand side of a top-level `column=op.value` parameter.
    fn encode(&self) -> String {
        format!("{}.{}", self.operator.as_str(), self.value)
    }

    /// Member of a logic tree. The value is always quoted so that `,().:`
    /// inside user input stay literal.
    fn encode_in_group(&self) -> String {
        format!(
            "{}.{}.{}",
            self.column,
            self.operator.as_str(),
            quote(&self.value)
        )
    }

    pub fn matches(&self, row: &Row) -> bool {
        let actual = match row.get(&self.column) {
            None | Some(Value::Null) => return false,
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        match self.operator {
            Operator::ILike => like_ignore_case(&actual, &self.value),
            Operator::Eq => compare(&actual, &self.value) == Some(Ordering::Equal),
            Operator::Gte => matches!(
                compare(&actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => compare(&actual, &self.value) == Some(Ordering::Less),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    And(Predicate),
    AnyOf(Vec<Predicate>),
}

impl Clause {
    fn encode_group(predicates: &[Predicate]) -> String {
        let members: Vec<String> = predicates.iter().map(Predicate::encode_in_group).collect();
        format!("({})", members.join(","))
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Clause::And(predicate) => predicate.matches(row),
            Clause::AnyOf(predicates) => predicates.iter().any(|p| p.matches(row)),
        }
    }
}

/// Rows `offset ..= offset + limit - 1` of the filtered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: u32,
    pub limit: u32,
}

impl RowRange {
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// Value for the `Range` request header, `None` for an empty range.
    pub fn header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let last = u64::from(self.offset) + u64::from(self.limit) - 1;
        Some(format!("{}-{}", self.offset, last))
    }

    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    table: String,
    clauses: Vec<Clause>,
    range: Option<RowRange>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            clauses: Vec::new(),
            range: None,
        }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.clauses.push(Clause::And(predicate));
        self
    }

    pub fn any_of(mut self, predicates: Vec<Predicate>) -> Self {
        match predicates.len() {
            0 => {}
            1 => self.clauses.extend(predicates.into_iter().map(Clause::And)),
            _ => self.clauses.push(Clause::AnyOf(predicates)),
        }
        self
    }

    pub fn range(mut self, offset: u32, limit: u32) -> Self {
        self.range = Some(RowRange { offset, limit });
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn row_range(&self) -> Option<RowRange> {
        self.range
    }

    /// Filter parameters, without `select`.
    ///
    /// A single OR group becomes `or=(..)`. Several groups are nested under one
    /// `and=(or(..),or(..))` so they AND together explicitly.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut groups = Vec::new();

        for clause in &self.clauses {
            match clause {
                Clause::And(predicate) => {
                    params.push((predicate.column.clone(), predicate.encode()));
                }
                Clause::AnyOf(predicates) => groups.push(Clause::encode_group(predicates)),
            }
        }

        match groups.len() {
            0 => {}
            1 => params.push(("or".to_string(), groups.remove(0))),
            _ => {
                let nested: Vec<String> = groups.iter().map(|g| format!("or{}", g)).collect();
                params.push(("and".to_string(), format!("({})", nested.join(","))));
            }
        }

        params
    }

    pub fn select_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filter_params());
        params
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.clauses.iter().all(|clause| clause.matches(row))
    }

    /// Evaluate the whole query, range included, over in-memory rows.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> Vec<&'a Row> {
        let matched: Vec<&Row> = rows.into_iter().filter(|row| self.matches(row)).collect();
        match self.range {
            Some(range) => range.slice(matched),
            None => matched,
        }
    }
}

/// Half-open UTC window `[day 00:00, next day 00:00)` as ISO-8601 strings.
pub fn day_window(date: NaiveDate) -> (String, String) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (format_iso8601(&start), format_iso8601(&end))
}

/// Compose the flight search for [`FlightFilters`].
pub fn flight_search(filters: &FlightFilters) -> SelectQuery {
    let mut query = SelectQuery::from(FLIGHTS_TABLE);

    if let Some(search) = non_blank(&filters.search) {
        query = query.any_of(vec![
            Predicate::contains("flight", search),
            Predicate::contains("fr24_id", search),
            Predicate::contains("callsign", search),
        ]);
    }

    if let Some(airport) = non_blank(&filters.airport) {
        let airport = airport.to_uppercase();
        query = query.any_of(vec![
            Predicate::contains("departure_icao", &airport),
            Predicate::contains("arrival_icao", &airport),
        ]);
    }

    if let Some(model) = non_blank(&filters.aircraft_model) {
        query = query.and(Predicate::contains("aircraft_model", model));
    }

    if let Some(date) = filters.flight_date {
        let (start, end) = day_window(date);
        query = query
            .and(Predicate::gte("departure_time_utc", start))
            .and(Predicate::lt("departure_time_utc", end));
    }

    query.range(filters.offset, filters.limit)
}

/// Unset and empty terms do not filter. Anything else is used as given.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Backslash-escape the characters `LIKE` treats specially.
///
/// PostgREST rewrites every `*` to `%` before the pattern reaches Postgres, so
/// a `*` in the term cannot be made literal and still acts as a wildcard.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnyRun,
    AnyChar,
    Literal(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '*' | '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyChar,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

fn like_match(text: &[char], tokens: &[LikeToken]) -> bool {
    match tokens.split_first() {
        None => text.is_empty(),
        Some((LikeToken::AnyRun, rest)) => (0..=text.len()).any(|i| like_match(&text[i..], rest)),
        Some((LikeToken::AnyChar, rest)) => !text.is_empty() && like_match(&text[1..], rest),
        Some((LikeToken::Literal(c), rest)) => {
            text.first() == Some(c) && like_match(&text[1..], rest)
        }
    }
}

/// `ILIKE` semantics: `*`/`%` match any run, `_` one character, `\` escapes.
fn like_ignore_case(actual: &str, pattern: &str) -> bool {
    let text: Vec<char> = actual.to_lowercase().chars().collect();
    like_match(&text, &like_tokens(&pattern.to_lowercase()))
}

/// Timestamps compare as instants, numbers numerically, anything else as text.
fn compare(actual: &str, expected: &str) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (parse_iso8601(actual), parse_iso8601(expected)) {
        return Some(a.cmp(&b));
    }
    if let (Ok(a), Ok(b)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
        return a.partial_cmp(&b);
    }
    Some(actual.cmp(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_unfiltered_search_is_a_plain_page() {
        let query = flight_search(&FlightFilters::default());
        assert!(query.clauses().is_empty());
        assert_eq!(query.select_params(), vec![("select".to_string(), "*".to_string())]);
        assert_eq!(query.row_range().unwrap().header_value().as_deref(), Some("0-99"));
    }

    #[test]
    fn test_search_compiles_to_single_or_group() {
        let filters = FlightFilters {
            search: Some("UAL".to_string()),
            ..Default::default()
        };
        let params = flight_search(&filters).filter_params();
        assert_eq!(
            param(&params, "or"),
            vec![r#"(flight.ilike."*UAL*",fr24_id.ilike."*UAL*",callsign.ilike."*UAL*")"#]
        );
    }

    #[test]
    fn test_two_or_groups_are_anded() {
        let filters = FlightFilters {
            search: Some("dal".to_string()),
            airport: Some("jfk".to_string()),
            aircraft_model: Some("A321".to_string()),
            ..Default::default()
        };
        let params = flight_search(&filters).filter_params();

        assert!(param(&params, "or").is_empty());
        assert_eq!(
            param(&params, "and"),
            vec![concat!(
                r#"(or(flight.ilike."*dal*",fr24_id.ilike."*dal*",callsign.ilike."*dal*"),"#,
                r#"or(departure_icao.ilike."*JFK*",arrival_icao.ilike."*JFK*"))"#
            )]
        );
        assert_eq!(param(&params, "aircraft_model"), vec!["ilike.*A321*"]);
    }

    #[test]
    fn test_user_input_cannot_break_out_of_group() {
        let filters = FlightFilters {
            search: Some(r#"x",fr24_id.neq."y"#.to_string()),
            ..Default::default()
        };
        let params = flight_search(&filters).filter_params();
        let group = param(&params, "or")[0];
        assert!(group.starts_with(r#"(flight.ilike."*x\",fr24\\_id.neq.\"y*""#));
    }

    #[test]
    fn test_flight_date_window() {
        let filters = FlightFilters {
            flight_date: NaiveDate::from_ymd_opt(2024, 2, 29),
            limit: 10,
            offset: 20,
            ..Default::default()
        };
        let query = flight_search(&filters);
        let params = query.filter_params();
        assert_eq!(
            param(&params, "departure_time_utc"),
            vec!["gte.2024-02-29T00:00:00Z", "lt.2024-03-01T00:00:00Z"]
        );
        assert_eq!(query.row_range().unwrap().header_value().as_deref(), Some("20-29"));
    }

    #[test]
    fn test_date_window_boundaries_in_memory() {
        let query = flight_search(&FlightFilters {
            flight_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        });

        let at_midnight = row(json!({"departure_time_utc": "2024-05-01T00:00:00+00:00"}));
        let late = row(json!({"departure_time_utc": "2024-05-01T23:59:59.999"}));
        let next_day = row(json!({"departure_time_utc": "2024-05-02T00:00:00Z"}));
        let before = row(json!({"departure_time_utc": "2024-04-30T23:59:59Z"}));
        let offset_same_instant = row(json!({"departure_time_utc": "2024-05-02T01:30:00+02:00"}));
        let unknown = row(json!({"departure_time_utc": null}));

        assert!(query.matches(&at_midnight));
        assert!(query.matches(&late));
        assert!(!query.matches(&next_day));
        assert!(!query.matches(&before));
        assert!(query.matches(&offset_same_instant));
        assert!(!query.matches(&unknown));
    }

    #[test]
    fn test_or_semantics_in_memory() {
        let query = flight_search(&FlightFilters {
            search: Some("UAL".to_string()),
            ..Default::default()
        });
        let by_callsign = row(json!({"flight": "UA1", "fr24_id": "3b2c", "callsign": "ual1"}));
        let none = row(json!({"flight": "DL5", "fr24_id": "3b2d", "callsign": "DAL5"}));
        assert!(query.matches(&by_callsign));
        assert!(!query.matches(&none));

        let query = flight_search(&FlightFilters {
            airport: Some("jfk".to_string()),
            ..Default::default()
        });
        assert!(query.matches(&row(json!({"departure_icao": "KSFO", "arrival_icao": "KJFK"}))));
        assert!(!query.matches(&row(json!({"departure_icao": "KSFO", "arrival_icao": null}))));
    }

    #[test]
    fn test_range_slicing() {
        let rows: Vec<Row> = (0..5).map(|i| row(json!({"flight_id": i}))).collect();
        let query = SelectQuery::from(FLIGHTS_TABLE).range(1, 3);
        let page: Vec<i64> = query
            .apply(&rows)
            .iter()
            .map(|r| r["flight_id"].as_i64().unwrap())
            .collect();
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(RowRange { offset: 0, limit: 0 }.header_value(), None);
    }

    #[test]
    fn test_eq_and_like_helpers() {
        let r = row(json!({"flight_id": 12, "aircraft_model": "Airbus A320neo"}));
        assert!(Predicate::eq("flight_id", 12).matches(&r));
        assert!(!Predicate::eq("flight_id", 13).matches(&r));
        assert!(Predicate::contains("aircraft_model", "a320").matches(&r));
        assert!(!Predicate::contains("aircraft_model", "b737").matches(&r));
        assert!(like_ignore_case("abc", "a*c"));
        assert!(!like_ignore_case("abc", "b*"));
        assert!(like_ignore_case("abc", "a_c"));
        assert!(!like_ignore_case("axc", "a\\_c"));
    }

    #[test]
    fn test_like_metacharacters_in_terms_are_literal() {
        let query = flight_search(&FlightFilters {
            search: Some("UA_1".to_string()),
            ..Default::default()
        });
        assert_eq!(
            param(&query.filter_params(), "or"),
            vec![r#"(flight.ilike."*UA\\_1*",fr24_id.ilike."*UA\\_1*",callsign.ilike."*UA\\_1*")"#]
        );

        let literal = row(json!({"flight": "UA_1", "fr24_id": "a", "callsign": null}));
        let lookalike = row(json!({"flight": "UAX1", "fr24_id": "b", "callsign": null}));
        assert!(query.matches(&literal));
        assert!(!query.matches(&lookalike));

        let percent = Predicate::contains("aircraft_model", "100%");
        assert_eq!(percent.value, r"*100\%*");
        assert!(percent.matches(&row(json!({"aircraft_model": "A320 100%"}))));
        assert!(!percent.matches(&row(json!({"aircraft_model": "A320 1000"}))));
    }

    #[test]
    fn test_filter_terms_are_used_as_given() {
        let query = flight_search(&FlightFilters {
            search: Some(" UA ".to_string()),
            airport: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(query.clauses().len(), 1);

        let spaced = row(json!({"flight": "X UA 1", "fr24_id": "a", "callsign": null}));
        let packed = row(json!({"flight": "XUA1", "fr24_id": "b", "callsign": null}));
        assert!(query.matches(&spaced));
        assert!(!query.matches(&packed));

        let whitespace_only = flight_search(&FlightFilters {
            aircraft_model: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(
            param(&whitespace_only.filter_params(), "aircraft_model"),
            vec!["ilike.*  *"]
        );
    }
}
