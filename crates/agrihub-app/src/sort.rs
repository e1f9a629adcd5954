// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Numeric-aware row sorting.
//!
//! Cells are turned into [`SortKey`]s once per sort call. A cell whose text
//! parses as a number after its column's decoration is stripped becomes a
//! numeric key; anything else (including an empty or missing cell) becomes a
//! text key. Keys form a total order, so a malformed cell can never make the
//! sort panic or abort: empty cells come first, then numbers, then text in
//! collation order.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::SortDirection;

/// Decoration to remove from a cell before numeric parsing.
///
/// Different columns carry different decorations (`₹1,200`, `45.5%`,
/// `30 days`), so each column owns its own set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffixSet {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    separators: Vec<char>,
}

impl AffixSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn currency(symbol: &str) -> Self {
        Self::default().with_prefix(symbol).with_separator(',')
    }

    pub fn percent() -> Self {
        Self::default().with_suffix("%")
    }

    pub fn unit(unit: &str) -> Self {
        Self::default().with_suffix(unit).with_separator(',')
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.prefixes.push(prefix.to_owned());
        }
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        let suffix = suffix.trim();
        if !suffix.is_empty() {
            self.suffixes.push(suffix.to_owned());
        }
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separators.push(separator);
        self
    }

    /// Strip sign-preserving decoration: `-₹5,000` becomes `-5000`.
    pub fn strip<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let mut body = raw.trim();
        let negative = match body.strip_prefix('-') {
            Some(rest) => {
                body = rest.trim_start();
                true
            }
            None => false,
        };

        for prefix in &self.prefixes {
            if let Some(rest) = body.strip_prefix(prefix.as_str()) {
                body = rest.trim_start();
            }
        }
        for suffix in &self.suffixes {
            if let Some(rest) = strip_suffix_ignore_ascii_case(body, suffix) {
                body = rest.trim_end();
            }
        }

        let needs_copy = negative || body.contains(|ch| self.separators.contains(&ch));
        if !needs_copy {
            return Cow::Borrowed(body);
        }

        let mut out = String::with_capacity(body.len() + 1);
        if negative {
            out.push('-');
        }
        out.extend(body.chars().filter(|ch| !self.separators.contains(ch)));
        Cow::Owned(out)
    }

    /// Parse a cell as a finite number, or `None` when it is not numeric.
    /// Empty cells are never coerced to zero.
    pub fn parse_number(&self, raw: &str) -> Option<f64> {
        let stripped = self.strip(raw);
        let candidate = stripped.trim();
        if candidate.is_empty() || candidate == "-" {
            return None;
        }
        candidate
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

fn strip_suffix_ignore_ascii_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Locale-style collation: letters compare case-insensitively first, and on
/// a tie lowercase sorts before uppercase.
pub fn collate(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
        .then_with(|| {
            left.chars()
                .map(|ch| (!ch.is_lowercase(), ch))
                .cmp(right.chars().map(|ch| (!ch.is_lowercase(), ch)))
        })
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// A missing cell is the lowest-priority text key, the empty string.
    pub fn from_cell(raw: Option<&str>, affixes: &AffixSet) -> Self {
        let Some(raw) = raw else {
            return Self::Text(String::new());
        };
        match affixes.parse_number(raw) {
            Some(value) => Self::Number(value),
            None => Self::Text(raw.trim().to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Text(text) if text.is_empty() => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    /// Empty cells sort lowest, as the empty string does lexically.
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Text(left), Self::Text(right)) => collate(left, right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A row the comparator can read. Only the display text is required;
/// rows backed by structured records can hand out typed keys directly.
pub trait SortableRow {
    fn cell_text(&self, column: usize) -> Option<Cow<'_, str>>;

    fn sort_key(&self, column: usize, affixes: &AffixSet) -> SortKey {
        SortKey::from_cell(self.cell_text(column).as_deref(), affixes)
    }
}

impl<S: AsRef<str>> SortableRow for Vec<S> {
    fn cell_text(&self, column: usize) -> Option<Cow<'_, str>> {
        self.get(column).map(|cell| Cow::Borrowed(cell.as_ref()))
    }
}

/// The permutation produced by a sort: `order[new_position] == old_position`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reorder {
    order: Vec<usize>,
}

impl Reorder {
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_identity(&self) -> bool {
        self.order
            .iter()
            .enumerate()
            .all(|(position, old)| position == *old)
    }

    /// New positions whose row came from somewhere else.
    pub fn moved_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.order
            .iter()
            .enumerate()
            .filter(|(position, old)| position != *old)
            .map(|(position, _)| position)
    }
}

/// Compute the sorted order of `rows` without touching them.
pub fn sort_order<R: SortableRow>(
    rows: &[R],
    column: usize,
    direction: SortDirection,
    affixes: &AffixSet,
) -> Reorder {
    let keys: Vec<SortKey> = rows
        .iter()
        .map(|row| row.sort_key(column, affixes))
        .collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|left, right| {
        let ordering = keys[*left].cmp_key(&keys[*right]);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    Reorder { order }
}

/// Re-insert rows in the order given. Rows are moved, never cloned, so the
/// result is always a permutation of the input.
pub fn apply_order<R>(rows: &mut Vec<R>, reorder: &Reorder) {
    if reorder.order.len() != rows.len() || reorder.is_identity() {
        return;
    }
    let mut slots: Vec<Option<R>> = rows.drain(..).map(Some).collect();
    rows.extend(
        reorder
            .order
            .iter()
            .filter_map(|old| slots.get_mut(*old).and_then(Option::take)),
    );
}

/// Sort rows in place by one column and report how they moved.
pub fn sort_rows<R: SortableRow>(
    rows: &mut Vec<R>,
    column: usize,
    direction: SortDirection,
    affixes: &AffixSet,
) -> Reorder {
    let reorder = sort_order(rows, column, direction, affixes);
    apply_order(rows, &reorder);
    reorder
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSort {
    pub column: usize,
    pub direction: SortDirection,
}

/// Per-table sort state. Each sortable column remembers its own direction;
/// activating a column flips it, starting from ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<ActiveSort>,
    toggles: BTreeMap<usize, SortDirection>,
}

impl SortState {
    #[must_use]
    pub fn activate(mut self, column: usize) -> Self {
        let direction = match self.toggles.get(&column) {
            Some(previous) => previous.reversed(),
            None => SortDirection::Asc,
        };
        self.toggles.insert(column, direction);
        self.active = Some(ActiveSort { column, direction });
        self
    }

    pub fn active(&self) -> Option<ActiveSort> {
        self.active
    }

    pub fn direction_for(&self, column: usize) -> Option<SortDirection> {
        self.toggles.get(&column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AffixSet, SortKey, SortState, SortableRow, apply_order, collate, sort_order, sort_rows,
    };
    use crate::SortDirection;
    use std::cmp::Ordering;

    fn rows(values: &[&str]) -> Vec<Vec<String>> {
        values.iter().map(|value| vec![(*value).to_owned()]).collect()
    }

    fn column(rows: &[Vec<String>]) -> Vec<String> {
        rows.iter().map(|row| row[0].clone()).collect()
    }

    #[test]
    fn currency_column_sorts_descending_by_value() {
        let mut table = rows(&["₹5,000", "₹12,300", "₹800"]);
        sort_rows(&mut table, 0, SortDirection::Desc, &AffixSet::currency("₹"));
        assert_eq!(column(&table), vec!["₹12,300", "₹5,000", "₹800"]);
    }

    #[test]
    fn decorated_values_sort_like_stripped_numbers() {
        let cases = [
            (AffixSet::currency("₹"), vec!["₹1,200", "₹950", "₹12,00,000", "-₹40"]),
            (AffixSet::percent(), vec!["45.5%", "-3%", "100%", "7.25%"]),
            (AffixSet::unit("days"), vec!["30 days", "120 days", "9 days"]),
            (AffixSet::unit("kg"), vec!["2,000 kg", "800 kg", "40,000 kg"]),
        ];

        for (affixes, values) in cases {
            let mut decorated = rows(&values);
            sort_rows(&mut decorated, 0, SortDirection::Asc, &affixes);

            let mut stripped: Vec<f64> = values
                .iter()
                .map(|value| affixes.parse_number(value).expect("numeric cell"))
                .collect();
            stripped.sort_by(f64::total_cmp);

            let parsed: Vec<f64> = column(&decorated)
                .iter()
                .map(|value| affixes.parse_number(value).expect("numeric cell"))
                .collect();
            assert_eq!(parsed, stripped);
        }
    }

    #[test]
    fn descending_is_exact_reverse_of_ascending_for_distinct_keys() {
        let values = ["Wheat", "rice", "Maize", "cotton", "Soybean"];
        let affixes = AffixSet::none();

        let mut ascending = rows(&values);
        sort_rows(&mut ascending, 0, SortDirection::Asc, &affixes);
        let mut descending = ascending.clone();
        sort_rows(&mut descending, 0, SortDirection::Desc, &affixes);

        let mut reversed = column(&ascending);
        reversed.reverse();
        assert_eq!(column(&descending), reversed);
        assert_eq!(
            column(&ascending),
            vec!["cotton", "Maize", "rice", "Soybean", "Wheat"]
        );
    }

    #[test]
    fn empty_and_single_row_tables_are_no_ops() {
        let mut empty: Vec<Vec<String>> = Vec::new();
        let reorder = sort_rows(&mut empty, 3, SortDirection::Desc, &AffixSet::none());
        assert!(empty.is_empty());
        assert!(reorder.is_identity());

        let mut single = rows(&["₹10"]);
        let reorder = sort_rows(&mut single, 0, SortDirection::Asc, &AffixSet::currency("₹"));
        assert_eq!(column(&single), vec!["₹10"]);
        assert_eq!(reorder.moved_positions().count(), 0);
    }

    #[test]
    fn non_numeric_and_empty_cells_fall_back_to_text_order() {
        let mut table = rows(&["₹300", "n/a", "", "₹20", "₹1,000"]);
        sort_rows(&mut table, 0, SortDirection::Asc, &AffixSet::currency("₹"));
        assert_eq!(column(&table), vec!["", "₹20", "₹300", "₹1,000", "n/a"]);

        sort_rows(&mut table, 0, SortDirection::Desc, &AffixSet::currency("₹"));
        assert_eq!(column(&table), vec!["n/a", "₹1,000", "₹300", "₹20", ""]);
    }

    #[test]
    fn empty_key_is_lowest() {
        let empty = SortKey::Text(String::new());
        assert!(empty.is_empty());
        assert_eq!(empty.cmp_key(&SortKey::Number(-1e9)), Ordering::Less);
        assert_eq!(empty.cmp_key(&SortKey::Text("a".to_owned())), Ordering::Less);
        assert_eq!(SortKey::Number(1e9).cmp_key(&empty), Ordering::Greater);
        assert_eq!(empty.cmp_key(&SortKey::Text(String::new())), Ordering::Equal);
        assert_eq!(
            SortKey::Number(5.0).cmp_key(&SortKey::Text("n/a".to_owned())),
            Ordering::Less
        );
    }

    #[test]
    fn missing_cells_do_not_abort_the_sort() {
        let mut table = vec![
            vec!["Rice".to_owned(), "120 days".to_owned()],
            vec!["Broken".to_owned()],
            vec!["Potato".to_owned(), "90 days".to_owned()],
        ];
        sort_rows(&mut table, 1, SortDirection::Asc, &AffixSet::unit("days"));
        let names: Vec<&str> = table.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(names, vec!["Broken", "Potato", "Rice"]);
    }

    #[test]
    fn empty_cell_is_not_zero() {
        let affixes = AffixSet::currency("₹");
        assert_eq!(affixes.parse_number(""), None);
        assert_eq!(affixes.parse_number("₹"), None);
        assert_eq!(affixes.parse_number("-"), None);
        assert_eq!(
            SortKey::from_cell(Some("   "), &affixes),
            SortKey::Text(String::new())
        );
    }

    #[test]
    fn affix_stripping_handles_sign_and_case() {
        assert_eq!(AffixSet::currency("₹").parse_number("-₹5,000"), Some(-5_000.0));
        assert_eq!(AffixSet::unit("kg").parse_number("1,500 KG"), Some(1_500.0));
        assert_eq!(AffixSet::percent().parse_number(" 45.5 % "), Some(45.5));
        assert_eq!(AffixSet::none().parse_number("inf"), None);
        assert_eq!(AffixSet::none().parse_number("₹5"), None);
    }

    #[test]
    fn ties_keep_their_current_order() {
        let mut table = vec![
            vec!["Rice".to_owned(), "Kharif".to_owned()],
            vec!["Wheat".to_owned(), "Rabi".to_owned()],
            vec!["Cotton".to_owned(), "Kharif".to_owned()],
        ];
        sort_rows(&mut table, 1, SortDirection::Asc, &AffixSet::none());
        let names: Vec<&str> = table.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(names, vec!["Rice", "Cotton", "Wheat"]);
    }

    #[test]
    fn sorting_is_a_permutation() {
        let values = ["b", "₹3", "", "a", "₹3", "Z"];
        let mut table = rows(&values);
        sort_rows(&mut table, 0, SortDirection::Desc, &AffixSet::currency("₹"));

        let mut before: Vec<String> = values.iter().map(|value| (*value).to_owned()).collect();
        let mut after = column(&table);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn reorder_reports_moved_positions() {
        let table = rows(&["3", "1", "2", "4"]);
        let reorder = sort_order(&table, 0, SortDirection::Asc, &AffixSet::none());
        assert_eq!(reorder.order(), &[1, 2, 0, 3]);
        assert_eq!(reorder.moved_positions().collect::<Vec<_>>(), vec![0, 1, 2]);

        let mut applied = table.clone();
        apply_order(&mut applied, &reorder);
        assert_eq!(column(&applied), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn collation_is_case_aware() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("apple", "Apple"), Ordering::Less);
        assert_eq!(collate("Apple", "apple"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn sort_state_flips_per_column() {
        let state = SortState::default().activate(2);
        assert_eq!(state.direction_for(2), Some(SortDirection::Asc));

        let state = state.activate(2);
        assert_eq!(state.direction_for(2), Some(SortDirection::Desc));

        let state = state.activate(5);
        let active = state.active().expect("active sort");
        assert_eq!(active.column, 5);
        assert_eq!(active.direction, SortDirection::Asc);
        assert_eq!(state.direction_for(2), Some(SortDirection::Desc));

        let state = state.activate(2);
        assert_eq!(state.direction_for(2), Some(SortDirection::Asc));
    }

    #[test]
    fn structured_rows_can_override_key_extraction() {
        struct Scored(f64);

        impl SortableRow for Scored {
            fn cell_text(&self, _column: usize) -> Option<std::borrow::Cow<'_, str>> {
                Some(format!("{:.0} pts", self.0).into())
            }

            fn sort_key(&self, _column: usize, _affixes: &AffixSet) -> SortKey {
                SortKey::Number(self.0)
            }
        }

        let mut scored = vec![Scored(2.5), Scored(-1.0), Scored(2.4)];
        sort_rows(&mut scored, 0, SortDirection::Asc, &AffixSet::none());
        let values: Vec<f64> = scored.iter().map(|row| row.0).collect();
        assert_eq!(values, vec![-1.0, 2.4, 2.5]);
    }
}
