// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::{
    AffixSet, Crop, CropId, SeasonFilter, SortDirection, SortKey, SortState, SortableRow,
    apply_order, sort_order,
};

/// How long rows that moved during a sort stay highlighted.
pub const SORT_HIGHLIGHT_DURATION: Duration = Duration::from_secs(1);

pub const RUPEE: &str = "₹";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropColumn {
    Name,
    Cost,
    Yield,
    Price,
    Revenue,
    Profit,
    Roi,
    Period,
    Season,
}

impl CropColumn {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Cost,
        Self::Yield,
        Self::Price,
        Self::Revenue,
        Self::Profit,
        Self::Roi,
        Self::Period,
        Self::Season,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|column| *column == self)
            .unwrap_or(0)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "crop",
            Self::Cost => "cost/acre",
            Self::Yield => "yield/acre",
            Self::Price => "price/kg",
            Self::Revenue => "revenue",
            Self::Profit => "profit",
            Self::Roi => "roi",
            Self::Period => "period",
            Self::Season => "season",
        }
    }

    /// Identifier used by sort controls (`data-sort` in the web dashboard).
    pub const fn sort_id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Cost => "cost",
            Self::Yield => "yield",
            Self::Price => "price",
            Self::Revenue => "revenue",
            Self::Profit => "profit",
            Self::Roi => "roi",
            Self::Period => "period",
            Self::Season => "season",
        }
    }

    pub fn parse_sort_id(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.sort_id() == value.trim())
    }

    pub fn affixes(self) -> AffixSet {
        match self {
            Self::Name | Self::Season => AffixSet::none(),
            Self::Cost | Self::Price | Self::Revenue | Self::Profit => AffixSet::currency(RUPEE),
            Self::Yield => AffixSet::unit("kg"),
            Self::Roi => AffixSet::percent(),
            Self::Period => AffixSet::unit("days"),
        }
    }

    pub fn display(self, crop: &Crop) -> String {
        match self {
            Self::Name => crop.name.clone(),
            Self::Cost => format_rupees(crop.cost_per_acre as f64),
            Self::Yield => format!("{} kg", format_grouped(crop.yield_per_acre)),
            Self::Price => format_rupees(crop.price_per_kg),
            Self::Revenue => format_rupees(crop.revenue),
            Self::Profit => format_rupees(crop.profit),
            Self::Roi => format_percent(crop.roi),
            Self::Period => format!("{} days", crop.growing_period),
            Self::Season => crop.suitable_season.clone(),
        }
    }

    /// Key from the structured value at its displayed precision, so two
    /// cells that render alike tie here too and sorting never re-parses text.
    pub fn key(self, crop: &Crop) -> SortKey {
        match self {
            Self::Name => SortKey::Text(crop.name.trim().to_owned()),
            Self::Season => SortKey::Text(crop.suitable_season.trim().to_owned()),
            Self::Cost => SortKey::Number(crop.cost_per_acre as f64),
            Self::Yield => SortKey::Number(crop.yield_per_acre as f64),
            Self::Price => scaled_key(to_paise(crop.price_per_kg), 100.0),
            Self::Revenue => scaled_key(to_paise(crop.revenue), 100.0),
            Self::Profit => scaled_key(to_paise(crop.profit), 100.0),
            Self::Roi => scaled_key(to_tenths(crop.roi), 10.0),
            Self::Period => SortKey::Number(f64::from(crop.growing_period)),
        }
    }
}

fn scaled_key(units: Option<i64>, scale: f64) -> SortKey {
    match units {
        Some(units) => SortKey::Number(units as f64 / scale),
        None => SortKey::Text(String::new()),
    }
}

/// Whole paise, or `None` for values that render as an empty cell.
fn to_paise(value: f64) -> Option<i64> {
    value.is_finite().then(|| (value * 100.0).round() as i64)
}

fn to_tenths(value: f64) -> Option<i64> {
    value.is_finite().then(|| (value * 10.0).round() as i64)
}

impl SortableRow for Crop {
    fn cell_text(&self, column: usize) -> Option<Cow<'_, str>> {
        CropColumn::from_index(column).map(|column| Cow::Owned(column.display(self)))
    }

    fn sort_key(&self, column: usize, _affixes: &AffixSet) -> SortKey {
        match CropColumn::from_index(column) {
            Some(column) => column.key(self),
            None => SortKey::Text(String::new()),
        }
    }
}

/// Group digits the Indian way: the last three, then pairs (`3,25,000`).
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2 + 1);
    if value < 0 {
        out.push('-');
    }

    if digits.len() <= 3 {
        out.push_str(&digits);
        return out;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let lead = head.len() % 2;
    if lead == 1 {
        out.push_str(&head[..1]);
    }
    for (index, pair) in head.as_bytes()[lead..].chunks(2).enumerate() {
        if index > 0 || lead == 1 {
            out.push(',');
        }
        out.extend(pair.iter().map(|byte| char::from(*byte)));
    }
    out.push(',');
    out.push_str(tail);
    out
}

pub fn format_rupees(value: f64) -> String {
    let Some(paise) = to_paise(value) else {
        return String::new();
    };
    let sign = if paise < 0 { "-" } else { "" };
    let magnitude = paise.unsigned_abs();
    let whole = format_grouped((magnitude / 100) as i64);
    match magnitude % 100 {
        0 => format!("{sign}{RUPEE}{whole}"),
        fraction => format!("{sign}{RUPEE}{whole}.{fraction:02}"),
    }
}

/// One decimal place; non-finite values render as an empty cell.
pub fn format_percent(value: f64) -> String {
    let Some(tenths) = to_tenths(value) else {
        return String::new();
    };
    let sign = if tenths < 0 { "-" } else { "" };
    let magnitude = tenths.unsigned_abs();
    format!("{sign}{}.{}%", magnitude / 10, magnitude % 10)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortHighlight {
    pub token: u64,
    pub rows: BTreeSet<CropId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub column: CropColumn,
    pub direction: SortDirection,
    pub moved: BTreeSet<CropId>,
    pub highlight_token: u64,
}

impl SortOutcome {
    pub fn status(&self) -> String {
        format!("sort {} {}", self.column.label(), self.direction.as_str())
    }
}

/// The crop comparison dashboard: rows, their sort state, season filter,
/// row selection and the set of crops checked for charting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonTable {
    crops: Vec<Crop>,
    sort: SortState,
    filter: SeasonFilter,
    checked: Vec<CropId>,
    selected: usize,
    highlight: Option<SortHighlight>,
    highlight_token: u64,
}

impl ComparisonTable {
    pub fn new(crops: Vec<Crop>) -> Self {
        Self {
            crops,
            ..Self::default()
        }
    }

    /// Replace the rows, keeping sort, filter and checks that still apply.
    pub fn replace_crops(&mut self, crops: Vec<Crop>) {
        self.crops = crops;
        if let Some(active) = self.sort.active()
            && let Some(column) = CropColumn::from_index(active.column)
        {
            let reorder = sort_order(&self.crops, active.column, active.direction, &column.affixes());
            apply_order(&mut self.crops, &reorder);
        }
        let known: BTreeSet<CropId> = self.crops.iter().map(|crop| crop.id).collect();
        self.checked.retain(|id| known.contains(id));
        self.highlight = None;
        self.clamp_selection();
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn filter(&self) -> SeasonFilter {
        self.filter
    }

    pub fn visible_rows(&self) -> Vec<&Crop> {
        self.crops
            .iter()
            .filter(|crop| self.filter.matches(&crop.suitable_season))
            .collect()
    }

    /// Activate the sort control of `column`: flip its direction, reorder
    /// every row (filtered-out rows included) and highlight rows that moved.
    pub fn activate_sort(&mut self, column: CropColumn) -> SortOutcome {
        let selected_id = self.selected_crop().map(|crop| crop.id);

        self.sort = std::mem::take(&mut self.sort).activate(column.index());
        let direction = self
            .sort
            .direction_for(column.index())
            .unwrap_or(SortDirection::Asc);

        let reorder = sort_order(&self.crops, column.index(), direction, &column.affixes());
        let moved: BTreeSet<CropId> = reorder
            .moved_positions()
            .filter_map(|position| reorder.order().get(position))
            .filter_map(|old| self.crops.get(*old))
            .map(|crop| crop.id)
            .collect();
        apply_order(&mut self.crops, &reorder);

        self.highlight_token = self.highlight_token.wrapping_add(1);
        self.highlight = (!moved.is_empty()).then(|| SortHighlight {
            token: self.highlight_token,
            rows: moved.clone(),
        });

        if let Some(id) = selected_id {
            self.select_crop(id);
        }

        tracing::debug!(
            column = column.sort_id(),
            direction = direction.as_str(),
            moved = moved.len(),
            "sorted comparison table"
        );

        SortOutcome {
            column,
            direction,
            moved,
            highlight_token: self.highlight_token,
        }
    }

    pub fn highlight(&self) -> Option<&SortHighlight> {
        self.highlight.as_ref()
    }

    pub fn is_highlighted(&self, id: CropId) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|highlight| highlight.rows.contains(&id))
    }

    /// Clear the highlight if `token` still names the latest sort.
    pub fn clear_highlight(&mut self, token: u64) -> bool {
        if self
            .highlight
            .as_ref()
            .is_some_and(|highlight| highlight.token == token)
        {
            self.highlight = None;
            return true;
        }
        false
    }

    pub fn set_filter(&mut self, filter: SeasonFilter) {
        self.filter = filter;
        self.clamp_selection();
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_crop(&self) -> Option<&Crop> {
        self.visible_rows().get(self.selected).copied()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn select_crop(&mut self, id: CropId) {
        if let Some(position) = self.visible_rows().iter().position(|crop| crop.id == id) {
            self.selected = position;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn is_checked(&self, id: CropId) -> bool {
        self.checked.contains(&id)
    }

    pub fn toggle_checked(&mut self, id: CropId) -> bool {
        if let Some(position) = self.checked.iter().position(|checked| *checked == id) {
            self.checked.remove(position);
            return false;
        }
        if self.crops.iter().any(|crop| crop.id == id) {
            self.checked.push(id);
            return true;
        }
        false
    }

    pub fn check_all(&mut self) {
        self.checked = self.crops.iter().map(|crop| crop.id).collect();
    }

    pub fn clear_checked(&mut self) {
        self.checked.clear();
    }

    /// Checked crops in the order they were checked.
    pub fn checked_crops(&self) -> Vec<&Crop> {
        self.checked
            .iter()
            .filter_map(|id| self.crops.iter().find(|crop| crop.id == *id))
            .collect()
    }
}

/// Label/value pairs for the crop detail panel.
pub fn crop_details(crop: &Crop) -> Vec<(&'static str, String)> {
    vec![
        ("cost per acre", CropColumn::Cost.display(crop)),
        ("yield per acre", CropColumn::Yield.display(crop)),
        ("price per kg", CropColumn::Price.display(crop)),
        ("revenue", CropColumn::Revenue.display(crop)),
        ("profit", CropColumn::Profit.display(crop)),
        ("roi", CropColumn::Roi.display(crop)),
        ("growing period", CropColumn::Period.display(crop)),
        ("season", CropColumn::Season.display(crop)),
    ]
}
