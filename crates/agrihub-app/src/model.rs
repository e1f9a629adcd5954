// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::CropId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Comparison,
    Chat,
    Soil,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Comparison, Self::Chat, Self::Soil];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::Chat => "chat",
            Self::Soil => "soil",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "comparison" => Some(Self::Comparison),
            "chat" => Some(Self::Chat),
            "soil" => Some(Self::Soil),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Input,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonFilter {
    #[default]
    All,
    Kharif,
    Rabi,
    YearRound,
}

impl SeasonFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::Kharif, Self::Rabi, Self::YearRound];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Kharif => "kharif",
            Self::Rabi => "rabi",
            Self::YearRound => "year-round",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.label().eq_ignore_ascii_case(value.trim()))
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|filter| *filter == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Season labels are free text ("Kharif/Rabi"), so matching is substring-based.
    pub fn matches(self, season: &str) -> bool {
        match self {
            Self::All => true,
            filter => season
                .to_ascii_lowercase()
                .contains(&filter.label().to_ascii_lowercase()),
        }
    }
}

/// A crop as served by `GET /api/crops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: String,
    pub cost_per_acre: i64,
    pub yield_per_acre: i64,
    pub price_per_kg: f64,
    pub growing_period: i32,
    #[serde(default)]
    pub water_requirement: String,
    #[serde(default)]
    pub labor_requirement: String,
    #[serde(default)]
    pub suitable_season: String,
    #[serde(default)]
    pub soil_type: String,
    #[serde(default)]
    pub fertilizer_requirement: String,
    #[serde(default)]
    pub pest_resistance: String,
    pub revenue: f64,
    pub profit: f64,
    pub roi: f64,
}
