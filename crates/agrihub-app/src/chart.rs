// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::{Crop, format_rupees};

pub const NO_SELECTION_MESSAGE: &str = "Please select at least one crop to compare.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Rupees,
    Percent,
    Kilograms,
}

impl ValueFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            Self::Rupees => format_rupees(value),
            Self::Percent => format!("{value:.1}%"),
            Self::Kilograms => format!("{value:.0} kg/acre"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarDataset {
    pub title: String,
    pub series_label: &'static str,
    pub format: ValueFormat,
    pub bars: Vec<(String, f64)>,
}

impl BarDataset {
    /// Largest magnitude in the dataset; bars scale against it.
    pub fn max_magnitude(&self) -> f64 {
        self.bars
            .iter()
            .map(|(_, value)| value.abs())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonCharts {
    pub profit: BarDataset,
    pub roi: BarDataset,
}

/// Profit and ROI datasets for the checked crops, in the order given.
pub fn comparison_charts(crops: &[&Crop]) -> Result<ComparisonCharts> {
    if crops.is_empty() {
        bail!(NO_SELECTION_MESSAGE);
    }

    let profit = BarDataset {
        title: "Profit per Acre (₹)".to_owned(),
        series_label: "Profit per Acre",
        format: ValueFormat::Rupees,
        bars: crops
            .iter()
            .map(|crop| (crop.name.clone(), crop.profit))
            .collect(),
    };
    let roi = BarDataset {
        title: "Return on Investment (%)".to_owned(),
        series_label: "ROI (%)",
        format: ValueFormat::Percent,
        bars: crops
            .iter()
            .map(|crop| (crop.name.clone(), crop.roi))
            .collect(),
    };
    Ok(ComparisonCharts { profit, roi })
}

/// Yield prediction handed to the dashboard by the prediction page.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PredictionPayload {
    #[serde(default)]
    pub base_yield: Option<f64>,
    #[serde(default)]
    pub yield_per_acre: Option<f64>,
    #[serde(default)]
    pub crop_name: Option<String>,
}

impl PredictionPayload {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|error| {
            anyhow::anyhow!("prediction payload is not valid JSON: {error} -- pass an object like {{\"base_yield\":2000,\"yield_per_acre\":2400,\"crop_name\":\"Rice\"}}")
        })
    }

    pub fn yield_comparison(&self) -> Result<BarDataset> {
        let base = nonzero(self.base_yield);
        let predicted = nonzero(self.yield_per_acre);
        let (Some(base), Some(predicted)) = (base, predicted) else {
            bail!("prediction payload needs non-zero base_yield and yield_per_acre");
        };
        let crop_name = self.crop_name.as_deref().unwrap_or_default();
        Ok(BarDataset {
            title: format!("{crop_name} Yield Comparison"),
            series_label: "Yield (kg/acre)",
            format: ValueFormat::Kilograms,
            bars: vec![
                ("Base Yield".to_owned(), base),
                ("Predicted Yield".to_owned(), predicted),
            ],
        })
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value != 0.0)
}

/// Pick the prediction to chart: an in-memory payload wins over the
/// serialized one. Invalid input is logged and produces no chart.
pub fn resolve_prediction(
    in_memory: Option<&PredictionPayload>,
    serialized: Option<&str>,
) -> Option<BarDataset> {
    let payload = match (in_memory, serialized) {
        (Some(payload), _) => payload.clone(),
        (None, Some(raw)) => match PredictionPayload::parse(raw) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(error = %error, "ignoring malformed prediction payload");
                return None;
            }
        },
        (None, None) => {
            tracing::debug!("no prediction data found");
            return None;
        }
    };

    match payload.yield_comparison() {
        Ok(dataset) => Some(dataset),
        Err(error) => {
            tracing::warn!(error = %error, ?payload, "invalid prediction data format");
            None
        }
    }
}
