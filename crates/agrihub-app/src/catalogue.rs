// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Reference data for running without a server: the crop catalogue the
//! comparison dashboard serves and fixed soil results for the sample
//! profiles.

use crate::{Crop, CropId, SampleProfile, SoilAssessment, SoilReading};

impl Crop {
    /// Fill in revenue, profit and ROI from cost, yield and price.
    #[must_use]
    pub fn with_economics(mut self) -> Self {
        self.revenue = self.yield_per_acre as f64 * self.price_per_kg;
        self.profit = self.revenue - self.cost_per_acre as f64;
        self.roi = if self.cost_per_acre == 0 {
            0.0
        } else {
            self.profit / self.cost_per_acre as f64 * 100.0
        };
        self
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    id: i64,
    name: &str,
    cost_per_acre: i64,
    yield_per_acre: i64,
    price_per_kg: f64,
    growing_period: i32,
    levels: [&str; 4],
    suitable_season: &str,
    soil_type: &str,
) -> Crop {
    let [water, labor, fertilizer, pest] = levels;
    Crop {
        id: CropId::new(id),
        name: name.to_owned(),
        cost_per_acre,
        yield_per_acre,
        price_per_kg,
        growing_period,
        water_requirement: water.to_owned(),
        labor_requirement: labor.to_owned(),
        suitable_season: suitable_season.to_owned(),
        soil_type: soil_type.to_owned(),
        fertilizer_requirement: fertilizer.to_owned(),
        pest_resistance: pest.to_owned(),
        revenue: 0.0,
        profit: 0.0,
        roi: 0.0,
    }
    .with_economics()
}

/// The reference crop catalogue. Levels are water, labor, fertilizer and
/// pest resistance.
#[rustfmt::skip]
pub fn reference_crops() -> Vec<Crop> {
    vec![
        entry(1, "Rice", 25_000, 2_000, 20.0, 120, ["High", "Medium", "High", "Medium"], "Kharif", "Clay"),
        entry(2, "Wheat", 20_000, 1_800, 25.0, 150, ["Medium", "Low", "Medium", "Medium"], "Rabi", "Loamy"),
        entry(3, "Cotton", 35_000, 800, 60.0, 180, ["Medium", "High", "High", "Low"], "Kharif", "Black"),
        entry(4, "Sugarcane", 40_000, 40_000, 3.0, 360, ["High", "High", "High", "Medium"], "Year-round", "Loamy"),
        entry(5, "Maize", 18_000, 2_500, 15.0, 100, ["Medium", "Medium", "Medium", "Medium"], "Kharif/Rabi", "Sandy Loam"),
        entry(6, "Soybean", 22_000, 1_500, 35.0, 110, ["Medium", "Low", "Low", "High"], "Kharif", "Loamy"),
        entry(7, "Potato", 45_000, 20_000, 10.0, 90, ["Medium", "High", "High", "Low"], "Rabi", "Sandy Loam"),
        entry(8, "Tomato", 50_000, 25_000, 15.0, 120, ["High", "High", "High", "Low"], "Year-round", "Loamy"),
        entry(9, "Groundnut", 28_000, 1_200, 45.0, 130, ["Low", "Medium", "Medium", "Medium"], "Kharif", "Sandy Loam"),
        entry(10, "Mustard", 15_000, 1_000, 40.0, 120, ["Low", "Low", "Low", "Medium"], "Rabi", "Loamy"),
    ]
}

pub const DEMO_SOIL_MESSAGE: &str =
    "demo mode only assesses the sample profiles; press h, m or l to load one";

impl SampleProfile {
    /// The profile whose reading is exactly `reading`, if any.
    pub fn matching(reading: &SoilReading) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.reading() == *reading)
    }

    /// Recorded result for this profile, shown when no server is available.
    pub fn demo_assessment(self) -> SoilAssessment {
        let (fertility_level, quality_score, crops): (&str, f64, &[&str]) = match self {
            Self::High => (
                "High",
                95.7,
                &[
                    "Wheat", "Corn", "Soybeans", "Cotton", "Tomatoes", "Potatoes", "Carrots",
                    "Lettuce", "Spinach",
                ],
            ),
            Self::Medium => (
                "Medium",
                61.8,
                &["Wheat", "Cotton", "Tomatoes", "Carrots", "Lettuce"],
            ),
            Self::Low => ("Low", 27.9, &[]),
        };
        SoilAssessment {
            fertility_level: fertility_level.to_owned(),
            quality_score,
            suitable_crops: crops.iter().map(|crop| (*crop).to_owned()).collect(),
        }
    }
}
