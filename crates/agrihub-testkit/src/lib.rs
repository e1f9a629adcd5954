// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agrihub_app::{Crop, CropColumn, CropId};
use anyhow::{Context, Result};
use std::path::PathBuf;

const CROP_NAMES: [&str; 16] = [
    "Rice",
    "Wheat",
    "Cotton",
    "Sugarcane",
    "Maize",
    "Soybean",
    "Potato",
    "Tomato",
    "Groundnut",
    "Mustard",
    "Bajra",
    "Jowar",
    "Chickpea",
    "Onion",
    "Turmeric",
    "Barley",
];

const SEASONS: [&str; 5] = ["Kharif", "Rabi", "Kharif/Rabi", "Year-round", "Zaid"];
const LEVELS: [&str; 3] = ["Low", "Medium", "High"];
const SOIL_TYPES: [&str; 5] = ["Clay", "Loamy", "Black", "Sandy Loam", "Alluvial"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible crops for table and sort tests.
#[derive(Debug, Clone)]
pub struct CropFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl CropFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn crop(&mut self) -> Crop {
        let id = self.next_id;
        self.next_id += 1;

        let name = self.pick(&CROP_NAMES).to_owned();
        let crop = Crop {
            id: CropId::new(id),
            name,
            cost_per_acre: self.int_range(10, 60) * 1_000,
            yield_per_acre: self.int_range(5, 400) * 100,
            price_per_kg: self.int_range(3, 80) as f64,
            growing_period: self.int_range(60, 365) as i32,
            water_requirement: self.pick(&LEVELS).to_owned(),
            labor_requirement: self.pick(&LEVELS).to_owned(),
            suitable_season: self.pick(&SEASONS).to_owned(),
            soil_type: self.pick(&SOIL_TYPES).to_owned(),
            fertilizer_requirement: self.pick(&LEVELS).to_owned(),
            pest_resistance: self.pick(&LEVELS).to_owned(),
            revenue: 0.0,
            profit: 0.0,
            roi: 0.0,
        };
        crop.with_economics()
    }

    pub fn crops(&mut self, count: usize) -> Vec<Crop> {
        (0..count).map(|_| self.crop()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Render crops as the text rows the dashboard displays.
pub fn decorated_rows(crops: &[Crop]) -> Vec<Vec<String>> {
    crops
        .iter()
        .map(|crop| {
            CropColumn::ALL
                .iter()
                .map(|column| column.display(crop))
                .collect()
        })
        .collect()
}

pub fn crops_json(crops: &[Crop]) -> Result<String> {
    serde_json::to_string(crops).context("encode crops")
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn crop_names() -> &'static [&'static str] {
    &CROP_NAMES
}
