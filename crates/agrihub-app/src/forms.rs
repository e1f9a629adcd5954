// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilField {
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
    Ec,
    Moisture,
    OrganicMatter,
}

impl SoilField {
    pub const ALL: [Self; 7] = [
        Self::Nitrogen,
        Self::Phosphorus,
        Self::Potassium,
        Self::Ph,
        Self::Ec,
        Self::Moisture,
        Self::OrganicMatter,
    ];

    /// Multipart field name expected by `POST /predict`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nitrogen => "nitrogen",
            Self::Phosphorus => "phosphorus",
            Self::Potassium => "potassium",
            Self::Ph => "ph",
            Self::Ec => "ec",
            Self::Moisture => "moisture",
            Self::OrganicMatter => "organic_matter",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nitrogen => "Nitrogen (N)",
            Self::Phosphorus => "Phosphorus (P)",
            Self::Potassium => "Potassium (K)",
            Self::Ph => "pH",
            Self::Ec => "EC (dS/m)",
            Self::Moisture => "Moisture (%)",
            Self::OrganicMatter => "Organic Matter (%)",
        }
    }

    fn bounds(self) -> (f64, Option<f64>) {
        match self {
            Self::Ph => (0.0, Some(14.0)),
            Self::Moisture => (0.0, Some(100.0)),
            _ => (0.0, None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoilReading {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub ec: f64,
    pub moisture: f64,
    pub organic_matter: f64,
}

impl SoilReading {
    pub fn get(&self, field: SoilField) -> f64 {
        match field {
            SoilField::Nitrogen => self.nitrogen,
            SoilField::Phosphorus => self.phosphorus,
            SoilField::Potassium => self.potassium,
            SoilField::Ph => self.ph,
            SoilField::Ec => self.ec,
            SoilField::Moisture => self.moisture,
            SoilField::OrganicMatter => self.organic_matter,
        }
    }

    fn set(&mut self, field: SoilField, value: f64) {
        let slot = match field {
            SoilField::Nitrogen => &mut self.nitrogen,
            SoilField::Phosphorus => &mut self.phosphorus,
            SoilField::Potassium => &mut self.potassium,
            SoilField::Ph => &mut self.ph,
            SoilField::Ec => &mut self.ec,
            SoilField::Moisture => &mut self.moisture,
            SoilField::OrganicMatter => &mut self.organic_matter,
        };
        *slot = value;
    }

    pub fn validate(&self) -> Result<()> {
        for field in SoilField::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                bail!("{} must be a number", field.label());
            }
            let (min, max) = field.bounds();
            if value < min {
                bail!("{} cannot be negative", field.label());
            }
            if let Some(max) = max
                && value > max
            {
                bail!("{} must be between {min} and {max}", field.label());
            }
        }
        Ok(())
    }

    /// Field name/value pairs in form order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        SoilField::ALL
            .into_iter()
            .map(|field| (field.name(), self.get(field).to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleProfile {
    High,
    Medium,
    Low,
}

impl SampleProfile {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.label().eq_ignore_ascii_case(value.trim()))
    }

    pub const fn reading(self) -> SoilReading {
        match self {
            Self::High => SoilReading {
                nitrogen: 80.0,
                phosphorus: 75.0,
                potassium: 85.0,
                ph: 6.5,
                ec: 1.2,
                moisture: 60.0,
                organic_matter: 7.5,
            },
            Self::Medium => SoilReading {
                nitrogen: 45.0,
                phosphorus: 40.0,
                potassium: 50.0,
                ph: 7.0,
                ec: 2.0,
                moisture: 45.0,
                organic_matter: 4.0,
            },
            Self::Low => SoilReading {
                nitrogen: 15.0,
                phosphorus: 10.0,
                potassium: 20.0,
                ph: 5.0,
                ec: 3.5,
                moisture: 30.0,
                organic_matter: 1.5,
            },
        }
    }
}

/// Editable text for each soil field, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoilForm {
    values: [String; 7],
    focus: usize,
}

impl SoilForm {
    pub fn value(&self, field: SoilField) -> &str {
        &self.values[Self::slot(field)]
    }

    pub fn set_value(&mut self, field: SoilField, value: impl Into<String>) {
        self.values[Self::slot(field)] = value.into();
    }

    pub fn focused(&self) -> SoilField {
        SoilField::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % SoilField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + SoilField::ALL.len() - 1) % SoilField::ALL.len();
    }

    pub fn push_char(&mut self, ch: char) {
        if ch.is_ascii_digit() || matches!(ch, '.' | '-') {
            self.values[self.focus].push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        self.values[self.focus].pop();
    }

    pub fn fill(&mut self, profile: SampleProfile) {
        let reading = profile.reading();
        for field in SoilField::ALL {
            self.set_value(field, reading.get(field).to_string());
        }
    }

    /// Parse and validate the form. Blank fields are rejected.
    pub fn reading(&self) -> Result<SoilReading> {
        let mut reading = SoilReading::default();
        for field in SoilField::ALL {
            let raw = self.value(field).trim();
            if raw.is_empty() {
                bail!("{} is required -- enter a value or load a sample profile", field.label());
            }
            let value: f64 = raw
                .parse()
                .with_context(|| format!("{} must be a number, got {raw:?}", field.label()))?;
            reading.set(field, value);
        }
        reading.validate()?;
        Ok(reading)
    }

    fn slot(field: SoilField) -> usize {
        SoilField::ALL
            .iter()
            .position(|candidate| *candidate == field)
            .unwrap_or(0)
    }
}
