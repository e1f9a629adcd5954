// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

pub const NO_SUITABLE_CROPS_MESSAGE: &str = "No suitable crops found for this soil profile";
pub const ASSESSMENT_UNAVAILABLE_MESSAGE: &str = "An error occurred while processing your request.";

/// Result of a soil health prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilAssessment {
    pub fertility_level: String,
    pub quality_score: f64,
    #[serde(default)]
    pub suitable_crops: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    High,
    Medium,
    Low,
}

impl QualityBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::High => "quality-high",
            Self::Medium => "quality-medium",
            Self::Low => "quality-low",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoilResultView {
    pub fertility_text: String,
    pub fertility_class: String,
    pub score_text: String,
    pub bar_percent: u16,
    pub band: QualityBand,
    pub crops: Vec<String>,
}

impl SoilResultView {
    pub fn from_assessment(assessment: &SoilAssessment) -> Self {
        let score = assessment.quality_score;
        let crops = if assessment.suitable_crops.is_empty() {
            vec![NO_SUITABLE_CROPS_MESSAGE.to_owned()]
        } else {
            assessment.suitable_crops.clone()
        };
        Self {
            fertility_text: assessment.fertility_level.clone(),
            fertility_class: format!("fertility-{}", assessment.fertility_level.to_lowercase()),
            score_text: format!("{}/100", format_score(score)),
            bar_percent: if score.is_finite() {
                score.clamp(0.0, 100.0).round() as u16
            } else {
                0
            },
            band: QualityBand::for_score(score),
            crops,
        }
    }

    pub fn has_crops(&self) -> bool {
        self.crops.first().map(String::as_str) != Some(NO_SUITABLE_CROPS_MESSAGE)
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Processing,
}

impl SubmitState {
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::Idle => "Assess Soil Health",
            Self::Processing => "Processing...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentFailure {
    /// The server answered `success: false`.
    Rejected(String),
    Unavailable,
}

impl AssessmentFailure {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(error) => format!("Error: {error}"),
            Self::Unavailable => ASSESSMENT_UNAVAILABLE_MESSAGE.to_owned(),
        }
    }
}

pub type AssessmentReply = std::result::Result<SoilAssessment, AssessmentFailure>;
