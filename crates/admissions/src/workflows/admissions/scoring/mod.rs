//! Admission-priority heuristic.
//!
//! The score is a sum of four capped components (academic 70, track 15,
//! experience 10, speed 5) mapped onto a four-colour tier used to order
//! review queues.

mod recommendation;
mod rules;

pub use recommendation::recommend_stream;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_SCORE: u8 = 100;

/// Inputs to a score computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest<'a> {
    pub average: f64,
    pub track: &'a str,
    pub submitted_on: NaiveDate,
    pub graduate_program: bool,
    pub experience_years: f64,
}

impl<'a> ScoreRequest<'a> {
    pub fn new(average: f64, track: &'a str, submitted_on: NaiveDate) -> Self {
        Self {
            average,
            track,
            submitted_on,
            graduate_program: false,
            experience_years: 0.0,
        }
    }

    pub fn graduate(mut self, experience_years: f64) -> Self {
        self.graduate_program = true;
        self.experience_years = experience_years;
        self
    }
}

/// Per-component contribution to a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub academic: u8,
    #[serde(rename = "serie")]
    pub track: u8,
    pub experience: u8,
    pub speed: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        let sum = u16::from(self.academic)
            + u16::from(self.track)
            + u16::from(self.experience)
            + u16::from(self.speed);
        sum.min(u16::from(MAX_SCORE)) as u8
    }

    /// Each component held to its own ceiling.
    pub fn capped(self) -> Self {
        Self {
            academic: self.academic.min(rules::ACADEMIC_MAX),
            track: self.track.min(rules::TRACK_MAX),
            experience: self.experience.min(rules::EXPERIENCE_MAX),
            speed: self.speed.min(rules::SPEED_BONUS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ScoreColor {
    pub fn for_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreColor::Green,
            60..=79 => ScoreColor::Yellow,
            40..=59 => ScoreColor::Orange,
            _ => ScoreColor::Red,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreColor::Green => "Excellent",
            ScoreColor::Yellow => "Bon",
            ScoreColor::Orange => "Moyen",
            ScoreColor::Red => "Faible",
        }
    }
}

/// Score record stored on an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictiveScore {
    pub score: u8,
    pub label: String,
    pub color: ScoreColor,
    pub breakdown: ScoreBreakdown,
}

impl PredictiveScore {
    pub fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        let score = breakdown.total();
        let color = ScoreColor::for_score(score);
        Self {
            score,
            label: color.label().to_string(),
            color,
            breakdown,
        }
    }

    /// Rebuild a caller-supplied score so the total, colour and label agree
    /// with a capped breakdown.
    pub fn normalized(self) -> Self {
        Self::from_breakdown(self.breakdown.capped())
    }
}

pub fn compute_score(request: &ScoreRequest<'_>) -> PredictiveScore {
    let experience = if request.graduate_program {
        rules::experience_component(request.experience_years)
    } else {
        0
    };

    let (speed, days_since_opening) = rules::speed_component(request.submitted_on);
    debug!(
        days_since_opening,
        submitted_on = %request.submitted_on,
        "speed bonus awarded"
    );

    PredictiveScore::from_breakdown(ScoreBreakdown {
        academic: rules::academic_component(request.average),
        track: rules::track_component(request.track),
        experience,
        speed,
    })
}
