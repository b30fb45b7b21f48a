use rand::Rng;

/// Placeholder grades for an application that arrives without transcript data.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGrades {
    pub average: f64,
    pub track: String,
}

/// Supplies grades when no real transcript has been read.
pub trait GradeSource: Send + Sync {
    fn synthesize(&self) -> SyntheticGrades;
}

const RANDOM_TRACKS: [&str; 2] = ["S2", "L2"];

/// Uniform average in `[10, 18)` and a coin-flip between a scientific and a
/// literary track.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomGradeSource;

impl GradeSource for RandomGradeSource {
    fn synthesize(&self) -> SyntheticGrades {
        let mut rng = rand::thread_rng();
        let average = rng.gen_range(10.0..18.0);
        let track = if rng.gen_bool(0.5) {
            RANDOM_TRACKS[0]
        } else {
            RANDOM_TRACKS[1]
        };
        SyntheticGrades {
            average,
            track: track.to_string(),
        }
    }
}

/// Always returns the same grades.
#[derive(Debug, Clone)]
pub struct FixedGradeSource {
    grades: SyntheticGrades,
}

impl FixedGradeSource {
    pub fn new(average: f64, track: impl Into<String>) -> Self {
        Self {
            grades: SyntheticGrades {
                average,
                track: track.into(),
            },
        }
    }
}

impl GradeSource for FixedGradeSource {
    fn synthesize(&self) -> SyntheticGrades {
        self.grades.clone()
    }
}
