use serde::Serialize;

use super::catalog::schools;
use super::domain::{Application, ApplicationStatus, Level};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolCount {
    pub school: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelCount {
    pub level: Level,
    pub count: usize,
}

/// Derived counts backing the staff dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionStats {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
    pub by_school: Vec<SchoolCount>,
    pub by_level: Vec<LevelCount>,
    /// Percentage of decided files that were approved, rounded.
    pub validation_rate: u8,
}

impl AdmissionStats {
    pub fn from_records(records: &[Application]) -> Self {
        let by_status: Vec<StatusCount> = ApplicationStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: records.iter().filter(|r| r.status == status).count(),
            })
            .collect();

        let by_school = schools()
            .iter()
            .map(|school| SchoolCount {
                school: school.name,
                count: records
                    .iter()
                    .filter(|r| r.program.school == school.name)
                    .count(),
            })
            .collect();

        let by_level = Level::ALL
            .into_iter()
            .map(|level| LevelCount {
                level,
                count: records.iter().filter(|r| r.program.level == level).count(),
            })
            .collect();

        let count_of = |wanted: ApplicationStatus| {
            by_status
                .iter()
                .find(|entry| entry.status == wanted)
                .map_or(0, |entry| entry.count)
        };
        let approved = count_of(ApplicationStatus::Approved)
            + count_of(ApplicationStatus::PendingIt)
            + count_of(ApplicationStatus::Completed);
        let rejected = count_of(ApplicationStatus::Rejected);
        let validation_rate = if approved + rejected == 0 {
            0
        } else {
            ((approved as f64 / (approved + rejected) as f64) * 100.0).round() as u8
        };

        Self {
            total: records.len(),
            by_status,
            by_school,
            by_level,
            validation_rate,
        }
    }

    pub fn count(&self, status: ApplicationStatus) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }
}
