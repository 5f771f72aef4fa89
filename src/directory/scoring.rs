use std::fmt;

use serde::{Deserialize, Serialize};

use super::criteria::{CriteriaCatalog, CriterionCategory, CriterionKey, UnknownCriterionError};

/// Score of a provider with no shortfall on any axis.
pub const BASE_SCORE: i32 = 100;

/// The four raw criterion selections recorded for a provider.
///
/// Selections stay as the keys supplied by the record store or admin form; they are only
/// trusted once the engine has resolved them against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriterionSelections {
    pub legacy_arc: String,
    pub new_arc: String,
    pub service: String,
    pub registration: String,
}

impl CriterionSelections {
    pub fn new(
        legacy_arc: impl Into<String>,
        new_arc: impl Into<String>,
        service: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        Self {
            legacy_arc: legacy_arc.into(),
            new_arc: new_arc.into(),
            service: service.into(),
            registration: registration.into(),
        }
    }

    pub fn from_keys(
        legacy_arc: CriterionKey,
        new_arc: CriterionKey,
        service: CriterionKey,
        registration: CriterionKey,
    ) -> Self {
        Self::new(
            legacy_arc.as_str(),
            new_arc.as_str(),
            service.as_str(),
            registration.as_str(),
        )
    }

    /// Every axis at its zero-penalty value.
    pub fn full_support() -> Self {
        Self::from_keys(
            CriterionKey::LegacyArcFullSupport,
            CriterionKey::NewArcFullSupport,
            CriterionKey::ServiceFull,
            CriterionKey::RegistrationOnline,
        )
    }

    pub fn entries(&self) -> [(CriterionCategory, &str); 4] {
        [
            (CriterionCategory::LegacyArcSupport, self.legacy_arc.as_str()),
            (CriterionCategory::NewArcSupport, self.new_arc.as_str()),
            (CriterionCategory::ServiceAvailability, self.service.as_str()),
            (CriterionCategory::RegistrationProcess, self.registration.as_str()),
        ]
    }
}

/// Letter grade derived from a score, ordered `Unscored < F < E < ... < A+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "-")]
    Unscored,
    F,
    E,
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn from_score(score: Option<i32>) -> Self {
        let Some(score) = score else {
            return Grade::Unscored;
        };

        match score {
            s if s >= 100 => Grade::APlus,
            s if s >= 90 => Grade::A,
            s if s >= 80 => Grade::B,
            s if s >= 70 => Grade::C,
            s if s >= 60 => Grade::D,
            s if s >= 50 => Grade::E,
            _ => Grade::F,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::Unscored => "-",
            Grade::F => "F",
            Grade::E => "E",
            Grade::D => "D",
            Grade::C => "C",
            Grade::B => "B",
            Grade::A => "A",
            Grade::APlus => "A+",
        }
    }

    pub const fn is_scored(self) -> bool {
        !matches!(self, Grade::Unscored)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete contribution of one selection, kept for read-only audit views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub category: CriterionCategory,
    pub key: CriterionKey,
    pub description: &'static str,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: i32,
    pub components: Vec<ScoreComponent>,
    pub total: i32,
}

impl ScoreBreakdown {
    pub fn grade(&self) -> Grade {
        Grade::from_score(Some(self.total))
    }
}

/// Stateless engine mapping criterion selections to a score.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    catalog: &'static CriteriaCatalog,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(CriteriaCatalog::standard())
    }
}

impl ScoringEngine {
    pub fn new(catalog: &'static CriteriaCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static CriteriaCatalog {
        self.catalog
    }

    /// `100` plus the points of each selection. Fails on the first key that is not a
    /// member of its category; scores are not clamped and may be negative.
    pub fn compute_score(
        &self,
        legacy_arc: &str,
        new_arc: &str,
        service: &str,
        registration: &str,
    ) -> Result<i32, UnknownCriterionError> {
        let mut score = BASE_SCORE;
        for (category, key) in [
            (CriterionCategory::LegacyArcSupport, legacy_arc),
            (CriterionCategory::NewArcSupport, new_arc),
            (CriterionCategory::ServiceAvailability, service),
            (CriterionCategory::RegistrationProcess, registration),
        ] {
            score += self.catalog.resolve(category, key)?.points;
        }
        Ok(score)
    }

    pub fn score(&self, selections: &CriterionSelections) -> Result<i32, UnknownCriterionError> {
        self.compute_score(
            &selections.legacy_arc,
            &selections.new_arc,
            &selections.service,
            &selections.registration,
        )
    }

    pub fn compute_grade(score: Option<i32>) -> Grade {
        Grade::from_score(score)
    }

    pub fn breakdown(
        &self,
        selections: &CriterionSelections,
    ) -> Result<ScoreBreakdown, UnknownCriterionError> {
        let components = selections
            .entries()
            .into_iter()
            .map(|(category, key)| {
                self.catalog
                    .resolve(category, key)
                    .map(|definition| ScoreComponent {
                        category,
                        key: definition.key,
                        description: definition.short_description,
                        points: definition.points,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = BASE_SCORE + components.iter().map(|c| c.points).sum::<i32>();
        Ok(ScoreBreakdown {
            base_score: BASE_SCORE,
            components,
            total,
        })
    }
}
