use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The four independently scored axes of provider behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionCategory {
    LegacyArcSupport,
    NewArcSupport,
    ServiceAvailability,
    RegistrationProcess,
}

impl CriterionCategory {
    pub const ALL: [CriterionCategory; 4] = [
        CriterionCategory::LegacyArcSupport,
        CriterionCategory::NewArcSupport,
        CriterionCategory::ServiceAvailability,
        CriterionCategory::RegistrationProcess,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CriterionCategory::LegacyArcSupport => "legacy_arc_support",
            CriterionCategory::NewArcSupport => "new_arc_support",
            CriterionCategory::ServiceAvailability => "service_availability",
            CriterionCategory::RegistrationProcess => "registration_process",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            CriterionCategory::LegacyArcSupport => "Legacy ARC Score",
            CriterionCategory::NewArcSupport => "New ARC Score",
            CriterionCategory::ServiceAvailability => "Service Score",
            CriterionCategory::RegistrationProcess => "Registration Score",
        }
    }

    /// Question shown to administrators when assessing a provider on this axis.
    pub const fn help_text(self) -> &'static str {
        match self {
            CriterionCategory::LegacyArcSupport => {
                "How well does this site support legacy ARC numbers?"
            }
            CriterionCategory::NewArcSupport => "How well does this site support new ARC numbers?",
            CriterionCategory::ServiceAvailability => {
                "Does this site offer the same services to citizens and ARC holders?"
            }
            CriterionCategory::RegistrationProcess => {
                "Does this site require extra registration steps for non-citizens?"
            }
        }
    }
}

impl fmt::Display for CriterionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every selectable criterion, grouped by the category it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKey {
    LegacyArcFullSupport,
    LegacyArcSeparateSupport,
    LegacyArcNoSupport,
    NewArcFullSupport,
    NewArcSeparateSupport,
    NewArcNoSupport,
    ServiceFull,
    ServicePartial,
    ServiceNone,
    RegistrationOnline,
    RegistrationOffline,
}

impl CriterionKey {
    pub const ALL: [CriterionKey; 11] = [
        CriterionKey::LegacyArcFullSupport,
        CriterionKey::LegacyArcSeparateSupport,
        CriterionKey::LegacyArcNoSupport,
        CriterionKey::NewArcFullSupport,
        CriterionKey::NewArcSeparateSupport,
        CriterionKey::NewArcNoSupport,
        CriterionKey::ServiceFull,
        CriterionKey::ServicePartial,
        CriterionKey::ServiceNone,
        CriterionKey::RegistrationOnline,
        CriterionKey::RegistrationOffline,
    ];

    /// Stable identifier used by the record store and the JSON surface.
    pub const fn as_str(self) -> &'static str {
        match self {
            CriterionKey::LegacyArcFullSupport => "legacy_arc_full_support",
            CriterionKey::LegacyArcSeparateSupport => "legacy_arc_separate_support",
            CriterionKey::LegacyArcNoSupport => "legacy_arc_no_support",
            CriterionKey::NewArcFullSupport => "new_arc_full_support",
            CriterionKey::NewArcSeparateSupport => "new_arc_separate_support",
            CriterionKey::NewArcNoSupport => "new_arc_no_support",
            CriterionKey::ServiceFull => "service_full",
            CriterionKey::ServicePartial => "service_partial",
            CriterionKey::ServiceNone => "service_none",
            CriterionKey::RegistrationOnline => "registration_online",
            CriterionKey::RegistrationOffline => "registration_offline",
        }
    }

    pub const fn category(self) -> CriterionCategory {
        match self {
            CriterionKey::LegacyArcFullSupport
            | CriterionKey::LegacyArcSeparateSupport
            | CriterionKey::LegacyArcNoSupport => CriterionCategory::LegacyArcSupport,
            CriterionKey::NewArcFullSupport
            | CriterionKey::NewArcSeparateSupport
            | CriterionKey::NewArcNoSupport => CriterionCategory::NewArcSupport,
            CriterionKey::ServiceFull | CriterionKey::ServicePartial | CriterionKey::ServiceNone => {
                CriterionCategory::ServiceAvailability
            }
            CriterionKey::RegistrationOnline | CriterionKey::RegistrationOffline => {
                CriterionCategory::RegistrationProcess
            }
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a single criterion and the points it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionDefinition {
    pub key: CriterionKey,
    pub short_description: &'static str,
    pub long_description: &'static str,
    pub points: i32,
}

impl CriterionDefinition {
    pub fn category(&self) -> CriterionCategory {
        self.key.category()
    }
}

/// Raised when a selection is not a member of its category's enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {category} criterion '{key}'")]
pub struct UnknownCriterionError {
    pub category: CriterionCategory,
    pub key: String,
}

/// Read-only lookup table of criterion definitions, built once per process.
#[derive(Debug)]
pub struct CriteriaCatalog {
    definitions: BTreeMap<CriterionKey, CriterionDefinition>,
}

impl CriteriaCatalog {
    pub fn standard() -> &'static CriteriaCatalog {
        static CATALOG: OnceLock<CriteriaCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::seed)
    }

    fn seed() -> Self {
        let definitions = [
            (
                CriterionKey::LegacyArcFullSupport,
                "Full legacy ARC support",
                "Fully accepts legacy ARC number in place of ROC ID",
                0,
            ),
            (
                CriterionKey::LegacyArcSeparateSupport,
                "Legacy ARC support in separate UI",
                "Accepts legacy ARC number in a separate UI (passport number, for instance)",
                -10,
            ),
            (
                CriterionKey::LegacyArcNoSupport,
                "No legacy ARC support",
                "Does not accept legacy ARC numbers",
                -25,
            ),
            (
                CriterionKey::NewArcFullSupport,
                "Full new ARC support",
                "Fully accepts new ARC number in place of ROC ID",
                0,
            ),
            (
                CriterionKey::NewArcSeparateSupport,
                "New ARC support in separate UI",
                "Accepts new ARC number in a separate UI (passport number, for instance)",
                -10,
            ),
            (
                CriterionKey::NewArcNoSupport,
                "No new ARC support",
                "Does not accept new ARC numbers",
                -25,
            ),
            (
                CriterionKey::ServiceFull,
                "Full service for all users",
                "Provides same service to all users",
                0,
            ),
            (
                CriterionKey::ServicePartial,
                "Some services not available to non-citizens",
                "A portion of features not available to non-citizens",
                -25,
            ),
            (
                CriterionKey::ServiceNone,
                "Denies service to non-citizens",
                "Denies all services to non-citizens",
                -50,
            ),
            (
                CriterionKey::RegistrationOnline,
                "All users may register online",
                "All users may register online using the same process",
                0,
            ),
            (
                CriterionKey::RegistrationOffline,
                "Non-citizens require offline registration",
                "Non-citizens require additional offline registration steps",
                -25,
            ),
        ]
        .into_iter()
        .map(|(key, short_description, long_description, points)| {
            (
                key,
                CriterionDefinition {
                    key,
                    short_description,
                    long_description,
                    points,
                },
            )
        })
        .collect();

        Self { definitions }
    }

    pub fn get(&self, key: CriterionKey) -> Option<&CriterionDefinition> {
        self.definitions.get(&key)
    }

    /// Look up a raw selection, requiring it to belong to `category`.
    pub fn resolve(
        &self,
        category: CriterionCategory,
        raw: &str,
    ) -> Result<&CriterionDefinition, UnknownCriterionError> {
        CriterionKey::parse(raw)
            .filter(|key| key.category() == category)
            .and_then(|key| self.get(key))
            .ok_or_else(|| UnknownCriterionError {
                category,
                key: raw.to_string(),
            })
    }

    pub fn for_category(
        &self,
        category: CriterionCategory,
    ) -> impl Iterator<Item = &CriterionDefinition> + '_ {
        self.definitions
            .values()
            .filter(move |definition| definition.category() == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CriterionDefinition> + '_ {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_key() {
        let catalog = CriteriaCatalog::standard();
        assert_eq!(catalog.len(), CriterionKey::ALL.len());
        for key in CriterionKey::ALL {
            let definition = catalog.get(key).expect("seeded definition");
            assert_eq!(definition.key, key);
            assert!(definition.points <= 0, "{key} should be a penalty or neutral");
        }
    }

    #[test]
    fn standard_catalog_is_built_once() {
        let first = CriteriaCatalog::standard() as *const CriteriaCatalog;
        let second = CriteriaCatalog::standard() as *const CriteriaCatalog;
        assert_eq!(first, second);
    }

    #[test]
    fn each_category_has_a_zero_penalty_option() {
        let catalog = CriteriaCatalog::standard();
        for category in CriterionCategory::ALL {
            assert!(catalog
                .for_category(category)
                .any(|definition| definition.points == 0));
        }
    }

    #[test]
    fn seeded_points_per_category() {
        let catalog = CriteriaCatalog::standard();
        let points = |category| {
            catalog
                .for_category(category)
                .map(|definition| definition.points)
                .collect::<Vec<_>>()
        };

        assert_eq!(points(CriterionCategory::LegacyArcSupport), vec![0, -10, -25]);
        assert_eq!(points(CriterionCategory::NewArcSupport), vec![0, -10, -25]);
        assert_eq!(points(CriterionCategory::ServiceAvailability), vec![0, -25, -50]);
        assert_eq!(points(CriterionCategory::RegistrationProcess), vec![0, -25]);
    }

    #[test]
    fn keys_use_snake_case_wire_names() {
        for key in CriterionKey::ALL {
            let json = serde_json::to_string(&key).expect("serializes");
            assert_eq!(json, format!("\"{}\"", key.as_str()));
            assert_eq!(CriterionKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn resolve_rejects_keys_from_other_categories() {
        let catalog = CriteriaCatalog::standard();
        let err = catalog
            .resolve(CriterionCategory::LegacyArcSupport, "new_arc_full_support")
            .expect_err("cross-category key is rejected");
        assert_eq!(err.category, CriterionCategory::LegacyArcSupport);
        assert_eq!(err.key, "new_arc_full_support");
        assert_eq!(
            err.to_string(),
            "unknown legacy_arc_support criterion 'new_arc_full_support'"
        );
    }

    #[test]
    fn resolve_rejects_unknown_keys() {
        let catalog = CriteriaCatalog::standard();
        assert!(catalog
            .resolve(CriterionCategory::ServiceAvailability, "service_sometimes")
            .is_err());
        assert!(catalog
            .resolve(CriterionCategory::ServiceAvailability, "")
            .is_err());
    }

    #[test]
    fn resolve_tolerates_surrounding_whitespace() {
        let catalog = CriteriaCatalog::standard();
        let definition = catalog
            .resolve(CriterionCategory::RegistrationProcess, " registration_offline ")
            .expect("trimmed key resolves");
        assert_eq!(definition.points, -25);
    }
}
