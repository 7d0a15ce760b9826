//! Vaccine catalogue: reference data the schedule generator expands.
//!
//! Each [`VaccineDefinition`] describes one vaccine series: how many doses it
//! takes, how many days after birth the first dose is due, and the spacing
//! between consecutive doses. Definitions are seeded once (from the built-in
//! paediatric schedule or by an administrative edit) and are read-only at
//! runtime.

use crate::error::{SureShotError, SureShotResult};
use crate::store::ScheduleStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sureshot_types::NonEmptyText;

/// One entry of the vaccine catalogue.
///
/// `name` is the catalogue key and must be unique. `age_offset_days` is the
/// recommended age (days after birth) for dose 1; `dose_interval_days` is the
/// spacing between consecutive doses of the same series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineDefinition {
    pub name: NonEmptyText,
    pub disease_prevented: String,
    pub age_offset_days: u32,
    pub total_doses: u32,
    pub dose_interval_days: u32,
    pub mandatory: bool,
    pub description: String,
}

impl VaccineDefinition {
    /// Checks the structural invariants of a definition.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::InvalidInput` if `total_doses` is zero.
    pub fn validate(&self) -> SureShotResult<()> {
        if self.total_doses == 0 {
            return Err(SureShotError::InvalidInput(format!(
                "vaccine '{}' must have at least one dose",
                self.name
            )));
        }
        Ok(())
    }
}

/// Read/seed operations over the persisted catalogue.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<ScheduleStore>,
}

impl CatalogService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Lists all catalogue definitions.
    pub fn list(&self) -> SureShotResult<Vec<VaccineDefinition>> {
        self.store.list_vaccines()
    }

    /// Looks up a definition by its unique name.
    pub fn get(&self, name: &str) -> SureShotResult<Option<VaccineDefinition>> {
        Ok(self
            .store
            .list_vaccines()?
            .into_iter()
            .find(|def| def.name.as_str() == name))
    }

    /// Seeds the built-in paediatric schedule into the catalogue.
    ///
    /// Seeding is idempotent and keyed by name: definitions whose name is
    /// already present are skipped, so re-running at every startup is safe.
    ///
    /// # Returns
    ///
    /// The number of newly created definitions.
    pub fn seed_builtin(&self) -> SureShotResult<usize> {
        let created = self.store.add_missing_vaccines(&builtin_definitions())?;
        if created > 0 {
            tracing::info!(created, "seeded vaccine catalogue");
        } else {
            tracing::debug!("vaccine catalogue already seeded");
        }
        Ok(created)
    }
}

fn def(
    name: &str,
    disease: &str,
    age_offset_days: u32,
    total_doses: u32,
    dose_interval_days: u32,
    mandatory: bool,
    description: &str,
) -> VaccineDefinition {
    VaccineDefinition {
        name: NonEmptyText::new(name).expect("built-in vaccine names are non-empty"),
        disease_prevented: disease.to_owned(),
        age_offset_days,
        total_doses,
        dose_interval_days,
        mandatory,
        description: description.to_owned(),
    }
}

/// The built-in paediatric immunisation catalogue.
///
/// Ages and intervals follow the standard infant schedule: birth doses, the
/// 6-week primary series at 4-week intervals, and the 9-month/12-month/15-month
/// boosters.
pub fn builtin_definitions() -> Vec<VaccineDefinition> {
    vec![
        def(
            "BCG",
            "Tuberculosis",
            0,
            1,
            0,
            true,
            "Bacillus Calmette-Guérin vaccine to prevent tuberculosis",
        ),
        def(
            "Hepatitis B",
            "Hepatitis B",
            0,
            3,
            30,
            true,
            "Hepatitis B vaccine to prevent hepatitis B infection",
        ),
        def(
            "OPV",
            "Poliomyelitis",
            0,
            4,
            42,
            true,
            "Oral polio vaccine to prevent poliomyelitis",
        ),
        def(
            "DPT",
            "Diphtheria, Pertussis, Tetanus",
            42,
            3,
            28,
            true,
            "Combined vaccine against diphtheria, pertussis (whooping cough), and tetanus",
        ),
        def(
            "Hib",
            "Haemophilus influenzae type b",
            42,
            3,
            28,
            true,
            "Vaccine against Haemophilus influenzae type b",
        ),
        def(
            "Rotavirus",
            "Rotavirus gastroenteritis",
            42,
            3,
            28,
            false,
            "Oral vaccine against rotavirus",
        ),
        def(
            "Pneumococcal (PCV)",
            "Pneumococcal disease",
            42,
            3,
            28,
            false,
            "Pneumococcal conjugate vaccine",
        ),
        def(
            "IPV",
            "Poliomyelitis",
            98,
            2,
            210,
            true,
            "Inactivated polio vaccine",
        ),
        def("Measles", "Measles", 270, 2, 90, true, "Measles vaccine"),
        def(
            "Japanese Encephalitis (JE)",
            "Japanese Encephalitis",
            270,
            2,
            365,
            true,
            "Vaccine against Japanese Encephalitis",
        ),
        def(
            "Vitamin A",
            "Vitamin A deficiency",
            270,
            4,
            180,
            true,
            "Vitamin A supplementation",
        ),
        def(
            "MMR",
            "Measles, Mumps, Rubella",
            365,
            2,
            180,
            true,
            "Combined vaccine against measles, mumps, and rubella",
        ),
        def(
            "Hepatitis A",
            "Hepatitis A",
            365,
            2,
            180,
            false,
            "Vaccine against Hepatitis A",
        ),
        def(
            "Varicella",
            "Chickenpox",
            456,
            2,
            90,
            false,
            "Varicella (chickenpox) vaccine",
        ),
        def(
            "DPT Booster 1",
            "Diphtheria, Pertussis, Tetanus",
            540,
            1,
            0,
            true,
            "First booster dose of DPT vaccine",
        ),
        def(
            "Typhoid",
            "Typhoid fever",
            730,
            1,
            0,
            false,
            "Vaccine against typhoid fever",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn test_store(data_dir: &std::path::Path) -> Arc<ScheduleStore> {
        Arc::new(ScheduleStore::new(Arc::new(CoreConfig::new(
            data_dir.to_path_buf(),
        ))))
    }

    #[test]
    fn builtin_names_are_unique() {
        let defs = builtin_definitions();
        let names: HashSet<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), defs.len(), "catalogue names must be unique");
    }

    #[test]
    fn builtin_definitions_are_valid() {
        for def in builtin_definitions() {
            def.validate()
                .unwrap_or_else(|e| panic!("'{}' should validate: {}", def.name, e));
        }
    }

    #[test]
    fn zero_dose_definition_is_rejected() {
        let mut broken = builtin_definitions().remove(0);
        broken.total_doses = 0;
        assert!(matches!(
            broken.validate(),
            Err(SureShotError::InvalidInput(_))
        ));
    }

    #[test]
    fn seeding_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let catalog = CatalogService::new(test_store(temp_dir.path()));

        let first = catalog.seed_builtin().expect("first seeding should succeed");
        assert_eq!(first, builtin_definitions().len());

        let second = catalog
            .seed_builtin()
            .expect("second seeding should succeed");
        assert_eq!(second, 0, "re-seeding must not create duplicates");

        let listed = catalog.list().expect("list should succeed");
        assert_eq!(listed.len(), builtin_definitions().len());
    }

    #[test]
    fn get_finds_definition_by_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let catalog = CatalogService::new(test_store(temp_dir.path()));
        catalog.seed_builtin().expect("seeding should succeed");

        let bcg = catalog
            .get("BCG")
            .expect("get should succeed")
            .expect("BCG should be present");
        assert_eq!(bcg.age_offset_days, 0);
        assert_eq!(bcg.total_doses, 1);

        assert!(catalog.get("Smallpox").expect("get should succeed").is_none());
    }
}
