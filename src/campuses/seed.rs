use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::campuses::{CampusService, CreateCampus};

/// One entry of a universities JSON file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UniversitySeed {
    pub name: String,
    pub address: UniversityAddress,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UniversityAddress {
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

impl From<&UniversitySeed> for CreateCampus {
    fn from(seed: &UniversitySeed) -> Self {
        CreateCampus {
            name: seed.name.clone(),
            address: seed.address.city.clone(),
            description: seed.description.clone(),
            image_url: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid universities file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
}

/// Read a JSON array of universities
pub fn load_universities(path: impl AsRef<Path>) -> Result<Vec<UniversitySeed>, SeedError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let universities: Vec<UniversitySeed> = serde_json::from_str(&content)?;
    tracing::info!(
        "Found {} universities to seed in {}",
        universities.len(),
        path.display()
    );
    Ok(universities)
}

/// Create one campus per university, continuing past failures
pub async fn seed_campuses(service: &CampusService, universities: &[UniversitySeed]) -> SeedSummary {
    let mut summary = SeedSummary {
        total: universities.len(),
        ..Default::default()
    };

    for university in universities {
        match service.create(CreateCampus::from(university)).await {
            Ok(campus) => {
                summary.created += 1;
                tracing::debug!("Added campus {} ({})", campus.name, campus.id);
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!("Failed to add {}: {}", university.name, e);
            }
        }
    }

    tracing::info!(
        "Seeded {} of {} universities ({} failed)",
        summary.created,
        summary.total,
        summary.failed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campuses::MemoryCampusStore;
    use std::io::Write;
    use std::sync::Arc;

    const UNIVERSITIES: &str = r#"[
        {
            "name": "University of Ghana",
            "address": { "city": "Legon", "region": "Greater Accra", "zone": "South" },
            "description": "Oldest public university in Ghana"
        },
        {
            "name": "",
            "address": { "city": "Nowhere", "region": "None", "zone": "None" },
            "description": "Rejected: empty name"
        },
        {
            "name": "University of Cape Coast",
            "address": { "city": "Cape Coast", "region": "Central", "zone": "South" }
        }
    ]"#;

    #[test]
    fn test_load_universities_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(UNIVERSITIES.as_bytes()).unwrap();

        let universities = load_universities(file.path()).unwrap();

        assert_eq!(universities.len(), 3);
        assert_eq!(universities[0].address.city, "Legon");
        assert_eq!(universities[2].description, None);
    }

    #[test]
    fn test_load_universities_errors() {
        let missing = load_universities("/nonexistent/universities.json");
        assert!(matches!(missing, Err(SeedError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            load_universities(file.path()),
            Err(SeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_uses_city_as_address_and_counts_failures() {
        let service = CampusService::new(Arc::new(MemoryCampusStore::new()));
        let universities: Vec<UniversitySeed> = serde_json::from_str(UNIVERSITIES).unwrap();

        let summary = seed_campuses(&service, &universities).await;

        assert_eq!(
            summary,
            SeedSummary {
                total: 3,
                created: 2,
                failed: 1
            }
        );

        let campuses = service.find_all().await.unwrap();
        assert_eq!(campuses.len(), 2);
        assert_eq!(campuses[0].name, "University of Cape Coast");
        assert_eq!(campuses[0].address, "Cape Coast");
        assert_eq!(campuses[1].address, "Legon");
    }
}
