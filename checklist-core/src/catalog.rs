//! Catalog of regulatory standards and their controls
//!
//! The catalog is immutable once built. The built-in table covers GDPR,
//! HIPAA and PCI-DSS; deployments can point the service at a TOML file with
//! the same shape instead:
//!
//! ```toml
//! [[standards]]
//! name = "GDPR"
//!
//! [[standards.controls]]
//! id = "GDPR-1"
//! description = "Implement data protection by design and default."
//! industries = ["Tech", "Healthcare", "Finance"]
//! locations = ["EU"]
//! ```

use crate::error::{ChecklistError, Result};
use crate::types::{Control, WILDCARD};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

type ControlRow = (&'static str, &'static str, &'static [&'static str], &'static [&'static str]);

const BUILTIN_STANDARDS: &[(&str, &[ControlRow])] = &[
    (
        "GDPR",
        &[
            ("GDPR-1", "Implement data protection by design and default.", &["Tech", "Healthcare", "Finance"], &["EU"]),
            ("GDPR-2", "Maintain records of processing activities.", &["All"], &["EU"]),
            ("GDPR-3", "Conduct Data Protection Impact Assessments (DPIA).", &["Tech", "Healthcare"], &["EU"]),
        ],
    ),
    (
        "HIPAA",
        &[
            ("HIPAA-1", "Ensure physical safeguards for PHI.", &["Healthcare"], &["US"]),
            ("HIPAA-2", "Implement access controls for ePHI.", &["Healthcare"], &["US"]),
            ("HIPAA-3", "Conduct regular risk assessments.", &["Healthcare"], &["US"]),
        ],
    ),
    (
        "PCI-DSS",
        &[
            ("PCI-1", "Install and maintain a firewall configuration.", &["Finance", "Retail"], &["All"]),
            ("PCI-2", "Do not use vendor-supplied defaults for passwords.", &["Finance", "Retail"], &["All"]),
            ("PCI-3", "Protect stored cardholder data with encryption.", &["Finance", "Retail"], &["All"]),
        ],
    ),
];

const BUILTIN_INDUSTRIES: &[(&str, &str)] = &[
    ("Tech", "Technology"),
    ("Healthcare", "Healthcare"),
    ("Finance", "Finance"),
    ("Retail", "Retail"),
];

const BUILTIN_LOCATIONS: &[(&str, &str)] = &[
    ("EU", "European Union"),
    ("US", "United States"),
    ("All", "Global"),
];

lazy_static! {
    static ref BUILTIN_CATALOG: Arc<Catalog> = Arc::new(Catalog::build_builtin());
}

/// A selectable industry or location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: &str, label: &str) -> Self {
        Choice {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Immutable standards → controls table, in authored order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Catalog {
    controls: Vec<Control>,
    industries: Vec<Choice>,
    locations: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    standards: Vec<StandardEntry>,
    #[serde(default)]
    industries: Vec<Choice>,
    #[serde(default)]
    locations: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct StandardEntry {
    name: String,
    #[serde(default)]
    controls: Vec<ControlEntry>,
}

#[derive(Debug, Deserialize)]
struct ControlEntry {
    id: String,
    description: String,
    industries: Vec<String>,
    locations: Vec<String>,
}

impl Catalog {
    /// Shared handle to the built-in catalog.
    pub fn builtin() -> Arc<Catalog> {
        BUILTIN_CATALOG.clone()
    }

    fn build_builtin() -> Self {
        let controls = BUILTIN_STANDARDS
            .iter()
            .flat_map(|(standard, rows)| {
                rows.iter().map(move |(id, description, industries, locations)| Control {
                    id: id.to_string(),
                    description: description.to_string(),
                    applicable_industries: industries.iter().map(|s| s.to_string()).collect(),
                    applicable_locations: locations.iter().map(|s| s.to_string()).collect(),
                    standard: standard.to_string(),
                })
            })
            .collect();

        Catalog {
            controls,
            industries: BUILTIN_INDUSTRIES.iter().map(|(v, l)| Choice::new(v, l)).collect(),
            locations: BUILTIN_LOCATIONS.iter().map(|(v, l)| Choice::new(v, l)).collect(),
        }
    }

    /// Build a catalog from controls, deriving the selectable options from them.
    pub fn from_controls(controls: Vec<Control>) -> Result<Self> {
        let industries = derive_choices(controls.iter().flat_map(|c| &c.applicable_industries));
        let locations = derive_choices(controls.iter().flat_map(|c| &c.applicable_locations));
        let catalog = Catalog {
            controls,
            industries,
            locations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(source)?;

        let controls: Vec<Control> = file
            .standards
            .into_iter()
            .flat_map(|standard| {
                let name = standard.name;
                standard.controls.into_iter().map(move |entry| Control {
                    id: entry.id.trim().to_string(),
                    description: entry.description.trim().to_string(),
                    applicable_industries: entry.industries.into_iter().collect(),
                    applicable_locations: entry.locations.into_iter().collect(),
                    standard: name.trim().to_string(),
                })
            })
            .collect();

        let mut catalog = Catalog::from_controls(controls)?;
        if !file.industries.is_empty() {
            catalog.industries = file.industries;
        }
        if !file.locations.is_empty() {
            catalog.locations = file.locations;
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let catalog = Catalog::from_toml_str(&source)?;
        info!(
            "Loaded catalog from {} ({} controls)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.controls.is_empty() {
            return Err(ChecklistError::InvalidCatalog(
                "catalog has no controls".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for control in &self.controls {
            if control.id.is_empty() || control.description.is_empty() || control.standard.is_empty() {
                return Err(ChecklistError::InvalidCatalog(format!(
                    "control '{}' is missing an id, description or standard",
                    control.id
                )));
            }
            if !seen.insert(control.id.as_str()) {
                return Err(ChecklistError::InvalidCatalog(format!(
                    "duplicate control id '{}'",
                    control.id
                )));
            }
            if control.applicable_industries.is_empty() || control.applicable_locations.is_empty() {
                return Err(ChecklistError::InvalidCatalog(format!(
                    "control '{}' must name at least one industry and one location",
                    control.id
                )));
            }
            let blank = control
                .applicable_industries
                .iter()
                .chain(&control.applicable_locations)
                .any(|value| value.trim().is_empty());
            if blank {
                return Err(ChecklistError::InvalidCatalog(format!(
                    "control '{}' has a blank industry or location",
                    control.id
                )));
            }
        }

        Ok(())
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn get(&self, control_id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == control_id)
    }

    /// Standard names in the order they first appear.
    pub fn standards(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for control in &self.controls {
            if !names.contains(&control.standard.as_str()) {
                names.push(&control.standard);
            }
        }
        names
    }

    pub fn industries(&self) -> &[Choice] {
        &self.industries
    }

    pub fn locations(&self) -> &[Choice] {
        &self.locations
    }
}

fn derive_choices<'a>(values: impl Iterator<Item = &'a String>) -> Vec<Choice> {
    let unique: BTreeSet<&str> = values
        .map(String::as_str)
        .filter(|v| *v != WILDCARD)
        .collect();
    unique.into_iter().map(|v| Choice::new(v, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.controls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "GDPR-1", "GDPR-2", "GDPR-3", "HIPAA-1", "HIPAA-2", "HIPAA-3", "PCI-1", "PCI-2",
                "PCI-3"
            ]
        );
        assert_eq!(catalog.standards(), vec!["GDPR", "HIPAA", "PCI-DSS"]);
        assert_eq!(catalog.get("GDPR-2").unwrap().standard, "GDPR");
        assert!(catalog.get("SOX-1").is_none());
    }

    #[test]
    fn test_builtin_catalog_is_shared() {
        let a = Catalog::builtin();
        let b = Catalog::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_builtin_options() {
        let catalog = Catalog::builtin();
        let industries: Vec<&str> = catalog.industries().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(industries, vec!["Tech", "Healthcare", "Finance", "Retail"]);
        let global = catalog.locations().iter().find(|c| c.value == "All").unwrap();
        assert_eq!(global.label, "Global");
    }

    #[test]
    fn test_from_toml_str() {
        let source = r#"
            [[standards]]
            name = "SOX"

            [[standards.controls]]
            id = "SOX-1"
            description = "Maintain internal controls over financial reporting."
            industries = ["Finance"]
            locations = ["US"]

            [[standards.controls]]
            id = "SOX-2"
            description = "Retain audit records for seven years."
            industries = ["All"]
            locations = ["US"]
        "#;

        let catalog = Catalog::from_toml_str(source).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.controls()[1].standard, "SOX");

        // Options derived from the controls, wildcard excluded
        let industries: Vec<&str> = catalog.industries().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(industries, vec!["Finance"]);
    }

    #[test]
    fn test_duplicate_control_rejected() {
        let source = r#"
            [[standards]]
            name = "A"

            [[standards.controls]]
            id = "X-1"
            description = "first"
            industries = ["All"]
            locations = ["All"]

            [[standards]]
            name = "B"

            [[standards.controls]]
            id = "X-1"
            description = "second"
            industries = ["All"]
            locations = ["All"]
        "#;

        let err = Catalog::from_toml_str(source).unwrap_err();
        assert!(matches!(err, ChecklistError::InvalidCatalog(_)));
    }

    #[test]
    fn test_control_without_locations_rejected() {
        let source = r#"
            [[standards]]
            name = "A"

            [[standards.controls]]
            id = "A-1"
            description = "no locations"
            industries = ["Tech"]
            locations = []
        "#;

        assert!(Catalog::from_toml_str(source).is_err());
    }

    #[test]
    fn test_blank_industry_or_location_rejected() {
        let source = r#"
            [[standards]]
            name = "A"

            [[standards.controls]]
            id = "A-1"
            description = "blank industry"
            industries = [""]
            locations = ["EU"]
        "#;
        assert!(matches!(
            Catalog::from_toml_str(source),
            Err(ChecklistError::InvalidCatalog(_))
        ));

        let source = r#"
            [[standards]]
            name = "A"

            [[standards.controls]]
            id = "A-1"
            description = "blank location"
            industries = ["Tech"]
            locations = ["EU", "  "]
        "#;
        assert!(Catalog::from_toml_str(source).is_err());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(Catalog::from_toml_str("standards = []").is_err());
        assert!(Catalog::from_controls(Vec::new()).is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[standards]]\nname = \"ISO27001\"\n\n[[standards.controls]]\nid = \"ISO-1\"\ndescription = \"Define an information security policy.\"\nindustries = [\"All\"]\nlocations = [\"All\"]"
        )
        .unwrap();

        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.get("ISO-1").unwrap().standard, "ISO27001");
    }
}
