// 📚 Catalog - The authoritative reference data for the categories table
//
// A catalog is an ordered list of groups, one per category type, each holding
// (name, description) entries. Order is kept exactly as written so reports are
// deterministic; it carries no meaning for correctness.

use crate::error::{Result, SeedError};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// CATEGORY TYPE
// ============================================================================

/// The built-in reference-data groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Education,
    Industry,
    ExperienceLevel,
    Role,
    Skills,
}

impl CategoryType {
    pub const ALL: [CategoryType; 5] = [
        CategoryType::Education,
        CategoryType::Industry,
        CategoryType::ExperienceLevel,
        CategoryType::Role,
        CategoryType::Skills,
    ];

    /// Key stored in the `category_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Education => "education",
            CategoryType::Industry => "industry",
            CategoryType::ExperienceLevel => "experience_level",
            CategoryType::Role => "role",
            CategoryType::Skills => "skills",
        }
    }

    /// Path segment used by the HTTP read endpoints
    pub fn slug(&self) -> &'static str {
        match self {
            CategoryType::ExperienceLevel => "experience-level",
            other => other.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryType::Education => "Education",
            CategoryType::Industry => "Industry",
            CategoryType::ExperienceLevel => "Experience Level",
            CategoryType::Role => "Role",
            CategoryType::Skills => "Skills",
        }
    }

    /// Accepts either the storage key or the slug
    pub fn parse(value: &str) -> Result<CategoryType> {
        CategoryType::ALL
            .into_iter()
            .find(|t| t.as_str() == value || t.slug() == value)
            .ok_or_else(|| SeedError::UnknownCategoryType(value.to_string()))
    }
}

/// Display label for any type key, built-in or custom
///
/// Example: "experience_level" → "Experience Level", "certifications" → "Certifications"
pub fn label_for(category_type: &str) -> String {
    if let Ok(known) = CategoryType::parse(category_type) {
        return known.label().to_string();
    }

    category_type
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// One reference-data item; identified by (category_type, name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category_type: String,
    pub name: String,
    pub description: String,
}

impl CategoryEntry {
    pub fn new(category_type: &str, name: &str, description: &str) -> Self {
        CategoryEntry {
            category_type: category_type.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Item shape inside a catalog JSON file
#[derive(Debug, Deserialize)]
struct CatalogItem {
    name: String,
    #[serde(default)]
    description: String,
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    groups: Vec<(String, Vec<CategoryEntry>)>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog { groups: Vec::new() }
    }

    /// Append an entry; a type seen for the first time opens a new group at the end
    pub fn add(&mut self, category_type: &str, name: &str, description: &str) -> &mut Self {
        let entry = CategoryEntry::new(category_type, name, description);

        match self.groups.iter_mut().find(|(t, _)| t == category_type) {
            Some((_, entries)) => entries.push(entry),
            None => self.groups.push((category_type.to_string(), vec![entry])),
        }

        self
    }

    /// Builder form of [`Catalog::add`] for a whole group
    pub fn with_group(mut self, category_type: &str, items: &[(&str, &str)]) -> Self {
        for (name, description) in items {
            self.add(category_type, name, description);
        }
        self
    }

    /// Load a catalog from JSON: `{ "<type>": [ { "name": .., "description": .. } ] }`
    pub fn from_json_str(json: &str) -> Result<Catalog> {
        let groups: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| SeedError::Catalog(format!("invalid catalog JSON: {}", e)))?;

        let mut catalog = Catalog::new();

        for (category_type, value) in groups {
            if category_type.trim().is_empty() {
                return Err(SeedError::Catalog("empty category type key".to_string()));
            }

            let items: Vec<CatalogItem> = serde_json::from_value(value).map_err(|e| {
                SeedError::Catalog(format!("group '{}': {}", category_type, e))
            })?;

            for item in items {
                if item.name.trim().is_empty() {
                    return Err(SeedError::Catalog(format!(
                        "group '{}': entry with empty name",
                        category_type
                    )));
                }
                catalog.add(&category_type, &item.name, &item.description);
            }
        }

        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Catalog> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SeedError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&json)
    }

    /// Category types in catalog order
    pub fn category_types(&self) -> Vec<String> {
        self.groups.iter().map(|(t, _)| t.clone()).collect()
    }

    /// All entries, flattened in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.groups.iter().flat_map(|(_, entries)| entries.iter())
    }

    pub fn entries_for(&self, category_type: &str) -> &[CategoryEntry] {
        self.groups
            .iter()
            .find(|(t, _)| t == category_type)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    /// Names of one type with repeats removed, first occurrence wins
    pub fn distinct_names(&self, category_type: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in self.entries_for(category_type) {
            if !names.contains(&entry.name) {
                names.push(entry.name.clone());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The default data set for education, industry, experience level, role and skills
    pub fn builtin() -> Self {
        Catalog::new()
            .with_group(
                CategoryType::Education.as_str(),
                &[
                    ("Bachelor of Science", "Undergraduate degree in science"),
                    ("Bachelor of Arts", "Undergraduate degree in arts"),
                    ("Master of Science", "Graduate degree in science"),
                    ("Master of Arts", "Graduate degree in arts"),
                    ("PhD", "Doctor of Philosophy"),
                    ("MBA", "Master of Business Administration"),
                    ("B.Tech", "Bachelor of Technology"),
                    ("M.Tech", "Master of Technology"),
                    ("B.Com", "Bachelor of Commerce"),
                    ("M.Com", "Master of Commerce"),
                ],
            )
            .with_group(
                CategoryType::Industry.as_str(),
                &[
                    ("Technology", "Information technology and software"),
                    ("Healthcare", "Medical and healthcare services"),
                    ("Finance", "Banking and financial services"),
                    ("Education", "Educational institutions and services"),
                    ("Manufacturing", "Industrial manufacturing"),
                    ("Retail", "Retail and consumer goods"),
                    ("Consulting", "Business consulting services"),
                    ("Media & Entertainment", "Media and entertainment industry"),
                    ("Real Estate", "Real estate and property"),
                    ("Automotive", "Automotive industry"),
                ],
            )
            .with_group(
                CategoryType::ExperienceLevel.as_str(),
                &[
                    ("Entry Level", "0-2 years of experience"),
                    ("Junior", "2-4 years of experience"),
                    ("Mid Level", "4-7 years of experience"),
                    ("Senior", "7-10 years of experience"),
                    ("Lead", "10-15 years of experience"),
                    ("Principal", "15+ years of experience"),
                    ("Director", "Executive level with team management"),
                    ("VP", "Vice President level"),
                    ("C-Level", "Chief Executive level"),
                    ("Intern", "Internship or trainee level"),
                ],
            )
            .with_group(
                CategoryType::Role.as_str(),
                &[
                    ("Software Engineer", "Develops software applications"),
                    ("Data Scientist", "Analyzes and interprets complex data"),
                    ("Product Manager", "Manages product development"),
                    ("Marketing Manager", "Oversees marketing strategies"),
                    ("Sales Representative", "Handles sales activities"),
                    ("HR Manager", "Manages human resources"),
                    ("Financial Analyst", "Analyzes financial data"),
                    ("Project Manager", "Manages project execution"),
                    ("Business Analyst", "Analyzes business processes"),
                    ("UX Designer", "Designs user experiences"),
                    ("DevOps Engineer", "Manages development operations"),
                    ("Quality Assurance", "Ensures product quality"),
                ],
            )
            .with_group(
                CategoryType::Skills.as_str(),
                &[
                    ("Python", "Python programming language"),
                    ("JavaScript", "JavaScript programming language"),
                    ("Java", "Java programming language"),
                    ("React", "React.js framework"),
                    ("Node.js", "Node.js runtime environment"),
                    ("SQL", "Structured Query Language"),
                    ("Machine Learning", "Machine learning techniques"),
                    ("Data Analysis", "Data analysis and visualization"),
                    ("Project Management", "Project management methodologies"),
                    ("Agile", "Agile development methodology"),
                    ("Communication", "Effective communication skills"),
                    ("Leadership", "Leadership and team management"),
                    ("Problem Solving", "Analytical problem solving"),
                    ("Teamwork", "Collaborative teamwork skills"),
                    ("Time Management", "Time management and organization"),
                ],
            )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = Catalog::builtin();

        assert_eq!(
            catalog.category_types(),
            vec!["education", "industry", "experience_level", "role", "skills"]
        );
        assert_eq!(catalog.entries_for("education").len(), 10);
        assert_eq!(catalog.entries_for("industry").len(), 10);
        assert_eq!(catalog.entries_for("experience_level").len(), 10);
        assert_eq!(catalog.entries_for("role").len(), 12);
        assert_eq!(catalog.entries_for("skills").len(), 15);
        assert_eq!(catalog.len(), 57);
    }

    #[test]
    fn test_builtin_types_match_category_type_enum() {
        let catalog = Catalog::builtin();

        for (category_type, expected) in catalog.category_types().iter().zip(CategoryType::ALL) {
            assert_eq!(category_type, expected.as_str());
        }
    }

    #[test]
    fn test_add_keeps_first_seen_group_order() {
        let mut catalog = Catalog::new();
        catalog
            .add("role", "Software Engineer", "")
            .add("skills", "Rust", "")
            .add("role", "Data Scientist", "");

        assert_eq!(catalog.category_types(), vec!["role", "skills"]);

        let names: Vec<&str> = catalog.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Software Engineer", "Data Scientist", "Rust"]);
    }

    #[test]
    fn test_distinct_names_drops_repeats() {
        let catalog = Catalog::new().with_group(
            "skills",
            &[("Rust", "a"), ("Go", "b"), ("Rust", "c")],
        );

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.distinct_names("skills"), vec!["Rust", "Go"]);
        assert!(catalog.distinct_names("role").is_empty());
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json = r#"{
            "skills": [{"name": "Rust", "description": "Systems language"}],
            "industry": [{"name": "Energy"}, {"name": "Aerospace", "description": "Flight"}]
        }"#;

        let catalog = Catalog::from_json_str(json).unwrap();

        assert_eq!(catalog.category_types(), vec!["skills", "industry"]);
        assert_eq!(catalog.entries_for("industry")[0].description, "");
        assert_eq!(catalog.entries_for("industry")[1].name, "Aerospace");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            Catalog::from_json_str("not json"),
            Err(SeedError::Catalog(_))
        ));
        assert!(matches!(
            Catalog::from_json_str(r#"{"skills": [{"description": "no name"}]}"#),
            Err(SeedError::Catalog(_))
        ));
        assert!(matches!(
            Catalog::from_json_str(r#"{"skills": [{"name": "  "}]}"#),
            Err(SeedError::Catalog(_))
        ));
    }

    #[test]
    fn test_category_type_parse_accepts_key_and_slug() {
        assert_eq!(
            CategoryType::parse("experience_level").unwrap(),
            CategoryType::ExperienceLevel
        );
        assert_eq!(
            CategoryType::parse("experience-level").unwrap(),
            CategoryType::ExperienceLevel
        );
        assert_eq!(CategoryType::parse("skills").unwrap(), CategoryType::Skills);
        assert!(matches!(
            CategoryType::parse("hobbies"),
            Err(SeedError::UnknownCategoryType(_))
        ));
    }

    #[test]
    fn test_label_for() {
        assert_eq!(label_for("experience_level"), "Experience Level");
        assert_eq!(label_for("skills"), "Skills");
        assert_eq!(label_for("soft_skills"), "Soft Skills");
    }
}
