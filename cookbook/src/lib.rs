//! Recipe data and the two pieces of kitchen logic the app is built around:
//! matching on-hand ingredients against a catalog, and synthesizing fusion
//! recipes out of per-cuisine vocabularies.
//!
//! All reference data lives as YAML under `data/` and is embedded at compile
//! time, so loading it never touches the filesystem.

use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod cuisines;
pub mod fusion;
pub mod vocabulary;

pub use catalog::{match_recipes, Catalog};
pub use cuisines::{CuisineProfile, CuisineTable};
pub use vocabulary::Vocabulary;

pub(crate) static DATA_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/data");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub servings: Option<i32>,
    pub ready_in_minutes: Option<i32>,
    pub instructions: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub is_fusion: bool,
}

impl Recipe {
    /// Numbered instruction lines with the `N. ` prefix stripped.
    pub fn steps(&self) -> Vec<&str> {
        let Some(instructions) = &self.instructions else {
            return vec![];
        };

        instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(". ") {
                Some((n, rest)) if n.chars().all(|c| c.is_ascii_digit()) => rest,
                _ => line,
            })
            .collect()
    }
}

/// Everything the app needs from the static data, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Cookbook {
    pub catalog: Catalog,
    pub cuisines: CuisineTable,
    pub vocabulary: Vocabulary,
}

impl Cookbook {
    pub fn from_static_dir() -> Result<Self> {
        Ok(Self {
            catalog: Catalog::from_static_dir()?,
            cuisines: CuisineTable::from_static_dir()?,
            vocabulary: Vocabulary::from_static_dir()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.cuisines.validate()?;
        self.vocabulary.validate()?;

        Ok(())
    }
}

pub(crate) fn yaml_file<T>(dir: &Dir, name: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let file = dir
        .get_file(name)
        .ok_or_else(|| eyre!("Static data file {name} is missing"))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| eyre!("Static data file {name} is not UTF8"))?;

    serde_yaml::from_str(contents).wrap_err_with(|| format!("{name} should be valid YAML"))
}

#[derive(Debug, thiserror::Error)]
#[error("There were errors validating the {what}: {}", .problems.join("; "))]
pub(crate) struct ValidationError {
    pub(crate) what: &'static str,
    pub(crate) problems: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_data_loads_and_validates() {
        let cookbook = Cookbook::from_static_dir().unwrap();

        assert_eq!(cookbook.catalog.recipes().len(), 5);
        assert_eq!(cookbook.cuisines.names().count(), 8);
        assert_eq!(cookbook.vocabulary.ingredients().len(), 20);

        cookbook.validate().unwrap();
    }

    #[test]
    fn steps_strip_numbering() {
        let cookbook = Cookbook::from_static_dir().unwrap();
        let recipe = cookbook.catalog.get(3).unwrap();

        assert_eq!(
            recipe.steps(),
            vec![
                "Mix cooked chicken, celery, and onion in a bowl.",
                "In another bowl, combine mayonnaise, lemon juice, and seasonings.",
                "Pour dressing over chicken mixture and toss to coat.",
                "Serve on lettuce leaves or as a sandwich.",
            ]
        );
    }

    #[test]
    fn recipe_json_uses_snake_case_fields() {
        let cookbook = Cookbook::from_static_dir().unwrap();
        let json = serde_json::to_value(cookbook.catalog.get(1).unwrap()).unwrap();

        assert_eq!(json["ready_in_minutes"], 30);
        assert_eq!(json["is_fusion"], false);
        assert_eq!(json["cuisines"][0], "Italian");
    }
}
