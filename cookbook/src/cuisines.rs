use color_eyre::Result;
use include_dir::Dir;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{yaml_file, ValidationError, DATA_DIR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuisineProfile {
    pub name: String,
    pub ingredients: Vec<String>,
    pub techniques: Vec<String>,
    pub flavors: Vec<String>,
}

/// Cuisine vocabularies keyed by their canonical name.
///
/// Lookups ignore case, so `"italian"` and `"ITALIAN"` both resolve to the
/// `Italian` profile. Table order is preserved from the data file.
#[derive(Debug, Clone)]
pub struct CuisineTable {
    profiles: Vec<CuisineProfile>,
}

impl CuisineTable {
    pub fn new(profiles: Vec<CuisineProfile>) -> Self {
        Self { profiles }
    }

    pub fn from_static_dir() -> Result<Self> {
        Self::from_dir(&DATA_DIR)
    }

    pub fn from_dir(dir: &Dir) -> Result<Self> {
        let profiles: Vec<CuisineProfile> = yaml_file(dir, "cuisines.yaml")?;

        Ok(Self { profiles })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&CuisineProfile> {
        let name = name.trim();

        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Known profiles for `requested`, in request order and without repeats.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Vec<&CuisineProfile> {
        let mut resolved: Vec<&CuisineProfile> = vec![];

        for profile in requested.iter().filter_map(|name| self.get(name.as_ref())) {
            if !resolved.iter().any(|p| p.name == profile.name) {
                resolved.push(profile);
            }
        }

        resolved
    }

    /// Up to `amount` distinct profiles chosen uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, amount: usize) -> Vec<&CuisineProfile> {
        self.profiles.choose_multiple(rng, amount).collect()
    }

    pub fn validate(&self) -> Result<()> {
        println!("Validating {} Cuisines", self.profiles.len());

        let mut problems = vec![];
        for (i, profile) in self.profiles.iter().enumerate() {
            if profile.ingredients.is_empty()
                || profile.techniques.is_empty()
                || profile.flavors.is_empty()
            {
                problems.push(format!("Cuisine {} has an empty vocabulary", profile.name));
            }

            if self.profiles[..i]
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(&profile.name))
            {
                problems.push(format!("Cuisine {} is listed twice", profile.name));
            }
        }

        if self.profiles.len() < 2 {
            problems.push("At least two cuisines are needed to make a fusion".to_string());
        }

        if !problems.is_empty() {
            return Err(ValidationError {
                what: "cuisine table",
                problems,
            }
            .into());
        }

        println!("Cuisines Valid! ✅");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn names<'a>(profiles: &[&'a CuisineProfile]) -> Vec<&'a str> {
        profiles.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn lookup_ignores_case() {
        let table = CuisineTable::from_static_dir().unwrap();

        assert_eq!(table.get("italian").unwrap().name, "Italian");
        assert_eq!(table.get("MEDITERRANEAN").unwrap().name, "Mediterranean");
        assert_eq!(table.get(" Thai ").unwrap().name, "Thai");
        assert!(table.get("Martian").is_none());
    }

    #[test]
    fn resolve_keeps_request_order_and_drops_unknowns() {
        let table = CuisineTable::from_static_dir().unwrap();

        let resolved = table.resolve(&["mexican", "Klingon", "Italian", "MEXICAN"]);

        assert_eq!(names(&resolved), vec!["Mexican", "Italian"]);
    }

    #[test]
    fn sample_returns_distinct_profiles() {
        let table = CuisineTable::from_static_dir().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let sampled = table.sample(&mut rng, 2);

            assert_eq!(sampled.len(), 2);
            assert_ne!(sampled[0].name, sampled[1].name);
        }
    }

    #[test]
    fn static_table_is_in_file_order() {
        let table = CuisineTable::from_static_dir().unwrap();

        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec![
                "Italian",
                "Mexican",
                "Indian",
                "Chinese",
                "Japanese",
                "Thai",
                "French",
                "Mediterranean"
            ]
        );
    }
}
