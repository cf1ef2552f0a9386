use std::path::Path;

use color_eyre::Result;
use include_dir::Dir;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{yaml_file, ValidationError, DATA_DIR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub name: String,
    pub variations: Vec<String>,
}

/// The ingredients image recognition can report, and the words that point at
/// each of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    food_categories: Vec<String>,
    ingredients: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn from_static_dir() -> Result<Self> {
        Self::from_dir(&DATA_DIR)
    }

    pub fn from_dir(dir: &Dir) -> Result<Self> {
        yaml_file(dir, "vocabulary.yaml")
    }

    pub fn ingredients(&self) -> &[VocabularyEntry] {
        &self.ingredients
    }

    /// Ingredients whose variations appear in the file name.
    ///
    /// Falls back to 2 to 4 random ingredients when nothing in the name is
    /// recognizable.
    pub fn guess_from_filename<R: Rng + ?Sized>(&self, filename: &str, rng: &mut R) -> Vec<String> {
        let filename = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename)
            .to_lowercase();

        let found: Vec<String> = self
            .ingredients
            .iter()
            .filter(|entry| entry.variations.iter().any(|v| filename.contains(v.as_str())))
            .map(|entry| entry.name.clone())
            .collect();

        if !found.is_empty() {
            return found;
        }

        let amount = rng.gen_range(2..=4);
        self.ingredients
            .choose_multiple(rng, amount)
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Whether a vision label looks like food at all.
    pub fn is_food_related(&self, label: &str) -> bool {
        let label = label.to_lowercase();

        self.food_categories
            .iter()
            .any(|c| label.contains(c.as_str()))
            || self
                .ingredients
                .iter()
                .any(|entry| label.contains(entry.name.as_str()))
    }

    /// Maps lower-cased vision labels onto known ingredient names, in
    /// vocabulary order and without repeats.
    pub fn ingredients_for_labels<S: AsRef<str>>(&self, labels: &[S]) -> Vec<String> {
        self.ingredients
            .iter()
            .filter(|entry| {
                labels.iter().any(|label| {
                    let label = label.as_ref();
                    entry.variations.iter().any(|v| v == label) || label.contains(entry.name.as_str())
                })
            })
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        println!("Validating {} Vocabulary Entries", self.ingredients.len());

        let problems: Vec<String> = self
            .ingredients
            .iter()
            .filter(|entry| !entry.variations.contains(&entry.name))
            .map(|entry| format!("{} is missing from its own variations", entry.name))
            .collect();

        if !problems.is_empty() {
            return Err(ValidationError {
                what: "vision vocabulary",
                problems,
            }
            .into());
        }

        println!("Vocabulary Valid! ✅");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_static_dir().unwrap()
    }

    #[test]
    fn filename_matches_in_table_order() {
        let mut rng = StdRng::seed_from_u64(1);

        let found = vocabulary().guess_from_filename("uploads/Salmon_and_Tomato.JPG", &mut rng);

        assert_eq!(found, vec!["tomato", "fish"]);
    }

    #[test]
    fn only_the_file_name_is_searched() {
        let mut rng = StdRng::seed_from_u64(1);

        let found = vocabulary().guess_from_filename("/rice/beef/lemon.png", &mut rng);

        assert_eq!(found, vec!["lemon"]);
    }

    #[test]
    fn category_words_count_as_matches() {
        let mut rng = StdRng::seed_from_u64(1);

        let found = vocabulary().guess_from_filename("fruit.png", &mut rng);

        assert_eq!(found, vec!["apple", "banana", "lemon"]);
    }

    #[test]
    fn unknown_filename_samples_two_to_four() {
        let vocabulary = vocabulary();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..25 {
            let found = vocabulary.guess_from_filename("IMG_0042.png", &mut rng);

            assert!((2..=4).contains(&found.len()));
            for name in &found {
                assert!(vocabulary.ingredients().iter().any(|e| &e.name == name));
            }

            let mut unique = found.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), found.len());
        }
    }

    #[test]
    fn food_related_labels() {
        let vocabulary = vocabulary();

        assert!(vocabulary.is_food_related("Natural foods"));
        assert!(vocabulary.is_food_related("Leaf Vegetable"));
        assert!(vocabulary.is_food_related("Garlic"));
        assert!(!vocabulary.is_food_related("Refrigerator"));
        assert!(!vocabulary.is_food_related("Shelf"));
    }

    #[test]
    fn labels_map_to_ingredients() {
        let vocabulary = vocabulary();

        let found = vocabulary.ingredients_for_labels(&["roma tomato", "mozzarella", "shelf"]);

        assert_eq!(found, vec!["tomato", "cheese"]);
        assert!(vocabulary.ingredients_for_labels::<&str>(&[]).is_empty());
    }
}
