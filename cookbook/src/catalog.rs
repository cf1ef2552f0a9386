use std::collections::HashSet;

use color_eyre::Result;
use include_dir::Dir;

use crate::{yaml_file, Recipe, ValidationError, DATA_DIR};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn from_static_dir() -> Result<Self> {
        Self::from_dir(&DATA_DIR)
    }

    pub fn from_dir(dir: &Dir) -> Result<Self> {
        let recipes: Vec<Recipe> = yaml_file(dir, "catalog.yaml")?;

        Ok(Self { recipes })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Adds a recipe, replacing any entry that already uses its id.
    pub fn insert(&mut self, recipe: Recipe) {
        match self.recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => self.recipes.push(recipe),
        }
    }

    pub fn matching<S: AsRef<str>>(&self, on_hand: &[S]) -> Vec<Recipe> {
        match_recipes(on_hand, &self.recipes)
    }

    pub fn validate(&self) -> Result<()> {
        println!("Validating {} Recipes", self.recipes.len());

        let mut problems = vec![];
        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if recipe.ingredients.is_empty() {
                problems.push(format!("Recipe {} has no ingredients", recipe.id));
            }
            if !seen.insert(recipe.id) {
                problems.push(format!("Recipe id {} is used twice", recipe.id));
            }
        }

        if !problems.is_empty() {
            return Err(ValidationError {
                what: "recipe catalog",
                problems,
            }
            .into());
        }

        println!("Recipes Valid! ✅");

        Ok(())
    }
}

/// Ranks the recipes that share at least one ingredient with `on_hand`.
///
/// Recipes are ordered by the share of their own ingredients that are on hand,
/// highest first. Equal scores keep catalog order. Membership is an exact,
/// case-sensitive string comparison.
pub fn match_recipes<S: AsRef<str>>(on_hand: &[S], catalog: &[Recipe]) -> Vec<Recipe> {
    let on_hand: HashSet<&str> = on_hand.iter().map(|s| s.as_ref()).collect();
    if on_hand.is_empty() {
        return vec![];
    }

    let mut scored: Vec<(f64, &Recipe)> = catalog
        .iter()
        .filter_map(|recipe| {
            let matched = recipe
                .ingredients
                .iter()
                .filter(|i| on_hand.contains(i.as_str()))
                .count();

            if matched == 0 {
                return None;
            }

            #[allow(clippy::cast_precision_loss)]
            let score = matched as f64 / recipe.ingredients.len() as f64;

            Some((score, recipe))
        })
        .collect();

    // `sort_by` is stable, ties stay in catalog order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored.into_iter().map(|(_, r)| r.clone()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn recipe(id: i64, ingredients: &[&str]) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {id}"),
            image_url: None,
            source_url: None,
            servings: Some(2),
            ready_in_minutes: Some(10),
            instructions: None,
            summary: None,
            cuisines: vec![],
            ingredients: ingredients.iter().map(ToString::to_string).collect(),
            is_fusion: false,
        }
    }

    fn ids(recipes: &[Recipe]) -> Vec<i64> {
        recipes.iter().map(|r| r.id).collect()
    }

    #[test]
    fn zero_overlap_recipes_are_excluded() {
        let catalog = vec![
            recipe(1, &["pasta", "tomato", "garlic"]),
            recipe(2, &["beef"]),
        ];

        let matched = match_recipes(&["tomato", "pasta"], &catalog);

        assert_eq!(ids(&matched), vec![1]);
        assert_eq!(matched[0], catalog[0]);
    }

    #[test]
    fn empty_on_hand_matches_nothing() {
        let catalog = Catalog::from_static_dir().unwrap();
        let nothing: [&str; 0] = [];

        assert!(catalog.matching(&nothing).is_empty());
    }

    #[test]
    fn ordered_by_share_of_ingredients_on_hand() {
        let catalog = vec![
            recipe(1, &["a", "b", "c", "d"]),
            recipe(2, &["a"]),
            recipe(3, &["a", "b"]),
            recipe(4, &["z"]),
        ];

        let matched = match_recipes(&["a", "b"], &catalog);

        assert_eq!(ids(&matched), vec![2, 3, 1]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = vec![
            recipe(7, &["a", "x"]),
            recipe(3, &["b", "y"]),
            recipe(5, &["a", "b"]),
            recipe(1, &["a", "q"]),
        ];

        let matched = match_recipes(&["a", "b"], &catalog);

        assert_eq!(ids(&matched), vec![5, 7, 3, 1]);
    }

    #[test]
    fn membership_is_case_sensitive() {
        let catalog = vec![recipe(1, &["Tomato"])];

        assert!(match_recipes(&["tomato"], &catalog).is_empty());
    }

    #[test]
    fn static_catalog_matches() {
        let catalog = Catalog::from_static_dir().unwrap();

        let matched = catalog.matching(&["garlic", "tomato", "pasta"]);

        // Pasta (3/5), Soup (2/7), Tacos (1/6), Stir Fry (1/7)
        assert_eq!(ids(&matched), vec![1, 5, 4, 2]);
    }

    #[test]
    fn get_by_id() {
        let catalog = Catalog::from_static_dir().unwrap();

        assert_eq!(catalog.get(4).unwrap().title, "Beef Tacos");
        assert!(catalog.get(42).is_none());
    }

    #[test]
    fn inserted_recipe_round_trips() {
        let mut catalog = Catalog::from_static_dir().unwrap();
        let mut added = recipe(1234, &["chicken", "rice"]);
        added.cuisines = vec!["Thai".to_string()];
        added.is_fusion = true;

        catalog.insert(added.clone());

        assert_eq!(catalog.get(1234), Some(&added));
        assert_eq!(catalog.recipes().len(), 6);
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut catalog = Catalog::new(vec![recipe(1, &["a"])]);

        catalog.insert(recipe(1, &["b"]));

        assert_eq!(catalog.recipes().len(), 1);
        assert_eq!(catalog.get(1).unwrap().ingredients, vec!["b".to_string()]);
    }

    #[test]
    fn validate_rejects_empty_ingredient_lists() {
        let catalog = Catalog::new(vec![recipe(1, &[])]);

        assert!(catalog.validate().is_err());
    }
}
