//! Fusion recipes are made up on the spot by blending the vocabularies of two
//! or more cuisines with whatever ingredients are on hand.
//!
//! Every random choice goes through the caller's [`Rng`], so a seeded rng
//! always produces the same recipe.

use rand::{seq::SliceRandom, Rng};

use crate::{CuisineProfile, CuisineTable, Recipe};

/// Longest ingredient list a fusion recipe gets from cuisine additions.
pub const INGREDIENT_CAP: usize = 10;

pub const FUSION_IMAGE_URL: &str = "https://spoonacular.com/recipeImages/fusion-recipe.jpg";
pub const FUSION_SOURCE_URL: &str = "https://fridgetoplate.app/fusion";

const FALLBACK_CUISINE_COUNT: usize = 2;
const TECHNIQUE_SAMPLE: usize = 3;
const FLAVOR_SAMPLE: usize = 2;

impl CuisineTable {
    pub fn synthesize<S, C, R>(&self, on_hand: &[S], cuisines: &[C], rng: &mut R) -> Recipe
    where
        S: AsRef<str>,
        C: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut profiles = self.resolve(cuisines);
        if profiles.is_empty() {
            profiles = self.sample(rng, FALLBACK_CUISINE_COUNT);
        }

        let cuisine_names: Vec<String> = profiles.iter().map(|p| p.name.clone()).collect();
        let joined_cuisines = cuisine_names.join(" and ");

        let ingredients = fusion_ingredients(on_hand, &profiles);
        let title = fusion_title(&ingredients, &joined_cuisines);
        let instructions = fusion_instructions(&profiles, rng);

        Recipe {
            id: rng.gen_range(1000..=9999),
            title,
            image_url: Some(FUSION_IMAGE_URL.to_string()),
            source_url: Some(FUSION_SOURCE_URL.to_string()),
            servings: Some(4),
            ready_in_minutes: Some(rng.gen_range(20..=60)),
            instructions: Some(instructions),
            summary: Some(fusion_summary(&joined_cuisines)),
            cuisines: cuisine_names,
            ingredients,
            is_fusion: true,
        }
    }
}

pub fn fusion_summary(joined_cuisines: &str) -> String {
    format!(
        "A creative fusion dish combining elements of {joined_cuisines} cuisines, using ingredients you already have."
    )
}

/// `Fusion Chicken, Rice, Pasta (Italian and Mexican Style)`
pub fn fusion_title<S: AsRef<str>>(ingredients: &[S], joined_cuisines: &str) -> String {
    let main = ingredients
        .iter()
        .take(3)
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(", ");

    format!("Fusion {} ({joined_cuisines} Style)", title_case(&main))
}

fn fusion_ingredients<S: AsRef<str>>(on_hand: &[S], profiles: &[&CuisineProfile]) -> Vec<String> {
    let mut ingredients: Vec<String> = vec![];

    for name in on_hand.iter().map(|s| s.as_ref()) {
        if !name.is_empty() && !ingredients.iter().any(|i| i == name) {
            ingredients.push(name.to_string());
        }
    }

    for name in profiles.iter().flat_map(|p| &p.ingredients) {
        if ingredients.len() >= INGREDIENT_CAP {
            break;
        }
        if !ingredients.contains(name) {
            ingredients.push(name.clone());
        }
    }

    ingredients
}

fn fusion_instructions<R: Rng + ?Sized>(profiles: &[&CuisineProfile], rng: &mut R) -> String {
    let techniques: Vec<&str> = profiles
        .iter()
        .flat_map(|p| &p.techniques)
        .map(String::as_str)
        .collect();
    let flavors: Vec<&str> = profiles
        .iter()
        .flat_map(|p| &p.flavors)
        .map(String::as_str)
        .collect();

    let techniques: Vec<&str> = techniques
        .choose_multiple(rng, TECHNIQUE_SAMPLE)
        .copied()
        .collect();
    let flavors: Vec<&str> = flavors.choose_multiple(rng, FLAVOR_SAMPLE).copied().collect();

    let (heat, cook) = if techniques.contains(&"simmer") {
        (
            "Heat oil in a pan and add aromatics.",
            "Add main ingredients and simmer until cooked through.",
        )
    } else if techniques.contains(&"stir fry") {
        (
            "Heat oil in a wok or large pan until very hot.",
            "Quickly stir fry ingredients in small batches, starting with aromatics.",
        )
    } else if techniques.contains(&"grill") {
        (
            "Marinate main ingredients with spices and oil.",
            "Grill until cooked through with nice char marks.",
        )
    } else {
        (
            "Combine ingredients in a suitable cooking vessel.",
            "Cook using your preferred method until done.",
        )
    };

    let season = format!(
        "Season to taste, aiming for a {} flavor profile.",
        flavors.join(" and ")
    );

    number_steps(&[
        "Prepare all ingredients.",
        heat,
        cook,
        season.as_str(),
        "Garnish with fresh herbs and serve immediately.",
    ])
}

/// Joins steps as `1. first\n2. second`.
pub fn number_steps<S: AsRef<str>>(steps: &[S]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest, so `"olive oil, garlic"` becomes `"Olive Oil, Garlic"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
