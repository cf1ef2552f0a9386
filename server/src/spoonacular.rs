use color_eyre::eyre::Context;
use cookbook::{
    fusion::{fusion_summary, fusion_title, FUSION_IMAGE_URL, FUSION_SOURCE_URL},
    Cookbook, Recipe,
};
use rand::{seq::SliceRandom, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    state::{flag, ApiKey, Lookup},
    Result,
};

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

#[derive(Debug, Clone)]
pub struct SpoonacularConfig {
    pub use_mock: bool,
    pub api_key: Option<ApiKey>,
    pub base_url: String,
}

impl SpoonacularConfig {
    pub(crate) fn from_lookup(lookup: Lookup) -> Self {
        Self {
            use_mock: flag(lookup, "USE_MOCK_RECIPES"),
            api_key: lookup("SPOONACULAR_API_KEY").map(ApiKey::new),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn mock() -> Self {
        Self {
            use_mock: true,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Recipe lookups against Spoonacular, backed by the embedded catalog and the
/// fusion synthesizer whenever the API is mocked, unconfigured or failing.
#[derive(Debug, Clone)]
pub(crate) struct RecipeGateway {
    config: SpoonacularConfig,
    client: reqwest::Client,
}

impl RecipeGateway {
    pub fn new(config: SpoonacularConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn api_key(&self) -> Option<&ApiKey> {
        if self.config.use_mock {
            return None;
        }

        if self.config.api_key.is_none() {
            tracing::warn!("Spoonacular API key not found, using mock data");
        }

        self.config.api_key.as_ref()
    }

    #[tracing::instrument(skip(self, cookbook))]
    pub async fn find_recipes(&self, cookbook: &Cookbook, ingredients: &[String]) -> Vec<Recipe> {
        let Some(api_key) = self.api_key() else {
            return cookbook.catalog.matching(ingredients);
        };

        match self.live_find_recipes(api_key, ingredients).await {
            Ok(recipes) => recipes,
            Err(e) => {
                tracing::error!(error = ?e, "Error using Spoonacular API");
                cookbook.catalog.matching(ingredients)
            }
        }
    }

    #[tracing::instrument(skip(self, cookbook))]
    pub async fn get_recipe(&self, cookbook: &Cookbook, recipe_id: i64) -> Option<Recipe> {
        let Some(api_key) = self.api_key() else {
            return cookbook.catalog.get(recipe_id).cloned();
        };

        match self.live_get_recipe(api_key, recipe_id).await {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                tracing::error!(error = ?e, "Error using Spoonacular API");
                cookbook.catalog.get(recipe_id).cloned()
            }
        }
    }

    #[tracing::instrument(skip(self, cookbook))]
    pub async fn fusion_recipe(
        &self,
        cookbook: &Cookbook,
        ingredients: &[String],
        cuisines: &[String],
    ) -> Recipe {
        let Some(api_key) = self.api_key() else {
            return mock_fusion(cookbook, ingredients, cuisines);
        };

        match self.live_fusion(cookbook, api_key, ingredients, cuisines).await {
            Ok(Some(recipe)) => recipe,
            Ok(None) => {
                tracing::warn!("No recipes found for fusion, using mock data");
                mock_fusion(cookbook, ingredients, cuisines)
            }
            Err(e) => {
                tracing::error!(error = ?e, "Error generating fusion recipe");
                mock_fusion(cookbook, ingredients, cuisines)
            }
        }
    }

    async fn live_find_recipes(
        &self,
        api_key: &ApiKey,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>> {
        if ingredients.is_empty() {
            return Ok(vec![]);
        }

        let hits: Vec<IngredientSearchHit> = self
            .client
            .get(format!("{}/recipes/findByIngredients", self.config.base_url))
            .query(&[
                ("apiKey", api_key.expose()),
                ("ingredients", ingredients.join(",").as_str()),
                ("number", "10"),
                ("ranking", "2"),
                ("ignorePantry", "true"),
            ])
            .send()
            .await?
            .error_for_status()
            .wrap_err("findByIngredients returned an error status")?
            .json()
            .await
            .wrap_err("findByIngredients response wasn't the JSON we expected")?;

        let mut recipes = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.live_get_recipe(api_key, hit.id).await {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    tracing::warn!(error = ?e, recipe_id = hit.id, "Skipping recipe without details");
                }
            }
        }

        Ok(recipes)
    }

    async fn live_get_recipe(&self, api_key: &ApiKey, recipe_id: i64) -> Result<Recipe> {
        let information: RecipeInformation = self
            .client
            .get(format!("{}/recipes/{recipe_id}/information", self.config.base_url))
            .query(&[("apiKey", api_key.expose()), ("includeNutrition", "false")])
            .send()
            .await?
            .error_for_status()
            .wrap_err_with(|| format!("Recipe {recipe_id} information returned an error status"))?
            .json()
            .await
            .wrap_err("Recipe information wasn't the JSON we expected")?;

        Ok(information.into())
    }

    async fn live_fusion(
        &self,
        cookbook: &Cookbook,
        api_key: &ApiKey,
        ingredients: &[String],
        cuisines: &[String],
    ) -> Result<Option<Recipe>> {
        let resolved: Vec<String> = cookbook
            .cuisines
            .resolve(cuisines)
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        if resolved.is_empty() {
            return Ok(None);
        }

        let mut sources = vec![];
        for cuisine in &resolved {
            let search: ComplexSearch = self
                .client
                .get(format!("{}/recipes/complexSearch", self.config.base_url))
                .query(&[
                    ("apiKey", api_key.expose()),
                    ("cuisine", cuisine.as_str()),
                    ("includeIngredients", ingredients.join(",").as_str()),
                    ("number", "3"),
                    ("addRecipeInformation", "true"),
                ])
                .send()
                .await?
                .error_for_status()
                .wrap_err_with(|| format!("complexSearch for {cuisine} returned an error status"))?
                .json()
                .await
                .wrap_err("complexSearch response wasn't the JSON we expected")?;

            sources.extend(search.results.into_iter().map(|r| (cuisine.clone(), r)));
        }

        if sources.is_empty() {
            return Ok(None);
        }

        let step_numbers = Regex::new(r"\d+\.")?;
        let mut rng = rand::thread_rng();

        Ok(Some(blend_sources(
            ingredients,
            &resolved,
            &sources,
            &step_numbers,
            &mut rng,
        )))
    }
}

fn mock_fusion(cookbook: &Cookbook, ingredients: &[String], cuisines: &[String]) -> Recipe {
    let mut rng = rand::thread_rng();

    cookbook.cuisines.synthesize(ingredients, cuisines, &mut rng)
}

/// Builds a fusion recipe out of real recipes found for each cuisine.
///
/// Each source contributes up to two of its steps under a heading naming the
/// cuisine it was found for.
fn blend_sources<R: Rng + ?Sized>(
    on_hand: &[String],
    cuisines: &[String],
    sources: &[(String, RecipeInformation)],
    step_numbers: &Regex,
    rng: &mut R,
) -> Recipe {
    let mut ingredients: Vec<String> = vec![];
    for name in sources
        .iter()
        .flat_map(|(_, source)| &source.extended_ingredients)
        .filter_map(|i| i.name.as_ref())
    {
        if !ingredients.contains(name) {
            ingredients.push(name.clone());
        }
    }

    let mut instructions =
        String::from("This fusion recipe combines elements from multiple cuisines:\n\n");
    for (cuisine, source) in sources {
        let Some(text) = &source.instructions else {
            continue;
        };

        let steps: Vec<&str> = step_numbers
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if steps.is_empty() {
            continue;
        }

        instructions.push_str(&format!("From {cuisine} cuisine:\n"));
        for (i, step) in steps.choose_multiple(rng, 2).enumerate() {
            instructions.push_str(&format!("{}. {step}\n", i + 1));
        }
        instructions.push('\n');
    }

    let joined_cuisines = cuisines.join(" and ");

    Recipe {
        id: rng.gen_range(1000..=9999),
        title: fusion_title(on_hand, &joined_cuisines),
        image_url: Some(
            sources
                .first()
                .and_then(|(_, source)| source.image.clone())
                .unwrap_or_else(|| FUSION_IMAGE_URL.to_string()),
        ),
        source_url: Some(FUSION_SOURCE_URL.to_string()),
        servings: Some(4),
        ready_in_minutes: Some(rng.gen_range(30..=60)),
        instructions: Some(instructions.trim_end().to_string()),
        summary: Some(fusion_summary(&joined_cuisines)),
        cuisines: cuisines.to_vec(),
        ingredients,
        is_fusion: true,
    }
}

#[derive(Debug, Deserialize)]
struct IngredientSearchHit {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ComplexSearch {
    #[serde(default)]
    results: Vec<RecipeInformation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipeInformation {
    id: i64,
    title: String,
    image: Option<String>,
    source_url: Option<String>,
    servings: Option<i32>,
    ready_in_minutes: Option<i32>,
    instructions: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    cuisines: Vec<String>,
    #[serde(default)]
    extended_ingredients: Vec<ExtendedIngredient>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ExtendedIngredient {
    name: Option<String>,
}

impl From<RecipeInformation> for Recipe {
    fn from(info: RecipeInformation) -> Self {
        Recipe {
            id: info.id,
            title: info.title,
            image_url: info.image,
            source_url: info.source_url,
            servings: info.servings,
            ready_in_minutes: info.ready_in_minutes,
            instructions: info.instructions,
            summary: info.summary,
            cuisines: info.cuisines,
            ingredients: info
                .extended_ingredients
                .into_iter()
                .filter_map(|i| i.name)
                .collect(),
            is_fusion: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    use super::*;

    fn cookbook() -> Cookbook {
        Cookbook::from_static_dir().unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn information(value: serde_json::Value) -> RecipeInformation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn information_maps_onto_recipe() {
        let recipe: Recipe = information(json!({
            "id": 716429,
            "title": "Pasta with Garlic, Scallions, Cauliflower & Breadcrumbs",
            "image": "https://img.spoonacular.com/recipes/716429-556x370.jpg",
            "sourceUrl": "https://fullbellysisters.blogspot.com/2012/06/pasta.html",
            "servings": 2,
            "readyInMinutes": 45,
            "instructions": "1. Boil pasta. 2. Toss with garlic.",
            "summary": "A quick weeknight pasta.",
            "cuisines": ["Mediterranean", "Italian"],
            "extendedIngredients": [
                { "name": "butter", "amount": 1.0 },
                { "name": "cauliflower florets" },
                { "amount": 2.0 },
            ],
            "vegetarian": false,
        }))
        .into();

        assert_eq!(recipe.id, 716_429);
        assert_eq!(
            recipe.source_url.as_deref(),
            Some("https://fullbellysisters.blogspot.com/2012/06/pasta.html")
        );
        assert_eq!(recipe.ready_in_minutes, Some(45));
        assert_eq!(recipe.cuisines, vec!["Mediterranean", "Italian"]);
        assert_eq!(recipe.ingredients, vec!["butter", "cauliflower florets"]);
        assert!(!recipe.is_fusion);
    }

    #[test]
    fn sources_blend_into_one_recipe() {
        let sources = vec![
            (
                "Italian".to_string(),
                information(json!({
                    "id": 1,
                    "title": "Risotto",
                    "image": "https://img.spoonacular.com/recipes/1.jpg",
                    "instructions": "1. Toast the rice. 2. Add stock slowly.",
                    "extendedIngredients": [{ "name": "rice" }, { "name": "stock" }],
                })),
            ),
            (
                "Mexican".to_string(),
                information(json!({
                    "id": 2,
                    "title": "Arroz rojo",
                    "instructions": null,
                    "extendedIngredients": [{ "name": "rice" }, { "name": "tomato" }],
                })),
            ),
        ];
        let step_numbers = Regex::new(r"\d+\.").unwrap();

        let recipe = blend_sources(
            &strings(&["rice", "beans"]),
            &strings(&["Italian", "Mexican"]),
            &sources,
            &step_numbers,
            &mut StdRng::seed_from_u64(3),
        );

        assert_eq!(recipe.title, "Fusion Rice, Beans (Italian and Mexican Style)");
        assert_eq!(recipe.ingredients, vec!["rice", "stock", "tomato"]);
        assert_eq!(
            recipe.image_url.as_deref(),
            Some("https://img.spoonacular.com/recipes/1.jpg")
        );
        assert!(recipe.is_fusion);
        assert!((30..=60).contains(&recipe.ready_in_minutes.unwrap()));
        assert!((1000..=9999).contains(&recipe.id));

        let instructions = recipe.instructions.unwrap();
        assert!(instructions.starts_with("This fusion recipe combines elements from multiple cuisines:\n\nFrom Italian cuisine:\n"));
        assert!(instructions.contains("Toast the rice."));
        assert!(instructions.contains("Add stock slowly."));
        assert!(!instructions.contains("From Mexican cuisine:"));
    }

    #[tokio::test]
    async fn mock_mode_uses_the_catalog() {
        let gateway = RecipeGateway::new(SpoonacularConfig::mock(), reqwest::Client::new());
        let cookbook = cookbook();

        let found = gateway
            .find_recipes(&cookbook, &strings(&["tomato", "pasta"]))
            .await;
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 5]);

        assert_eq!(
            gateway.get_recipe(&cookbook, 2).await.map(|r| r.title),
            Some("Vegetable Stir Fry".to_string())
        );
        assert!(gateway.get_recipe(&cookbook, 42).await.is_none());
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_the_synthesizer() {
        let config = SpoonacularConfig {
            use_mock: false,
            api_key: None,
            ..SpoonacularConfig::mock()
        };
        let gateway = RecipeGateway::new(config, reqwest::Client::new());

        let recipe = gateway
            .fusion_recipe(
                &cookbook(),
                &strings(&["chicken", "rice"]),
                &strings(&["italian", "mexican"]),
            )
            .await;

        assert!(recipe.is_fusion);
        assert_eq!(recipe.cuisines, vec!["Italian", "Mexican"]);
        assert_eq!(recipe.ingredients[..2], ["chicken", "rice"]);
    }

    fn unreachable_gateway() -> RecipeGateway {
        let config = SpoonacularConfig {
            use_mock: false,
            api_key: Some(ApiKey::new("spoon-key".to_string())),
            base_url: "http://127.0.0.1:1".to_string(),
        };

        RecipeGateway::new(config, reqwest::Client::new())
    }

    #[tokio::test]
    async fn api_failures_fall_back_to_the_catalog() {
        let gateway = unreachable_gateway();
        let cookbook = cookbook();
        let ingredients = strings(&["tomato", "pasta"]);

        let found = gateway.find_recipes(&cookbook, &ingredients).await;
        assert_eq!(found, cookbook.catalog.matching(&ingredients));

        assert_eq!(
            gateway.get_recipe(&cookbook, 3).await.as_ref(),
            cookbook.catalog.get(3)
        );
        assert!(gateway.get_recipe(&cookbook, 42).await.is_none());
    }

    #[tokio::test]
    async fn api_failures_fall_back_to_the_synthesizer() {
        let recipe = unreachable_gateway()
            .fusion_recipe(
                &cookbook(),
                &strings(&["beef", "onion"]),
                &strings(&["Thai", "French"]),
            )
            .await;

        assert!(recipe.is_fusion);
        assert_eq!(recipe.cuisines, vec!["Thai", "French"]);
        assert_eq!(recipe.ingredients[..2], ["beef", "onion"]);
        assert_eq!(recipe.source_url.as_deref(), Some(FUSION_SOURCE_URL));
    }

    #[tokio::test]
    async fn a_failing_hit_is_skipped() {
        use wiremock::{
            matchers::{method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipes/findByIngredients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 11, "title": "Shakshuka" },
                { "id": 12, "title": "Broken" },
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/recipes/11/information"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11,
                "title": "Shakshuka",
                "extendedIngredients": [{ "name": "egg" }, { "name": "tomato" }],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/recipes/12/information"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = SpoonacularConfig {
            use_mock: false,
            api_key: Some(ApiKey::new("spoon-key".to_string())),
            base_url: server.uri(),
        };
        let gateway = RecipeGateway::new(config, reqwest::Client::new());

        let found = gateway
            .find_recipes(&cookbook(), &strings(&["egg", "tomato"]))
            .await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 11);
        assert_eq!(found[0].ingredients, vec!["egg", "tomato"]);
    }
}
