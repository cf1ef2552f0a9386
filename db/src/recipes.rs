use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use cookbook::Recipe;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;

/// A recipe someone chose to keep, usually a fusion recipe that would
/// otherwise be gone after the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedRecipe {
    pub recipe_id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub servings: Option<i32>,
    pub ready_in_minutes: Option<i32>,
    pub instructions: Option<String>,
    pub summary: Option<String>,
    pub cuisines: Vec<String>,
    pub ingredients: Vec<String>,
    pub is_fusion: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedRecipe {
    fn new(recipe: &Recipe, created_at: DateTime<Utc>) -> Self {
        Self {
            recipe_id: recipe.id,
            title: recipe.title.clone(),
            image_url: recipe.image_url.clone(),
            source_url: recipe.source_url.clone(),
            servings: recipe.servings,
            ready_in_minutes: recipe.ready_in_minutes,
            instructions: recipe.instructions.clone(),
            summary: recipe.summary.clone(),
            cuisines: recipe.cuisines.clone(),
            ingredients: recipe.ingredients.clone(),
            is_fusion: recipe.is_fusion,
            created_at,
        }
    }
}

impl From<SavedRecipe> for Recipe {
    fn from(saved: SavedRecipe) -> Self {
        Recipe {
            id: saved.recipe_id,
            title: saved.title,
            image_url: saved.image_url,
            source_url: saved.source_url,
            servings: saved.servings,
            ready_in_minutes: saved.ready_in_minutes,
            instructions: saved.instructions,
            summary: saved.summary,
            cuisines: saved.cuisines,
            ingredients: saved.ingredients,
            is_fusion: saved.is_fusion,
        }
    }
}

#[async_trait]
pub trait RecipeStore: std::fmt::Debug + Send + Sync {
    /// Stores the recipe under its own id. Saving an id twice is an error.
    async fn save(&self, recipe: &Recipe) -> Result<SavedRecipe>;

    async fn get(&self, recipe_id: i64) -> Result<Option<SavedRecipe>>;

    async fn list(&self) -> Result<Vec<SavedRecipe>>;
}

#[derive(Debug, Clone)]
pub struct PgRecipes(pub PgPool);

const RECIPE_COLUMNS: &str = "recipe_id, title, image_url, source_url, servings, ready_in_minutes, instructions, summary, cuisines, ingredients, is_fusion, created_at";

#[async_trait]
impl RecipeStore for PgRecipes {
    #[tracing::instrument(err, skip(self, recipe), fields(recipe_id = recipe.id))]
    async fn save(&self, recipe: &Recipe) -> Result<SavedRecipe> {
        let saved = sqlx::query_as::<_, SavedRecipe>(&format!(
            "
            INSERT INTO recipes (recipe_id, title, image_url, source_url, servings, ready_in_minutes, instructions, summary, cuisines, ingredients, is_fusion)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.image_url)
        .bind(&recipe.source_url)
        .bind(recipe.servings)
        .bind(recipe.ready_in_minutes)
        .bind(&recipe.instructions)
        .bind(&recipe.summary)
        .bind(&recipe.cuisines)
        .bind(&recipe.ingredients)
        .bind(recipe.is_fusion)
        .fetch_one(&self.0)
        .await?;

        Ok(saved)
    }

    #[tracing::instrument(err, skip(self))]
    async fn get(&self, recipe_id: i64) -> Result<Option<SavedRecipe>> {
        let saved = sqlx::query_as::<_, SavedRecipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE recipe_id = $1"
        ))
        .bind(recipe_id)
        .fetch_optional(&self.0)
        .await?;

        Ok(saved)
    }

    #[tracing::instrument(err, skip(self))]
    async fn list(&self) -> Result<Vec<SavedRecipe>> {
        let saved = sqlx::query_as::<_, SavedRecipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY created_at DESC"
        ))
        .fetch_all(&self.0)
        .await?;

        Ok(saved)
    }
}

#[derive(Debug, Default)]
pub struct MemoryRecipes {
    rows: RwLock<Vec<SavedRecipe>>,
}

#[async_trait]
impl RecipeStore for MemoryRecipes {
    async fn save(&self, recipe: &Recipe) -> Result<SavedRecipe> {
        let mut rows = self.rows.write().await;

        if rows.iter().any(|r| r.recipe_id == recipe.id) {
            return Err(eyre!("Recipe {} is already saved", recipe.id));
        }

        let saved = SavedRecipe::new(recipe, Utc::now());
        rows.push(saved.clone());

        Ok(saved)
    }

    async fn get(&self, recipe_id: i64) -> Result<Option<SavedRecipe>> {
        let rows = self.rows.read().await;

        Ok(rows.iter().find(|r| r.recipe_id == recipe_id).cloned())
    }

    async fn list(&self) -> Result<Vec<SavedRecipe>> {
        let mut rows = self.rows.read().await.clone();
        rows.reverse();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fusion() -> Recipe {
        Recipe {
            id: 4321,
            title: "Fusion Chicken, Rice, Pasta (Italian and Mexican Style)".to_string(),
            image_url: Some("https://spoonacular.com/recipeImages/fusion-recipe.jpg".to_string()),
            source_url: None,
            servings: Some(4),
            ready_in_minutes: Some(35),
            instructions: Some("1. Prepare all ingredients.\n2. Serve.".to_string()),
            summary: None,
            cuisines: vec!["Italian".to_string(), "Mexican".to_string()],
            ingredients: vec!["chicken".to_string(), "rice".to_string()],
            is_fusion: true,
        }
    }

    async fn exercise_store(store: &dyn RecipeStore) {
        let recipe = fusion();

        let saved = store.save(&recipe).await.unwrap();
        assert_eq!(Recipe::from(saved.clone()), recipe);

        let fetched = store.get(recipe.id).await.unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(Recipe::from(fetched), recipe);

        assert!(store.save(&recipe).await.is_err());
        assert!(store.get(1).await.unwrap().is_none());

        let mut second = fusion();
        second.id = 4322;
        store.save(&second).await.unwrap();

        let ids: Vec<i64> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.recipe_id)
            .collect();
        assert_eq!(ids, vec![4322, 4321]);
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        exercise_store(&MemoryRecipes::default()).await;
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn postgres_store_round_trips(pool: PgPool) {
        exercise_store(&PgRecipes(pool)).await;
    }
}
