use std::{fmt::Debug, sync::Arc};

use color_eyre::eyre::Context;
use cookbook::Cookbook;
use db::{
    setup_db_pool, IngredientStore, MemoryIngredients, MemoryRecipes, PgIngredients, PgRecipes,
    RecipeStore,
};
use tracing::instrument;

use crate::{
    http_server::cookies::CookieKey,
    spoonacular::{RecipeGateway, SpoonacularConfig},
    uploads::UploadConfig,
    vision::{VisionConfig, VisionGateway},
    Result,
};

/// Where config values come from. The process environment in production, a
/// fixed map in tests.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads an env var, treating an empty value the same as a missing one.
pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Boolean switches default to on. Only a case-insensitive `true` turns them
/// on when set.
pub(crate) fn flag(lookup: Lookup, key: &str) -> bool {
    lookup(key).map_or(true, |v| v.trim().eq_ignore_ascii_case("true"))
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[omitted]")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub uploads: UploadConfig,
    pub vision: VisionConfig,
    pub spoonacular: SpoonacularConfig,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env", err)]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_var)
    }

    pub(crate) fn from_lookup(lookup: Lookup) -> Result<Self> {
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port: u16 = port
            .parse()
            .wrap_err_with(|| format!("PORT should be a port number, got {port}"))?;

        Ok(Self {
            port,
            // sqlx accepts both the postgres:// and postgresql:// schemes
            database_url: lookup("DATABASE_URL"),
            uploads: UploadConfig::from_lookup(lookup)?,
            vision: VisionConfig::from_lookup(lookup),
            spoonacular: SpoonacularConfig::from_lookup(lookup),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub cookbook: Arc<Cookbook>,
    pub ingredients: Arc<dyn IngredientStore>,
    pub saved_recipes: Arc<dyn RecipeStore>,
    pub vision: VisionGateway,
    pub recipes: RecipeGateway,
    pub cookie_key: CookieKey,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> Result<Self> {
        let app = AppConfig::from_env()?;
        let cookbook = Cookbook::from_static_dir()?;

        let (ingredients, saved_recipes): (Arc<dyn IngredientStore>, Arc<dyn RecipeStore>) =
            if let Some(database_url) = &app.database_url {
                let pool = setup_db_pool(database_url).await?;

                (
                    Arc::new(PgIngredients(pool.clone())),
                    Arc::new(PgRecipes(pool)),
                )
            } else {
                tracing::warn!("DATABASE_URL not set, ingredients will only live in memory");

                (
                    Arc::new(MemoryIngredients::default()),
                    Arc::new(MemoryRecipes::default()),
                )
            };

        tokio::fs::create_dir_all(&app.uploads.folder)
            .await
            .wrap_err_with(|| {
                format!(
                    "Couldn't create the upload folder {}",
                    app.uploads.folder.display()
                )
            })?;

        let cookie_key = CookieKey::from_env_or_generate()?;

        Ok(Self::new(
            app,
            cookbook,
            ingredients,
            saved_recipes,
            cookie_key,
        ))
    }

    pub fn new(
        app: AppConfig,
        cookbook: Cookbook,
        ingredients: Arc<dyn IngredientStore>,
        saved_recipes: Arc<dyn RecipeStore>,
        cookie_key: CookieKey,
    ) -> Self {
        let client = reqwest::Client::new();

        Self {
            vision: VisionGateway::new(app.vision.clone(), client.clone()),
            recipes: RecipeGateway::new(app.spoonacular.clone(), client),
            app,
            cookbook: Arc::new(cookbook),
            ingredients,
            saved_recipes,
            cookie_key,
        }
    }
}
