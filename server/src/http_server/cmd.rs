use tracing::info;

use crate::{
    http_server::{routes, run_server},
    AppState, Result,
};

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env().await?;
    let port = app_state.app.port;
    let max_content_length = app_state.app.uploads.max_content_length;

    info!(
        mock_vision = app_state.app.vision.use_mock,
        mock_recipes = app_state.app.spoonacular.use_mock,
        "Starting FridgeToPlate"
    );

    run_server(
        routes::make_router(max_content_length).with_state(app_state),
        port,
    )
    .await?;

    info!("Main Returning");

    Ok(())
}
