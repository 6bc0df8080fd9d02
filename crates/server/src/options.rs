use api_types::options::OptionsView;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<OptionsView>, ServerError> {
    let options = state.engine.list_options().await?;

    Ok(Json(OptionsView {
        locations: options.locations,
        clients: options.clients,
    }))
}
