use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;

use crate::{ResultEngine, clients, locations};

use super::Engine;

/// Known names offered as suggestions when entering an expense.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceOptions {
    pub locations: Vec<String>,
    pub clients: Vec<String>,
}

impl Engine {
    /// Lists every known location and client, each sorted by name.
    pub async fn list_options(&self) -> ResultEngine<ReferenceOptions> {
        let (locations, clients) = tokio::join!(
            locations::Entity::find()
                .order_by_asc(locations::Column::Name)
                .all(&self.database),
            clients::Entity::find()
                .order_by_asc(clients::Column::Name)
                .all(&self.database),
        );

        Ok(ReferenceOptions {
            locations: locations?.into_iter().map(|model| model.name).collect(),
            clients: clients?.into_iter().map(|model| model.name).collect(),
        })
    }
}
