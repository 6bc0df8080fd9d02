//! Insert-if-absent maintenance of the location and client suggestion lists.

use chrono::Utc;
use sea_orm::{ActiveValue, EntityTrait, sea_query::OnConflict};
use uuid::Uuid;

use crate::{Expense, ResultEngine, clients, locations};

use super::Engine;

impl Engine {
    /// Makes sure a location with exactly this (trimmed) name exists.
    ///
    /// Returns `true` when a new row was written, `false` when the name was
    /// already known. Existing rows are never touched.
    pub async fn ensure_location(&self, name: &str) -> ResultEngine<bool> {
        let active = locations::ActiveModel {
            id: ActiveValue::Set(Uuid::now_v7().to_string()),
            name: ActiveValue::Set(name.trim().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let inserted = locations::Entity::insert(active)
            .on_conflict(
                OnConflict::column(locations::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(inserted > 0)
    }

    /// Makes sure a client with exactly this (trimmed) name exists.
    ///
    /// Same contract as [`Engine::ensure_location`].
    pub async fn ensure_client(&self, name: &str) -> ResultEngine<bool> {
        let active = clients::ActiveModel {
            id: ActiveValue::Set(Uuid::now_v7().to_string()),
            name: ActiveValue::Set(name.trim().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let inserted = clients::Entity::insert(active)
            .on_conflict(
                OnConflict::column(clients::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(inserted > 0)
    }

    /// Records the route and client of `expense` in the suggestion lists.
    ///
    /// Failures are logged and swallowed: the expense itself is already the
    /// source of truth.
    pub(super) async fn ensure_references(&self, expense: &Expense) {
        let (from, to, client) = tokio::join!(
            self.ensure_location(&expense.from_location),
            self.ensure_location(&expense.to_location),
            self.ensure_client(&expense.client_name),
        );

        for (kind, name, result) in [
            ("location", &expense.from_location, from),
            ("location", &expense.to_location, to),
            ("client", &expense.client_name, client),
        ] {
            match result {
                Ok(true) => tracing::debug!("new {kind} recorded: {name}"),
                Ok(false) => {}
                Err(err) => tracing::warn!("failed to record {kind} '{name}': {err}"),
            }
        }
    }
}
