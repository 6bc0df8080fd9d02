//! Expense records.
//!
//! An `Expense` is one trip: a date, a route, the client it was made for and
//! the distance travelled. `total` is always derived from `kilometers` and
//! `rate_per_km`; see [`crate::derive_total`].

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, validation::ExpenseValues};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub from_location: String,
    pub to_location: String,
    pub client_name: String,
    pub kilometers: f64,
    pub rate_per_km: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub(crate) fn new(values: ExpenseValues, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            date: values.date,
            from_location: values.from_location,
            to_location: values.to_location,
            client_name: values.client_name,
            kilometers: values.kilometers,
            rate_per_km: values.rate_per_km,
            total: values.total,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every user-supplied field, keeping id and creation time.
    pub(crate) fn with_values(self, values: ExpenseValues, now: DateTime<Utc>) -> Self {
        Self {
            date: values.date,
            from_location: values.from_location,
            to_location: values.to_location,
            client_name: values.client_name,
            kilometers: values.kilometers,
            rate_per_km: values.rate_per_km,
            total: values.total,
            updated_at: now,
            ..self
        }
    }

    pub(crate) fn values(&self) -> ExpenseValues {
        ExpenseValues {
            date: self.date,
            from_location: self.from_location.clone(),
            to_location: self.to_location.clone(),
            client_name: self.client_name.clone(),
            kilometers: self.kilometers,
            rate_per_km: self.rate_per_km,
            total: self.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: Date,
    pub from_location: String,
    pub to_location: String,
    pub client_name: String,
    pub kilometers: f64,
    pub rate_per_km: f64,
    pub total: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            date: ActiveValue::Set(expense.date),
            from_location: ActiveValue::Set(expense.from_location.clone()),
            to_location: ActiveValue::Set(expense.to_location.clone()),
            client_name: ActiveValue::Set(expense.client_name.clone()),
            kilometers: ActiveValue::Set(expense.kilometers),
            rate_per_km: ActiveValue::Set(expense.rate_per_km),
            total: ActiveValue::Set(expense.total),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            date: model.date,
            from_location: model.from_location,
            to_location: model.to_location,
            client_name: model.client_name,
            kilometers: model.kilometers,
            rate_per_km: model.rate_per_km,
            total: model.total,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
