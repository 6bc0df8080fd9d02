use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod expense {
    use super::*;

    /// A numeric field as clients send it: either a JSON number or a string
    /// such as `"12.5"`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Numeric {
        Number(f64),
        Text(String),
    }

    /// Request body for creating or updating an expense.
    ///
    /// Every field is optional at this level; the server decides which are
    /// required. `null` and a missing key are the same thing.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseBody {
        pub date: Option<String>,
        pub from_location: Option<String>,
        pub to_location: Option<String>,
        pub client_name: Option<String>,
        pub kilometers: Option<Numeric>,
        pub rate_per_km: Option<Numeric>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: Uuid,
        /// Calendar date, `YYYY-MM-DD`.
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

    /// Query string of the list and export endpoints.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        /// 1-based page; asking for a page switches the response to
        /// [`ExpensePageView`].
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    impl ExpenseQuery {
        pub fn is_paginated(&self) -> bool {
            self.page.is_some() || self.limit.is_some()
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpensePageView {
        pub items: Vec<ExpenseView>,
        pub page: u64,
        pub pages: u64,
        pub total: u64,
        pub total_sum: f64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Deleted {
        pub success: bool,
    }
}

pub mod options {
    use super::*;

    /// Suggestion lists, each sorted alphabetically.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OptionsView {
        pub locations: Vec<String>,
        pub clients: Vec<String>,
    }
}

pub mod health {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}
