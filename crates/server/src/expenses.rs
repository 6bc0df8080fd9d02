//! Expenses API endpoints

use api_types::expense::{Deleted, ExpenseBody, ExpensePageView, ExpenseQuery, ExpenseView, Numeric};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use engine::{Expense, ExpenseFields, ExpenseFilter, NumericInput};

use crate::{ServerError, server::ServerState};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLSX_DISPOSITION: &str = "attachment; filename=expenses.xlsx";

fn map_numeric(value: Numeric) -> NumericInput {
    match value {
        Numeric::Number(n) => NumericInput::Number(n),
        Numeric::Text(s) => NumericInput::Text(s),
    }
}

fn map_fields(body: ExpenseBody) -> ExpenseFields {
    ExpenseFields {
        date: body.date,
        from_location: body.from_location,
        to_location: body.to_location,
        client_name: body.client_name,
        kilometers: body.kilometers.map(map_numeric),
        rate_per_km: body.rate_per_km.map(map_numeric),
    }
}

fn map_expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        date: expense.date,
        from_location: expense.from_location,
        to_location: expense.to_location,
        client_name: expense.client_name,
        kilometers: expense.kilometers,
        rate_per_km: expense.rate_per_km,
        total: expense.total,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

fn body_or_400(
    payload: Result<Json<ExpenseBody>, JsonRejection>,
) -> Result<ExpenseBody, ServerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServerError::Generic(rejection.body_text()))
}

fn query_or_400(
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<ExpenseQuery, ServerError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ServerError::Generic(rejection.body_text()))
}

fn filter_of(query: &ExpenseQuery) -> Result<ExpenseFilter, ServerError> {
    Ok(ExpenseFilter::parse(query.start_date.as_deref(), query.end_date.as_deref())?)
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let fields = map_fields(body_or_400(payload)?);
    let expense = state.engine.create_expense(&fields).await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<Response, ServerError> {
    let query = query_or_400(query)?;
    let filter = filter_of(&query)?;

    if !query.is_paginated() {
        let expenses = state.engine.list_expenses(&filter).await?;
        let items: Vec<ExpenseView> = expenses.into_iter().map(map_expense).collect();
        return Ok(Json(items).into_response());
    }

    let page = state
        .engine
        .list_expenses_page(&filter, query.page, query.limit)
        .await?;

    Ok(Json(ExpensePageView {
        items: page.items.into_iter().map(map_expense).collect(),
        page: page.page,
        pages: page.pages,
        total: page.total,
        total_sum: page.total_sum,
    })
    .into_response())
}

pub async fn export(
    State(state): State<ServerState>,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<Response, ServerError> {
    let query = query_or_400(query)?;
    let filter = filter_of(&query)?;
    let bytes = state
        .engine
        .export_report(&filter, &state.currency_symbol)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, XLSX_DISPOSITION),
        ],
        bytes,
    )
        .into_response())
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(&id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ExpenseBody>, JsonRejection>,
) -> Result<Json<ExpenseView>, ServerError> {
    let fields = map_fields(body_or_400(payload)?);
    let expense = state.engine.update_expense(&id, &fields).await?;

    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ServerError> {
    state.engine.delete_expense(&id).await?;
    Ok(Json(Deleted { success: true }))
}
