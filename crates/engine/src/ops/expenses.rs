use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Expense, ExpenseFields, ExpenseReport, ResultEngine, expenses,
    validation::{self, parse_date},
};

use super::{Engine, parse_expense_id};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 200;

/// Date filter shared by listing and export.
///
/// Both bounds are inclusive calendar dates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ExpenseFilter {
    /// Builds a filter from optional ISO dates; blank values are ignored.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ResultEngine<Self> {
        let start = start
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_date("startDate", raw))
            .transpose()?;
        let end = end
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_date("endDate", raw))
            .transpose()?;

        let filter = Self { start, end };
        filter.validate()?;
        Ok(filter)
    }

    fn validate(&self) -> ResultEngine<()> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(EngineError::invalid("startDate", "must not be after endDate"));
        }
        Ok(())
    }
}

/// One page of the reverse-chronological expense list.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpensePage {
    pub items: Vec<Expense>,
    /// 1-based page number.
    pub page: u64,
    pub pages: u64,
    /// Number of expenses matching the filter.
    pub total: u64,
    /// Sum of `total` over every matching expense, not only this page.
    pub total_sum: f64,
}

trait ApplyDateFilter: QueryFilter + Sized {
    fn apply_date_filter(self, filter: &ExpenseFilter) -> Self;
}

impl<T> ApplyDateFilter for T
where
    T: QueryFilter + Sized,
{
    fn apply_date_filter(mut self, filter: &ExpenseFilter) -> Self {
        if let Some(start) = filter.start {
            self = self.filter(expenses::Column::Date.gte(start));
        }
        if let Some(end) = filter.end {
            self = self.filter(expenses::Column::Date.lte(end));
        }
        self
    }
}

fn models_into_expenses(models: Vec<expenses::Model>) -> ResultEngine<Vec<Expense>> {
    models.into_iter().map(Expense::try_from).collect()
}

impl Engine {
    /// Validates and stores a new expense.
    ///
    /// The route and client names are recorded as suggestions alongside the
    /// write; a failure there is logged and does not fail the creation.
    pub async fn create_expense(&self, fields: &ExpenseFields) -> ResultEngine<Expense> {
        let values = validation::validate_new(fields)?;
        let expense = Expense::new(values, Utc::now());

        let (saved, ()) = tokio::join!(
            expenses::ActiveModel::from(&expense).insert(&self.database),
            self.ensure_references(&expense),
        );
        saved?;

        tracing::info!(
            "expense {} created: {} -> {} for {}",
            expense.id,
            expense.from_location,
            expense.to_location,
            expense.client_name
        );
        Ok(expense)
    }

    /// Returns a single expense.
    pub async fn expense(&self, id: &str) -> ResultEngine<Expense> {
        let id = parse_expense_id(id)?;
        let model = expenses::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))?;
        Expense::try_from(model)
    }

    /// Replaces the supplied fields of an expense and re-derives its total.
    pub async fn update_expense(&self, id: &str, fields: &ExpenseFields) -> ResultEngine<Expense> {
        let current = self.expense(id).await?;
        let expense_id = current.id;
        let values = validation::apply_update(current.values(), fields)?;
        let expense = current.with_values(values, Utc::now());

        let (saved, ()) = tokio::join!(
            expenses::ActiveModel::from(&expense).update(&self.database),
            self.ensure_references(&expense),
        );
        match saved {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => {
                return Err(EngineError::KeyNotFound(format!("expense {expense_id}")));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!("expense {expense_id} updated");
        Ok(expense)
    }

    /// Permanently removes an expense.
    pub async fn delete_expense(&self, id: &str) -> ResultEngine<()> {
        let id = parse_expense_id(id)?;
        let result = expenses::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("expense {id}")));
        }

        tracing::info!("expense {id} deleted");
        Ok(())
    }

    /// Lists expenses newest first: by date, then creation time, then id.
    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> ResultEngine<Vec<Expense>> {
        filter.validate()?;
        let models = Self::newest_first(filter).all(&self.database).await?;
        models_into_expenses(models)
    }

    /// Lists one page of expenses, newest first.
    ///
    /// `page` is 1-based; `limit` defaults to 20 and is capped at 200.
    pub async fn list_expenses_page(
        &self,
        filter: &ExpenseFilter,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ResultEngine<ExpensePage> {
        filter.validate()?;
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        // the row offset is bound as a signed 64-bit SQL integer
        if (page - 1)
            .checked_mul(limit)
            .is_none_or(|offset| offset > i64::MAX as u64)
        {
            return Err(EngineError::invalid("page", "is too large"));
        }

        let paginator = Self::newest_first(filter).paginate(&self.database, limit);
        let counts = paginator.num_items_and_pages().await?;
        let items = models_into_expenses(paginator.fetch_page(page - 1).await?)?;
        let total_sum = self.total_sum(filter).await?;

        Ok(ExpensePage {
            items,
            page,
            pages: counts.number_of_pages,
            total: counts.number_of_items,
            total_sum,
        })
    }

    /// Lists expenses oldest first, the order reports are written in.
    pub async fn export_expenses(&self, filter: &ExpenseFilter) -> ResultEngine<Vec<Expense>> {
        filter.validate()?;
        let models = expenses::Entity::find()
            .apply_date_filter(filter)
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        models_into_expenses(models)
    }

    /// Renders the filtered expenses into an xlsx workbook.
    pub async fn export_report(
        &self,
        filter: &ExpenseFilter,
        currency_symbol: &str,
    ) -> ResultEngine<Vec<u8>> {
        let expenses = self.export_expenses(filter).await?;
        let report = ExpenseReport::build(&expenses);
        let bytes = report.to_xlsx(currency_symbol)?;
        tracing::info!(
            "exported {} expenses ({} bytes)",
            expenses.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn newest_first(filter: &ExpenseFilter) -> Select<expenses::Entity> {
        expenses::Entity::find()
            .apply_date_filter(filter)
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
    }

    async fn total_sum(&self, filter: &ExpenseFilter) -> ResultEngine<f64> {
        let sum: Option<Option<f64>> = expenses::Entity::find()
            .apply_date_filter(filter)
            .select_only()
            .column_as(Expr::col(expenses::Column::Total).sum(), "total_sum")
            .into_tuple()
            .one(&self.database)
            .await?;
        Ok(sum.flatten().unwrap_or(0.0))
    }
}
