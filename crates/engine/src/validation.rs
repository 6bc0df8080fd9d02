//! Field validation and derivation for expense records.
//!
//! Everything here is pure: callers hand in the raw fields, get back either a
//! fully checked [`ExpenseValues`] (with `total` already derived) or the
//! [`EngineError`] describing the first offending field.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_RATE_PER_KM: f64 = 3.0;

const MAX_KILOMETERS: f64 = 100_000.0;
const MAX_RATE_PER_KM: f64 = 1_000_000.0;
const MAX_TOTAL: f64 = 100_000_000.0;

const MIN_NAME_LEN: usize = 2;
const MAX_LOCATION_LEN: usize = 120;
const MAX_CLIENT_LEN: usize = 160;

/// A number as it arrives from a client: either already numeric or a string
/// still to be parsed.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

/// Raw expense fields.
///
/// On create every field but `rate_per_km` is required. On update only the
/// supplied fields replace the stored ones. A `None` or an empty string means
/// "not supplied".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseFields {
    pub date: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub client_name: Option<String>,
    pub kilometers: Option<NumericInput>,
    pub rate_per_km: Option<NumericInput>,
}

/// Checked values ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ExpenseValues {
    pub date: NaiveDate,
    pub from_location: String,
    pub to_location: String,
    pub client_name: String,
    pub kilometers: f64,
    pub rate_per_km: f64,
    pub total: f64,
}

/// Computes `kilometers × rate_per_km` rounded to two decimal places.
pub fn derive_total(kilometers: f64, rate_per_km: f64) -> f64 {
    (kilometers * rate_per_km * 100.0).round() / 100.0
}

/// Validates the fields of a new expense.
pub(crate) fn validate_new(fields: &ExpenseFields) -> ResultEngine<ExpenseValues> {
    let date = supplied(fields.date.as_deref());
    let from_location = supplied(fields.from_location.as_deref());
    let to_location = supplied(fields.to_location.as_deref());
    let client_name = supplied(fields.client_name.as_deref());
    let kilometers = supplied_number(fields.kilometers.as_ref());

    let (Some(date), Some(from_location), Some(to_location), Some(client_name), Some(kilometers)) =
        (date, from_location, to_location, client_name, kilometers)
    else {
        let missing: Vec<&str> = [
            ("date", date.is_none()),
            ("fromLocation", from_location.is_none()),
            ("toLocation", to_location.is_none()),
            ("clientName", client_name.is_none()),
            ("kilometers", kilometers.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();
        return Err(EngineError::MissingFields(missing.join(", ")));
    };

    let rate_per_km = match supplied_number(fields.rate_per_km.as_ref()) {
        Some(rate) => coerce_number("ratePerKm", rate)?,
        None => DEFAULT_RATE_PER_KM,
    };

    finish(ExpenseValues {
        date: parse_date("date", date)?,
        from_location: from_location.trim().to_string(),
        to_location: to_location.trim().to_string(),
        client_name: client_name.trim().to_string(),
        kilometers: coerce_number("kilometers", kilometers)?,
        rate_per_km,
        total: 0.0,
    })
}

/// Applies the supplied fields on top of `current` and re-derives `total`.
pub(crate) fn apply_update(
    current: ExpenseValues,
    fields: &ExpenseFields,
) -> ResultEngine<ExpenseValues> {
    let mut next = current;

    if let Some(date) = supplied(fields.date.as_deref()) {
        next.date = parse_date("date", date)?;
    }
    if let Some(name) = supplied(fields.from_location.as_deref()) {
        next.from_location = name.trim().to_string();
    }
    if let Some(name) = supplied(fields.to_location.as_deref()) {
        next.to_location = name.trim().to_string();
    }
    if let Some(name) = supplied(fields.client_name.as_deref()) {
        next.client_name = name.trim().to_string();
    }
    if let Some(kilometers) = supplied_number(fields.kilometers.as_ref()) {
        next.kilometers = coerce_number("kilometers", kilometers)?;
    }
    if let Some(rate) = supplied_number(fields.rate_per_km.as_ref()) {
        next.rate_per_km = coerce_number("ratePerKm", rate)?;
    }

    finish(next)
}

/// Parses a calendar date given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp (its UTC date is used).
pub(crate) fn parse_date(field: &'static str, raw: &str) -> ResultEngine<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| EngineError::invalid(field, format!("'{raw}' is not a valid date")))
}

fn finish(mut values: ExpenseValues) -> ResultEngine<ExpenseValues> {
    check_len("fromLocation", &values.from_location, MAX_LOCATION_LEN)?;
    check_len("toLocation", &values.to_location, MAX_LOCATION_LEN)?;
    check_len("clientName", &values.client_name, MAX_CLIENT_LEN)?;
    check_range("kilometers", values.kilometers, MAX_KILOMETERS)?;
    check_range("ratePerKm", values.rate_per_km, MAX_RATE_PER_KM)?;

    values.total = derive_total(values.kilometers, values.rate_per_km);
    check_range("total", values.total, MAX_TOTAL)?;
    Ok(values)
}

fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn supplied_number(value: Option<&NumericInput>) -> Option<&NumericInput> {
    value.filter(|v| !matches!(v, NumericInput::Text(text) if text.trim().is_empty()))
}

fn coerce_number(field: &'static str, input: &NumericInput) -> ResultEngine<f64> {
    let value = match input {
        NumericInput::Number(value) => *value,
        NumericInput::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| EngineError::invalid(field, format!("'{text}' is not a number")))?,
    };
    if !value.is_finite() {
        return Err(EngineError::invalid(field, "must be a finite number"));
    }
    Ok(value)
}

fn check_len(field: &'static str, value: &str, max: usize) -> ResultEngine<()> {
    let len = value.chars().count();
    if !(MIN_NAME_LEN..=max).contains(&len) {
        return Err(EngineError::invalid(
            field,
            format!("length must be between {MIN_NAME_LEN} and {max} characters"),
        ));
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, max: f64) -> ResultEngine<()> {
    if !(0.0..=max).contains(&value) {
        return Err(EngineError::invalid(field, format!("must be between 0 and {max}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ExpenseFields {
        ExpenseFields {
            date: Some("2024-01-15".to_string()),
            from_location: Some("  Pune ".to_string()),
            to_location: Some("Mumbai".to_string()),
            client_name: Some("Acme".to_string()),
            kilometers: Some(NumericInput::Number(12.5)),
            rate_per_km: None,
        }
    }

    #[test]
    fn total_is_rounded_to_cents() {
        assert_eq!(derive_total(12.5, 3.0), 37.5);
        assert_eq!(derive_total(10.333, 3.0), 31.0);
        assert_eq!(derive_total(1.234, 3.0), 3.7);
        assert_eq!(derive_total(0.0, 8.0), 0.0);
    }

    #[test]
    fn new_expense_trims_names_and_defaults_rate() {
        let values = validate_new(&fields()).unwrap();
        assert_eq!(values.from_location, "Pune");
        assert_eq!(values.rate_per_km, DEFAULT_RATE_PER_KM);
        assert_eq!(values.total, 37.5);
        assert_eq!(values.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let mut input = fields();
        input.kilometers = Some(NumericInput::Text("20".to_string()));
        input.rate_per_km = Some(NumericInput::Text(" 4.5 ".to_string()));
        let values = validate_new(&input).unwrap();
        assert_eq!(values.kilometers, 20.0);
        assert_eq!(values.total, 90.0);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let input = ExpenseFields {
            date: Some(String::new()),
            to_location: Some("Mumbai".to_string()),
            client_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let err = validate_new(&input).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingFields("date, fromLocation, kilometers".to_string())
        );
    }

    #[test]
    fn zero_kilometers_is_not_missing() {
        let mut input = fields();
        input.kilometers = Some(NumericInput::Number(0.0));
        assert_eq!(validate_new(&input).unwrap().total, 0.0);
    }

    #[test]
    fn out_of_bounds_values_name_the_field() {
        let mut input = fields();
        input.kilometers = Some(NumericInput::Number(100_000.5));
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation {
                field: "kilometers",
                ..
            })
        ));

        let mut input = fields();
        input.rate_per_km = Some(NumericInput::Number(-1.0));
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation {
                field: "ratePerKm",
                ..
            })
        ));

        let mut input = fields();
        input.client_name = Some(" A ".to_string());
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation {
                field: "clientName",
                ..
            })
        ));

        let mut input = fields();
        input.to_location = Some("x".repeat(121));
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation {
                field: "toLocation",
                ..
            })
        ));
    }

    #[test]
    fn total_above_bound_is_rejected() {
        let mut input = fields();
        input.kilometers = Some(NumericInput::Number(100_000.0));
        input.rate_per_km = Some(NumericInput::Number(1_001.0));
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation { field: "total", .. })
        ));
    }

    #[test]
    fn garbage_numbers_and_dates_are_rejected() {
        let mut input = fields();
        input.kilometers = Some(NumericInput::Text("twelve".to_string()));
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation {
                field: "kilometers",
                ..
            })
        ));

        let mut input = fields();
        input.date = Some("15/01/2024".to_string());
        assert!(matches!(
            validate_new(&input),
            Err(EngineError::Validation { field: "date", .. })
        ));
    }

    #[test]
    fn timestamps_use_their_utc_date() {
        assert_eq!(
            parse_date("date", "2024-03-01T23:30:00-02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn update_keeps_unsupplied_fields_and_rederives_total() {
        let current = validate_new(&ExpenseFields {
            rate_per_km: Some(NumericInput::Number(5.0)),
            ..fields()
        })
        .unwrap();

        let next = apply_update(
            current.clone(),
            &ExpenseFields {
                kilometers: Some(NumericInput::Number(40.0)),
                client_name: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(next.rate_per_km, 5.0);
        assert_eq!(next.client_name, current.client_name);
        assert_eq!(next.total, 200.0);

        let next = apply_update(
            next,
            &ExpenseFields {
                rate_per_km: Some(NumericInput::Number(2.25)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(next.total, 90.0);
    }
}
