//! Shape checks and type coercion for filter operands.

use crate::{compiler::FilterParams, error::FilterError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use model::{
    core::value::Value,
    field::CellValueType,
    filter::{FilterValue, Literal},
};

/// A calendar day in the filter's time zone, as a half-open UTC interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn invalid(params: &FilterParams<'_>, reason: impl Into<String>) -> FilterError {
    FilterError::Validation {
        operator: params.operator,
        field: params.field.id.clone(),
        reason: reason.into(),
    }
}

/// `isEmpty`-style operators take no operand.
pub fn expect_null(params: &FilterParams<'_>) -> Result<(), FilterError> {
    match params.value {
        FilterValue::Null => Ok(()),
        other => Err(invalid(
            params,
            format!("expected no value, found a {}", other.kind()),
        )),
    }
}

pub fn expect_literal<'a>(params: &FilterParams<'a>) -> Result<&'a Literal, FilterError> {
    match params.value {
        FilterValue::Literal(literal) => Ok(literal),
        other => Err(invalid(
            params,
            format!("expected a single value, found a {}", other.kind()),
        )),
    }
}

/// List operators need a non-empty list of literals. A lone scalar is not
/// promoted to a one-element list.
pub fn expect_list<'a>(params: &FilterParams<'a>) -> Result<&'a [Literal], FilterError> {
    match params.value {
        FilterValue::List(items) if items.is_empty() => {
            Err(invalid(params, "expected a non-empty list of values"))
        }
        FilterValue::List(items) => Ok(items),
        other => Err(invalid(
            params,
            format!("expected a list of values, found a {}", other.kind()),
        )),
    }
}

/// Parses a literal as a number. Integral values, including floats such as
/// `1.0`, bind as integers so that `1` and `1.0` are one distinct value.
pub fn to_number(literal: &Literal) -> Option<Value> {
    let value = match literal {
        Literal::Number(_) => literal.to_value(),
        Literal::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| s.parse::<f64>().map(Value::Float))
                .ok()?
        }
        Literal::Bool(_) => return None,
    };

    match value {
        Value::Float(f) if !f.is_finite() => None,
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(Value::Int(f as i64))
        }
        other => Some(other),
    }
}

fn to_bool(literal: &Literal) -> Option<bool> {
    match literal {
        Literal::Bool(b) => Some(*b),
        Literal::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Literal::Number(_) => None,
    }
}

/// Coerces a literal to the bound value for a column of `cell_value_type`.
pub fn coerce(
    params: &FilterParams<'_>,
    literal: &Literal,
    cell_value_type: CellValueType,
) -> Result<Value, FilterError> {
    match cell_value_type {
        CellValueType::Number => to_number(literal)
            .ok_or_else(|| invalid(params, format!("{literal} is not a number"))),
        CellValueType::Boolean => to_bool(literal)
            .map(Value::Boolean)
            .ok_or_else(|| invalid(params, format!("{literal} is not a boolean"))),
        CellValueType::String | CellValueType::DateTime => Ok(Value::String(literal.to_text())),
    }
}

/// Coerces a literal compared against a JSON cell. Link and user cells are
/// matched by their text ids; plain arrays keep the field's cell type.
pub fn coerce_json(params: &FilterParams<'_>, literal: &Literal) -> Result<Value, FilterError> {
    if params.field.is_json_object() {
        Ok(Value::String(literal.to_text()))
    } else {
        coerce(params, literal, params.field.cell_value_type)
    }
}

pub fn coerce_list(
    params: &FilterParams<'_>,
    items: &[Literal],
    coerce_one: impl Fn(&FilterParams<'_>, &Literal) -> Result<Value, FilterError>,
) -> Result<Vec<Value>, FilterError> {
    items.iter().map(|item| coerce_one(params, item)).collect()
}

/// Wraps the operand in `%` wildcards for a substring match. Wildcards the
/// operand already contains are passed through unescaped.
pub fn like_pattern(literal: &Literal) -> Value {
    Value::String(format!("%{}%", literal.to_text()))
}

/// Number of distinct coerced values, used by set-equality operators.
pub fn distinct_count(values: &[Value]) -> i64 {
    let mut seen: Vec<&Value> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.len() as i64
}

/// Resolves a date operand (`YYYY-MM-DD` or RFC 3339) to the calendar day it
/// names in `tz`.
pub fn day_range(
    params: &FilterParams<'_>,
    literal: &Literal,
    tz: Tz,
) -> Result<DayRange, FilterError> {
    let text = match literal {
        Literal::String(s) => s.trim(),
        other => return Err(invalid(params, format!("{other} is not a date"))),
    };

    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&tz).date_naive())
        })
        .ok_or_else(|| invalid(params, format!("{text:?} is not an ISO-8601 date")))?;

    let next = day
        .succ_opt()
        .ok_or_else(|| invalid(params, format!("{day} is out of range")))?;

    Ok(DayRange {
        start: start_of_day(params, day, tz)?,
        end: start_of_day(params, next, tz)?,
    })
}

fn start_of_day(
    params: &FilterParams<'_>,
    day: NaiveDate,
    tz: Tz,
) -> Result<DateTime<Utc>, FilterError> {
    let midnight: NaiveDateTime = day.and_time(chrono::NaiveTime::MIN);
    // Zones that skip midnight for daylight saving start the day an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| invalid(params, format!("{day} has no midnight in {tz}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::{
        field::{FieldDescriptor, FieldType},
        filter::FilterOperator,
    };

    fn params<'a>(field: &'a FieldDescriptor, value: &'a FilterValue) -> FilterParams<'a> {
        FilterParams {
            field,
            operator: FilterOperator::IsNoneOf,
            value,
        }
    }

    #[test]
    fn test_expect_list_rejects_empty_and_scalar() {
        let field = FieldDescriptor::new("fldStatus", "status", FieldType::SingleSelect);

        let empty = FilterValue::List(vec![]);
        let err = expect_list(&params(&field, &empty)).unwrap_err();
        assert!(err.is_validation());

        let scalar = FilterValue::from("done");
        assert!(expect_list(&params(&field, &scalar)).is_err());

        let list = FilterValue::list(["a", "b"]);
        assert_eq!(expect_list(&params(&field, &list)).unwrap().len(), 2);
    }

    #[test]
    fn test_number_coercion() {
        let field = FieldDescriptor::new("fldAmount", "amount", FieldType::Number);
        let value = FilterValue::Null;
        let p = params(&field, &value);

        assert_eq!(
            coerce(&p, &Literal::from(5), CellValueType::Number).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            coerce(&p, &Literal::from("5"), CellValueType::Number).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            coerce(&p, &Literal::from(" 2.5 "), CellValueType::Number).unwrap(),
            Value::Float(2.5)
        );
        assert!(coerce(&p, &Literal::from("five"), CellValueType::Number).is_err());
        assert!(coerce(&p, &Literal::from("NaN"), CellValueType::Number).is_err());
    }

    #[test]
    fn test_text_coercion_renders_literals_as_text() {
        let field = FieldDescriptor::new("fldName", "name", FieldType::SingleLineText);
        let value = FilterValue::Null;
        let p = params(&field, &value);

        assert_eq!(
            coerce(&p, &Literal::from(5), CellValueType::String).unwrap(),
            Value::from("5")
        );
        assert_eq!(
            coerce(&p, &Literal::from(true), CellValueType::String).unwrap(),
            Value::from("true")
        );
    }

    #[test]
    fn test_day_range_in_utc() {
        let field = FieldDescriptor::new("fldDue", "due", FieldType::Date);
        let value = FilterValue::Null;
        let p = params(&field, &value);

        let range = day_range(&p, &Literal::from("2024-02-28"), chrono_tz::UTC).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_range_follows_time_zone() {
        let field = FieldDescriptor::new("fldDue", "due", FieldType::Date);
        let value = FilterValue::Null;
        let p = params(&field, &value);

        // 23:30 UTC on the 1st is already the 2nd in Tokyo.
        let range = day_range(
            &p,
            &Literal::from("2024-06-01T23:30:00Z"),
            chrono_tz::Asia::Tokyo,
        )
        .unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_day_range_rejects_garbage() {
        let field = FieldDescriptor::new("fldDue", "due", FieldType::Date);
        let value = FilterValue::Null;
        let p = params(&field, &value);

        assert!(day_range(&p, &Literal::from("yesterday"), chrono_tz::UTC).is_err());
        assert!(day_range(&p, &Literal::from(20240101), chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_distinct_count() {
        let values = vec![Value::from("a"), Value::from("b"), Value::from("a")];
        assert_eq!(distinct_count(&values), 2);
    }

    #[test]
    fn test_integral_floats_bind_as_integers() {
        let one_point_zero: Literal = serde_json::from_str("1.0").unwrap();
        assert_eq!(to_number(&one_point_zero), Some(Value::Int(1)));
        assert_eq!(to_number(&Literal::from("1.0")), Some(Value::Int(1)));
        assert_eq!(to_number(&Literal::from("-3e2")), Some(Value::Int(-300)));
        assert_eq!(to_number(&Literal::from("1.5")), Some(Value::Float(1.5)));
        assert_eq!(to_number(&Literal::from("inf")), None);

        let field = FieldDescriptor::new("fldScores", "scores", FieldType::Formula)
            .with_cell_value_type(CellValueType::Number)
            .multiple(true);
        let value = FilterValue::List(vec![Literal::from(1), one_point_zero, Literal::from("1")]);
        let p = params(&field, &value);
        let values = coerce_list(&p, expect_list(&p).unwrap(), coerce_json).unwrap();
        assert_eq!(distinct_count(&values), 1);
    }
}
