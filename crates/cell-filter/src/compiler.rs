//! The shared operator core: one handler per [`FilterOperator`].

use crate::{
    CompiledCondition,
    dialect::{
        FilterDialect, placeholders, postgres::PostgresFilterDialect, sqlite::SqliteFilterDialect,
    },
    error::FilterError,
    operand::{self, DayRange},
    support,
};
use chrono_tz::Tz;
use model::{
    core::value::Value,
    field::{CellValueType, FieldDescriptor},
    filter::{FilterOperator, FilterValue},
};
use planner::query::context::QueryContext;
use std::fmt;
use tracing::debug;

/// One filter to compile: the target field, the operator and its operand.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams<'a> {
    pub field: &'a FieldDescriptor,
    pub operator: FilterOperator,
    pub value: &'a FilterValue,
}

impl<'a> FilterParams<'a> {
    pub fn new(
        field: &'a FieldDescriptor,
        operator: FilterOperator,
        value: &'a FilterValue,
    ) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }
}

/// SQL text with `?` markers and the values they bind, before validation
/// into a [`CompiledCondition`].
type Handled = Result<(String, Vec<Value>), FilterError>;

/// How a field's cells are stored, which decides the SQL each handler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellShape {
    Scalar,
    Date,
    /// One JSON object per cell (single link or user).
    JsonSingle,
    /// A JSON array per cell, tested element by element.
    JsonMulti,
}

impl CellShape {
    fn of(field: &FieldDescriptor) -> Self {
        if field.is_multiple() {
            CellShape::JsonMulti
        } else if field.is_json_object() {
            CellShape::JsonSingle
        } else if field.cell_value_type == CellValueType::DateTime {
            CellShape::Date
        } else {
            CellShape::Scalar
        }
    }
}

/// Compiles cell-value filters for one SQL dialect.
///
/// Compilation is pure: the query context is only read, for the table
/// qualifier, until [`CellValueFilter::apply`] attaches the result.
pub struct CellValueFilter {
    dialect: Box<dyn FilterDialect>,
    time_zone: Tz,
}

impl fmt::Debug for CellValueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellValueFilter")
            .field("dialect", &self.dialect.name())
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

impl CellValueFilter {
    pub fn new(dialect: impl FilterDialect + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
            time_zone: chrono_tz::UTC,
        }
    }

    pub fn sqlite() -> Self {
        Self::new(SqliteFilterDialect::new())
    }

    pub fn postgres() -> Self {
        Self::new(PostgresFilterDialect::new())
    }

    /// Date operands name calendar days in this zone.
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn dialect(&self) -> &dyn FilterDialect {
        self.dialect.as_ref()
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Compiles one filter into a parameterized condition.
    pub fn compile(
        &self,
        ctx: &QueryContext,
        params: &FilterParams<'_>,
    ) -> Result<CompiledCondition, FilterError> {
        if !support::is_supported(params.field, params.operator) {
            return Err(unsupported(params));
        }

        let (sql, values) = match params.operator {
            FilterOperator::Is => self.is(ctx, params)?,
            FilterOperator::IsNot => self.is_not(ctx, params)?,
            FilterOperator::Contains => self.contains(ctx, params)?,
            FilterOperator::DoesNotContain => self.does_not_contain(ctx, params)?,
            FilterOperator::IsGreater => self.compare(ctx, params, ">")?,
            FilterOperator::IsGreaterEqual => self.compare(ctx, params, ">=")?,
            FilterOperator::IsLess => self.compare(ctx, params, "<")?,
            FilterOperator::IsLessEqual => self.compare(ctx, params, "<=")?,
            FilterOperator::IsEmpty => self.is_empty(ctx, params, true)?,
            FilterOperator::IsNotEmpty => self.is_empty(ctx, params, false)?,
            FilterOperator::IsAnyOf | FilterOperator::HasAnyOf => self.is_any_of(ctx, params)?,
            FilterOperator::IsNoneOf | FilterOperator::HasNoneOf => {
                self.is_none_of(ctx, params)?
            }
            FilterOperator::HasAllOf => self.has_all_of(ctx, params)?,
            FilterOperator::IsExactly => self.is_exactly(ctx, params)?,
            FilterOperator::IsBefore => self.date_bound(ctx, params, "<", |day| day.start)?,
            FilterOperator::IsAfter => self.date_bound(ctx, params, ">=", |day| day.end)?,
            FilterOperator::IsOnOrBefore => self.date_bound(ctx, params, "<", |day| day.end)?,
            FilterOperator::IsOnOrAfter => self.date_bound(ctx, params, ">=", |day| day.start)?,
        };

        let condition = CompiledCondition::new(sql, values)?;
        debug!(
            dialect = %self.dialect.name(),
            field = %params.field.id,
            operator = %params.operator,
            params = condition.params().len(),
            "compiled filter"
        );
        Ok(condition)
    }

    /// Compiles one filter and attaches it to `ctx`.
    pub fn apply<'c>(
        &self,
        ctx: &'c mut QueryContext,
        params: &FilterParams<'_>,
    ) -> Result<&'c mut QueryContext, FilterError> {
        let condition = self.compile(ctx, params)?;
        Ok(ctx.where_condition(condition))
    }

    fn column(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> String {
        self.dialect.resolve_db_column_reference(ctx, params.field)
    }

    fn json(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> String {
        self.dialect
            .resolve_json_column_reference(ctx, params.field, params.operator)
    }

    /// `EXISTS (SELECT 1 FROM <unnest> WHERE <predicate>)` over the field's
    /// JSON array.
    fn exists(&self, ctx: &QueryContext, params: &FilterParams<'_>, predicate: &str) -> String {
        format!(
            "EXISTS (SELECT 1 FROM {} WHERE {predicate})",
            self.dialect.unnest_json_array(&self.column(ctx, params))
        )
    }

    fn scalar(&self, params: &FilterParams<'_>) -> Result<Value, FilterError> {
        let literal = operand::expect_literal(params)?;
        operand::coerce(params, literal, params.field.cell_value_type)
    }

    fn json_scalar(&self, params: &FilterParams<'_>) -> Result<Value, FilterError> {
        operand::coerce_json(params, operand::expect_literal(params)?)
    }

    fn day(&self, params: &FilterParams<'_>) -> Result<DayRange, FilterError> {
        operand::day_range(params, operand::expect_literal(params)?, self.time_zone)
    }

    fn is(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        match CellShape::of(params.field) {
            CellShape::Scalar => {
                let column = self.column(ctx, params);
                let value = self.scalar(params)?;
                // An unset checkbox is stored as NULL.
                let sql = if value == Value::Boolean(false) {
                    format!("({column} IS NULL OR {column} = ?)")
                } else {
                    format!("{column} = ?")
                };
                Ok((sql, vec![value]))
            }
            CellShape::Date => self.within_day(ctx, params),
            CellShape::JsonSingle => Ok((
                format!("{} = ?", self.json(ctx, params)),
                vec![self.json_scalar(params)?],
            )),
            CellShape::JsonMulti => {
                let predicate = format!("{} = ?", self.json(ctx, params));
                Ok((
                    self.exists(ctx, params, &predicate),
                    vec![self.json_scalar(params)?],
                ))
            }
        }
    }

    fn is_not(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        match CellShape::of(params.field) {
            CellShape::Scalar => Ok((
                self.dialect
                    .is_not_condition(&self.column(ctx, params), params.field.cell_value_type),
                vec![self.scalar(params)?],
            )),
            CellShape::Date => {
                let column = self.column(ctx, params);
                let day = self.day(params)?;
                Ok((
                    format!("({column} IS NULL OR {column} < ? OR {column} >= ?)"),
                    vec![Value::Timestamp(day.start), Value::Timestamp(day.end)],
                ))
            }
            CellShape::JsonSingle => Ok((
                self.dialect
                    .is_not_condition(&self.json(ctx, params), CellValueType::String),
                vec![self.json_scalar(params)?],
            )),
            CellShape::JsonMulti => {
                let predicate = format!("{} = ?", self.json(ctx, params));
                Ok((
                    format!("NOT {}", self.exists(ctx, params, &predicate)),
                    vec![self.json_scalar(params)?],
                ))
            }
        }
    }

    fn contains(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        let pattern = operand::like_pattern(operand::expect_literal(params)?);
        let like = self.dialect.like_operator();
        let sql = match CellShape::of(params.field) {
            CellShape::Scalar | CellShape::Date => {
                format!("{} {like} ?", self.column(ctx, params))
            }
            CellShape::JsonSingle => format!("{} {like} ?", self.json(ctx, params)),
            CellShape::JsonMulti => {
                let predicate = format!("{} {like} ?", self.json(ctx, params));
                self.exists(ctx, params, &predicate)
            }
        };
        Ok((sql, vec![pattern]))
    }

    fn does_not_contain(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        let pattern = operand::like_pattern(operand::expect_literal(params)?);
        let sql = match CellShape::of(params.field) {
            CellShape::Scalar | CellShape::Date => self
                .dialect
                .does_not_contain_condition(&self.column(ctx, params)),
            CellShape::JsonSingle => self
                .dialect
                .does_not_contain_condition(&self.json(ctx, params)),
            CellShape::JsonMulti => {
                let predicate = format!(
                    "{} {} ?",
                    self.json(ctx, params),
                    self.dialect.like_operator()
                );
                format!("NOT {}", self.exists(ctx, params, &predicate))
            }
        };
        Ok((sql, vec![pattern]))
    }

    fn compare(&self, ctx: &QueryContext, params: &FilterParams<'_>, op: &str) -> Handled {
        match CellShape::of(params.field) {
            CellShape::Scalar => {
                let literal = operand::expect_literal(params)?;
                let value = operand::to_number(literal).ok_or_else(|| {
                    operand::invalid(params, format!("{literal} is not a number"))
                })?;
                Ok((format!("{} {op} ?", self.column(ctx, params)), vec![value]))
            }
            // Ordering on a date compares whole days.
            CellShape::Date => match op {
                ">" => self.date_bound(ctx, params, ">=", |day| day.end),
                ">=" => self.date_bound(ctx, params, ">=", |day| day.start),
                "<" => self.date_bound(ctx, params, "<", |day| day.start),
                _ => self.date_bound(ctx, params, "<", |day| day.end),
            },
            CellShape::JsonSingle | CellShape::JsonMulti => Err(unsupported(params)),
        }
    }

    fn is_empty(&self, ctx: &QueryContext, params: &FilterParams<'_>, empty: bool) -> Handled {
        operand::expect_null(params)?;
        let column = self.column(ctx, params);
        let sql = match CellShape::of(params.field) {
            CellShape::Scalar if params.field.cell_value_type == CellValueType::String => {
                let op = if empty { "=" } else { "!=" };
                format!("{} {op} ''", self.dialect.coalesce_empty(&column))
            }
            CellShape::Scalar | CellShape::Date | CellShape::JsonSingle => {
                let test = if empty { "IS NULL" } else { "IS NOT NULL" };
                format!("{column} {test}")
            }
            CellShape::JsonMulti => {
                let op = if empty { "=" } else { ">" };
                format!(
                    "coalesce({}, 0) {op} 0",
                    self.dialect.json_array_length(&column)
                )
            }
        };
        Ok((sql, Vec::new()))
    }

    fn list(&self, params: &FilterParams<'_>) -> Result<Vec<Value>, FilterError> {
        let items = operand::expect_list(params)?;
        match CellShape::of(params.field) {
            CellShape::JsonSingle | CellShape::JsonMulti => {
                operand::coerce_list(params, items, operand::coerce_json)
            }
            CellShape::Scalar | CellShape::Date => {
                operand::coerce_list(params, items, |params, literal| {
                    operand::coerce(params, literal, params.field.cell_value_type)
                })
            }
        }
    }

    fn is_any_of(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        let values = self.list(params)?;
        let marks = placeholders(values.len());
        let sql = match CellShape::of(params.field) {
            CellShape::Scalar | CellShape::Date => {
                format!("{} IN ({marks})", self.column(ctx, params))
            }
            CellShape::JsonSingle => format!("{} IN ({marks})", self.json(ctx, params)),
            CellShape::JsonMulti => {
                let predicate = format!("{} IN ({marks})", self.json(ctx, params));
                self.exists(ctx, params, &predicate)
            }
        };
        Ok((sql, values))
    }

    fn is_none_of(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        let values = self.list(params)?;
        let marks = placeholders(values.len());
        let sql = match CellShape::of(params.field) {
            CellShape::Scalar | CellShape::Date => self.dialect.is_none_of_condition(
                &self.column(ctx, params),
                params.field.cell_value_type,
                &marks,
            ),
            CellShape::JsonSingle => self.dialect.is_none_of_condition(
                &self.json(ctx, params),
                CellValueType::String,
                &marks,
            ),
            CellShape::JsonMulti => {
                let predicate = format!("{} IN ({marks})", self.json(ctx, params));
                format!("NOT {}", self.exists(ctx, params, &predicate))
            }
        };
        Ok((sql, values))
    }

    /// Counts the distinct operand values present in the cell's array.
    fn has_all_of(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        if CellShape::of(params.field) != CellShape::JsonMulti {
            return Err(unsupported(params));
        }

        let mut values = self.list(params)?;
        let expected = operand::distinct_count(&values);
        let json = self.json(ctx, params);
        let sql = format!(
            "(SELECT COUNT(DISTINCT {json}) FROM {} WHERE {json} IN ({})) = ?",
            self.dialect.unnest_json_array(&self.column(ctx, params)),
            placeholders(values.len())
        );
        values.push(Value::Int(expected));
        Ok((sql, values))
    }

    fn is_exactly(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        match CellShape::of(params.field) {
            CellShape::Date => self.within_day(ctx, params),
            CellShape::JsonMulti => {
                let expected = operand::distinct_count(&self.list(params)?);
                let (all_of, all_of_values) = self.has_all_of(ctx, params)?;
                let json = self.json(ctx, params);
                let sql = format!(
                    "(SELECT COUNT(DISTINCT {json}) FROM {}) = ? AND {all_of}",
                    self.dialect.unnest_json_array(&self.column(ctx, params)),
                );

                let mut values = Vec::with_capacity(all_of_values.len() + 1);
                values.push(Value::Int(expected));
                values.extend(all_of_values);
                Ok((sql, values))
            }
            CellShape::Scalar | CellShape::JsonSingle => Err(unsupported(params)),
        }
    }

    fn within_day(&self, ctx: &QueryContext, params: &FilterParams<'_>) -> Handled {
        let column = self.column(ctx, params);
        let day = self.day(params)?;
        Ok((
            format!("{column} >= ? AND {column} < ?"),
            vec![Value::Timestamp(day.start), Value::Timestamp(day.end)],
        ))
    }

    fn date_bound(
        &self,
        ctx: &QueryContext,
        params: &FilterParams<'_>,
        op: &str,
        bound: fn(&DayRange) -> chrono::DateTime<chrono::Utc>,
    ) -> Handled {
        if CellShape::of(params.field) != CellShape::Date {
            return Err(unsupported(params));
        }
        let day = self.day(params)?;
        Ok((
            format!("{} {op} ?", self.column(ctx, params)),
            vec![Value::Timestamp(bound(&day))],
        ))
    }
}

fn unsupported(params: &FilterParams<'_>) -> FilterError {
    FilterError::UnsupportedOperator {
        operator: params.operator,
        field_type: params.field.field_type,
        field: params.field.id.clone(),
    }
}
