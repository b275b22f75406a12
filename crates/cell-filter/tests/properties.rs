use cell_filter::{CellValueFilter, FilterError, FilterParams};
use model::{
    core::value::Value,
    field::{FieldDescriptor, FieldType},
    filter::{FilterOperator, FilterValue},
};
use planner::query::context::QueryContext;
use tracing_test::traced_test;

fn compile(
    filter: &CellValueFilter,
    field: &FieldDescriptor,
    operator: FilterOperator,
    value: FilterValue,
) -> Result<(String, Vec<Value>), FilterError> {
    let ctx = QueryContext::new("records");
    let condition = filter.compile(&ctx, &FilterParams::new(field, operator, &value))?;
    Ok(condition.into_parts())
}

/// A well-formed operand for `operator` on `field`.
fn operand(field: &FieldDescriptor, operator: FilterOperator, text: &str) -> FilterValue {
    let wants_list = operator.expects_list()
        || (operator == FilterOperator::IsExactly && field.is_json_valued());
    if operator.is_nullary() {
        FilterValue::Null
    } else if wants_list {
        FilterValue::list([text])
    } else {
        match field.field_type {
            FieldType::Checkbox => FilterValue::from(true),
            FieldType::Date => FilterValue::from("2024-05-01"),
            _ => FilterValue::from(text),
        }
    }
}

fn dialects() -> [CellValueFilter; 2] {
    [CellValueFilter::sqlite(), CellValueFilter::postgres()]
}

#[test]
fn does_not_contain_coalesces_null_to_empty_text() {
    let title = FieldDescriptor::new("fldTitle", "title", FieldType::SingleLineText);

    let (sql, params) = compile(
        &CellValueFilter::sqlite(),
        &title,
        FilterOperator::DoesNotContain,
        FilterValue::from("x"),
    )
    .unwrap();

    assert_eq!(sql, r#"ifnull("records"."title", '') not like ?"#);
    assert_eq!(params, vec![Value::from("%x%")]);
}

#[test]
fn like_wildcards_in_operand_are_passed_through() {
    let title = FieldDescriptor::new("fldTitle", "title", FieldType::LongText);

    let (_, params) = compile(
        &CellValueFilter::sqlite(),
        &title,
        FilterOperator::Contains,
        FilterValue::from("50%_off"),
    )
    .unwrap();

    assert_eq!(params, vec![Value::from("%50%_off%")]);
}

#[test]
fn is_not_on_number_binds_a_number() {
    let amount = FieldDescriptor::new("fldAmount", "amount", FieldType::Number);

    for operand in [FilterValue::from(5), FilterValue::from("5")] {
        let (sql, params) = compile(
            &CellValueFilter::sqlite(),
            &amount,
            FilterOperator::IsNot,
            operand,
        )
        .unwrap();

        assert_eq!(sql, r#"ifnull("records"."amount", '') != ?"#);
        assert_eq!(params, vec![Value::Int(5)]);
    }

    let (sql, params) = compile(
        &CellValueFilter::postgres(),
        &amount,
        FilterOperator::IsNot,
        FilterValue::from(5),
    )
    .unwrap();
    assert_eq!(sql, r#""records"."amount" IS DISTINCT FROM ?"#);
    assert_eq!(params, vec![Value::Int(5)]);
}

#[test]
#[traced_test]
fn is_none_of_rejects_empty_and_non_list_operands() {
    let status = FieldDescriptor::new("fldStatus", "status", FieldType::SingleSelect);

    for filter in dialects() {
        for operand in [FilterValue::List(vec![]), FilterValue::Null, FilterValue::from("a")] {
            let err = compile(&filter, &status, FilterOperator::IsNoneOf, operand).unwrap_err();
            assert!(
                matches!(err, FilterError::Validation { .. }),
                "unexpected error: {err}"
            );
        }
    }
}

#[test]
fn is_none_of_binds_one_placeholder_per_item_in_order() {
    let status = FieldDescriptor::new("fldStatus", "status", FieldType::SingleSelect);

    let (sql, params) = compile(
        &CellValueFilter::sqlite(),
        &status,
        FilterOperator::IsNoneOf,
        FilterValue::list(["a", "b"]),
    )
    .unwrap();

    assert_eq!(sql, r#"ifnull("records"."status", '') not in (?, ?)"#);
    assert_eq!(sql.matches('?').count(), 2);
    assert_eq!(params, vec![Value::from("a"), Value::from("b")]);

    // Placeholders are numbered once the condition is rendered into a query.
    let mut ctx = QueryContext::new("records");
    CellValueFilter::postgres()
        .apply(
            &mut ctx,
            &FilterParams::new(
                &status,
                FilterOperator::IsNoneOf,
                &FilterValue::list(["a", "b"]),
            ),
        )
        .unwrap();
    let (sql, params) = ctx.render(&planner::query::dialect::Postgres);
    assert_eq!(
        sql,
        r#"SELECT * FROM "records" WHERE coalesce("records"."status", '') NOT IN ($1, $2)"#
    );
    assert_eq!(params, vec![Value::from("a"), Value::from("b")]);
}

#[test]
fn multi_link_contains_searches_titles_in_the_unnested_view() {
    let projects =
        FieldDescriptor::new("fldProjects", "projects", FieldType::Link).multiple(true);

    let (sql, params) = compile(
        &CellValueFilter::sqlite(),
        &projects,
        FilterOperator::Contains,
        FilterValue::from("launch"),
    )
    .unwrap();

    assert_eq!(
        sql,
        concat!(
            r#"EXISTS (SELECT 1 FROM json_each("records"."projects") "#,
            r#"WHERE json_extract(json_each.value, '$.title') like ?)"#
        )
    );
    assert!(!sql.contains("$.id"));
    assert_eq!(params, vec![Value::from("%launch%")]);
}

#[test]
fn single_link_is_any_of_matches_ids_on_its_own_column() {
    let project = FieldDescriptor::new("fldProject", "project", FieldType::Link);

    let (sql, params) = compile(
        &CellValueFilter::sqlite(),
        &project,
        FilterOperator::IsAnyOf,
        FilterValue::list(["rec1", "rec2"]),
    )
    .unwrap();

    assert_eq!(sql, r#"json_extract("records"."project", '$.id') IN (?, ?)"#);
    assert!(!sql.contains("json_each"));
    assert_eq!(params, vec![Value::from("rec1"), Value::from("rec2")]);
}

#[test]
fn user_fields_always_compare_ids() {
    let owner = FieldDescriptor::new("fldOwner", "owner", FieldType::User);
    let watchers = FieldDescriptor::new("fldWatchers", "watchers", FieldType::User).multiple(true);

    for filter in dialects() {
        for field in [&owner, &watchers] {
            for operator in cell_filter::support::supported_operators(field) {
                let value = operand(field, *operator, "usr1");
                let (sql, _) = compile(&filter, field, *operator, value).unwrap();
                assert!(!sql.contains("title"), "{operator}: {sql}");
                if !operator.is_nullary() {
                    assert!(sql.contains("id"), "{operator}: {sql}");
                }
            }
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    let tags = FieldDescriptor::new("fldTags", "tags", FieldType::MultipleSelect);
    let value = FilterValue::list(["red", "blue", "red"]);

    for filter in dialects() {
        for operator in cell_filter::support::supported_operators(&tags) {
            let value = if operator.is_nullary() {
                FilterValue::Null
            } else {
                value.clone()
            };
            let first = compile(&filter, &tags, *operator, value.clone()).unwrap();
            let second = compile(&filter, &tags, *operator, value).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn every_supported_pair_has_a_handler() {
    let fields = [
        FieldDescriptor::new("a", "a", FieldType::SingleLineText),
        FieldDescriptor::new("b", "b", FieldType::Number),
        FieldDescriptor::new("c", "c", FieldType::Checkbox),
        FieldDescriptor::new("d", "d", FieldType::Date),
        FieldDescriptor::new("e", "e", FieldType::SingleSelect),
        FieldDescriptor::new("f", "f", FieldType::MultipleSelect),
        FieldDescriptor::new("g", "g", FieldType::Link),
        FieldDescriptor::new("h", "h", FieldType::Link).multiple(true),
        FieldDescriptor::new("i", "i", FieldType::User),
        FieldDescriptor::new("j", "j", FieldType::Attachment),
    ];

    for field in &fields {
        for operator in cell_filter::support::supported_operators(field) {
            let value = operand(field, *operator, "1");
            let result = compile(&CellValueFilter::sqlite(), field, *operator, value);
            assert!(result.is_ok(), "{} {operator}: {result:?}", field.field_type);
        }
    }
}
