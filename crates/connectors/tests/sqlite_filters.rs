use cell_filter::{CellValueFilter, FilterParams, FilterTranslator};
use connectors::sql::{
    base::source::RecordSource,
    sqlite::{adapter::SqliteAdapter, params::timestamp_text},
};
use model::{
    core::value::Value,
    field::{CellValueType, FieldDescriptor, FieldType, provider::FieldRegistry},
    filter::{FilterItem, FilterNode, FilterOperator, FilterSet, FilterValue},
};
use planner::query::{ast::common::OrderDir, context::QueryContext, qualified_ident};
use tracing_test::traced_test;

const SCHEMA: &str = r#"
CREATE TABLE tasks (
    id INTEGER PRIMARY KEY,
    title TEXT,
    amount INTEGER,
    status TEXT,
    done BOOLEAN,
    due TEXT,
    tags TEXT,
    projects TEXT,
    owner TEXT,
    files TEXT
);
INSERT INTO tasks VALUES
    (1, 'Draft budget', 5, 'todo', 1, '2024-03-01T10:00:00.000Z',
     '["red","blue"]', '[{"id":"rec1","title":"Launch plan"}]',
     '{"id":"usr1","title":"Ada"}', '[{"name":"a.pdf"}]'),
    (2, 'Ship release', 7, 'done', 0, '2024-03-02T08:30:00.000Z',
     '["red"]', '[{"id":"rec2","title":"Roadmap"}]',
     '{"id":"usr2","title":"Grace"}', '[]'),
    (3, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL),
    (4, 'Review', 5, '', 0, '2024-02-29T23:59:59.999Z',
     '["blue","red","red"]', '[]', NULL, NULL);
"#;

fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("fldTitle", "title", FieldType::SingleLineText),
        FieldDescriptor::new("fldAmount", "amount", FieldType::Number),
        FieldDescriptor::new("fldStatus", "status", FieldType::SingleSelect),
        FieldDescriptor::new("fldDone", "done", FieldType::Checkbox),
        FieldDescriptor::new("fldDue", "due", FieldType::Date),
        FieldDescriptor::new("fldTags", "tags", FieldType::MultipleSelect),
        FieldDescriptor::new("fldProjects", "projects", FieldType::Link).multiple(true),
        FieldDescriptor::new("fldOwner", "owner", FieldType::User),
        FieldDescriptor::new("fldFiles", "files", FieldType::Attachment),
    ]
}

async fn adapter() -> SqliteAdapter {
    let adapter = SqliteAdapter::connect("sqlite::memory:").await.unwrap();
    adapter.execute(SCHEMA).await.unwrap();
    adapter
}

/// Ids of the rows matching one filter, in id order.
async fn matching_ids(
    adapter: &SqliteAdapter,
    field_id: &str,
    operator: FilterOperator,
    value: FilterValue,
) -> Vec<i64> {
    let fields = fields();
    let field = fields.iter().find(|f| f.id == field_id).unwrap();

    let mut ctx = QueryContext::new("tasks");
    ctx.select(vec![qualified_ident("tasks", "id")])
        .order_by(qualified_ident("tasks", "id"), Some(OrderDir::Asc));
    CellValueFilter::sqlite()
        .apply(&mut ctx, &FilterParams::new(field, operator, &value))
        .unwrap();

    ids(adapter.fetch_rows(&ctx).await.unwrap())
}

fn ids(rows: Vec<model::records::row::RowData>) -> Vec<i64> {
    rows.iter()
        .map(|row| match row.get_value("id") {
            Value::Int(id) => id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

#[tokio::test]
#[traced_test]
async fn does_not_contain_includes_null_rows() {
    let adapter = adapter().await;
    let ids = matching_ids(
        &adapter,
        "fldTitle",
        FilterOperator::DoesNotContain,
        FilterValue::from("budget"),
    )
    .await;
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
#[traced_test]
async fn is_not_number_includes_null_rows() {
    let adapter = adapter().await;
    let ids =
        matching_ids(&adapter, "fldAmount", FilterOperator::IsNot, FilterValue::from(5)).await;
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn is_none_of_treats_null_as_empty_text() {
    let adapter = adapter().await;

    let ids = matching_ids(
        &adapter,
        "fldStatus",
        FilterOperator::IsNoneOf,
        FilterValue::list(["done", "todo"]),
    )
    .await;
    assert_eq!(ids, vec![3, 4]);

    // NULL and '' are the same value for membership.
    let ids = matching_ids(
        &adapter,
        "fldStatus",
        FilterOperator::IsNoneOf,
        FilterValue::list([""]),
    )
    .await;
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn empty_text_matches_null_and_blank() {
    let adapter = adapter().await;
    let ids = matching_ids(&adapter, "fldStatus", FilterOperator::IsEmpty, FilterValue::Null).await;
    assert_eq!(ids, vec![3, 4]);
}

#[tokio::test]
async fn unchecked_checkbox_matches_null() {
    let adapter = adapter().await;
    let ids = matching_ids(&adapter, "fldDone", FilterOperator::Is, FilterValue::from(false)).await;
    assert_eq!(ids, vec![2, 3, 4]);

    let ids = matching_ids(&adapter, "fldDone", FilterOperator::Is, FilterValue::from(true)).await;
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn date_operators_compare_whole_days() {
    let adapter = adapter().await;

    let ids =
        matching_ids(&adapter, "fldDue", FilterOperator::Is, FilterValue::from("2024-03-01")).await;
    assert_eq!(ids, vec![1]);

    let ids = matching_ids(
        &adapter,
        "fldDue",
        FilterOperator::IsOnOrAfter,
        FilterValue::from("2024-03-01"),
    )
    .await;
    assert_eq!(ids, vec![1, 2]);

    let ids = matching_ids(
        &adapter,
        "fldDue",
        FilterOperator::IsBefore,
        FilterValue::from("2024-03-01"),
    )
    .await;
    assert_eq!(ids, vec![4]);

    let ids = matching_ids(
        &adapter,
        "fldDue",
        FilterOperator::IsNot,
        FilterValue::from("2024-03-01"),
    )
    .await;
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
async fn multi_value_set_operators() {
    let adapter = adapter().await;

    let ids = matching_ids(
        &adapter,
        "fldTags",
        FilterOperator::HasAnyOf,
        FilterValue::list(["blue"]),
    )
    .await;
    assert_eq!(ids, vec![1, 4]);

    let ids = matching_ids(
        &adapter,
        "fldTags",
        FilterOperator::HasNoneOf,
        FilterValue::list(["blue"]),
    )
    .await;
    assert_eq!(ids, vec![2, 3]);

    let ids = matching_ids(
        &adapter,
        "fldTags",
        FilterOperator::HasAllOf,
        FilterValue::list(["red", "blue"]),
    )
    .await;
    assert_eq!(ids, vec![1, 4]);

    let ids = matching_ids(
        &adapter,
        "fldTags",
        FilterOperator::IsExactly,
        FilterValue::list(["blue", "red"]),
    )
    .await;
    assert_eq!(ids, vec![1, 4]);

    let ids = matching_ids(
        &adapter,
        "fldTags",
        FilterOperator::IsExactly,
        FilterValue::list(["red"]),
    )
    .await;
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn links_users_and_attachments_read_json_cells() {
    let adapter = adapter().await;

    let ids = matching_ids(
        &adapter,
        "fldProjects",
        FilterOperator::Contains,
        FilterValue::from("launch"),
    )
    .await;
    assert_eq!(ids, vec![1]);

    let ids = matching_ids(
        &adapter,
        "fldProjects",
        FilterOperator::HasAnyOf,
        FilterValue::list(["rec2", "rec9"]),
    )
    .await;
    assert_eq!(ids, vec![2]);

    let ids =
        matching_ids(&adapter, "fldOwner", FilterOperator::IsNot, FilterValue::from("usr1")).await;
    assert_eq!(ids, vec![2, 3, 4]);

    let ids = matching_ids(&adapter, "fldFiles", FilterOperator::IsEmpty, FilterValue::Null).await;
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
#[traced_test]
async fn translated_tree_binds_parameters_in_document_order() {
    let adapter = adapter().await;
    let registry = FieldRegistry::new(fields());
    let filter = CellValueFilter::sqlite();
    let translator = FilterTranslator::new(&filter, &registry);

    let tree = FilterSet::or(vec![
        FilterItem::new("fldTitle", FilterOperator::Contains, FilterValue::from("ship")).into(),
        FilterNode::Set(FilterSet::and(vec![
            FilterItem::new("fldAmount", FilterOperator::IsLessEqual, FilterValue::from(5)).into(),
            FilterItem::new("fldTags", FilterOperator::HasAnyOf, FilterValue::list(["blue"]))
                .into(),
        ])),
    ]);

    let mut ctx = QueryContext::new("tasks").with_alias("t");
    ctx.order_by(qualified_ident("t", "id"), Some(OrderDir::Desc));
    translator.translate(&mut ctx, &tree).unwrap();

    let rows = adapter.fetch_rows(&ctx).await.unwrap();
    assert_eq!(ids(rows.clone()), vec![4, 2, 1]);

    // JSON cells decode as JSON; timestamps stay in their stored text form.
    let first = rows.last().unwrap();
    assert_eq!(
        first.get_value("tags"),
        Value::Json(serde_json::json!(["red", "blue"]))
    );
    assert_eq!(
        first.get_value("due"),
        Value::String(timestamp_text(
            &chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
                .unwrap()
                .to_utc()
        ))
    );
}

#[tokio::test]
async fn numeric_arrays_treat_integral_floats_as_integers() {
    let adapter = adapter().await;
    adapter
        .execute(
            "CREATE TABLE scores (id INTEGER PRIMARY KEY, points TEXT);
             INSERT INTO scores VALUES (1, '[1, 2]'), (2, '[1.0]'), (3, '[2]');",
        )
        .await
        .unwrap();
    let points = FieldDescriptor::new("fldPoints", "points", FieldType::Formula)
        .with_cell_value_type(CellValueType::Number)
        .multiple(true);

    let run = |operator: FilterOperator, value: FilterValue| {
        let mut ctx = QueryContext::new("scores");
        ctx.select(vec![qualified_ident("scores", "id")])
            .order_by(qualified_ident("scores", "id"), Some(OrderDir::Asc));
        CellValueFilter::sqlite()
            .apply(&mut ctx, &FilterParams::new(&points, operator, &value))
            .unwrap();
        ctx
    };

    let one_and_one: FilterValue = serde_json::from_str("[1, 1.0]").unwrap();
    let ctx = run(FilterOperator::HasAllOf, one_and_one.clone());
    assert_eq!(ids(adapter.fetch_rows(&ctx).await.unwrap()), vec![1, 2]);

    let ctx = run(FilterOperator::IsExactly, one_and_one);
    assert_eq!(ids(adapter.fetch_rows(&ctx).await.unwrap()), vec![2]);

    let ctx = run(FilterOperator::IsExactly, FilterValue::list(["1.0", "2"]));
    assert_eq!(ids(adapter.fetch_rows(&ctx).await.unwrap()), vec![1]);
}
