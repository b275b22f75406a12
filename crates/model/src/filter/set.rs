use crate::filter::{operator::FilterOperator, value::FilterValue};
use serde::{Deserialize, Serialize};

/// One typed predicate: a field, an operator and its operand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    pub field_id: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: FilterValue,
}

impl FilterItem {
    pub fn new(field_id: &str, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field_id: field_id.to_string(),
            operator,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterNode {
    Item(FilterItem),
    Set(FilterSet),
}

/// A group of filter nodes joined by one conjunction. Nodes are kept in
/// document order, which is also the order their parameters bind in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterSet {
    #[serde(default)]
    pub conjunction: Conjunction,
    #[serde(default)]
    pub filter_set: Vec<FilterNode>,
}

impl FilterSet {
    pub fn and(nodes: Vec<FilterNode>) -> Self {
        Self {
            conjunction: Conjunction::And,
            filter_set: nodes,
        }
    }

    pub fn or(nodes: Vec<FilterNode>) -> Self {
        Self {
            conjunction: Conjunction::Or,
            filter_set: nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filter_set.is_empty()
    }

    /// Iterates the items of the tree depth-first, in document order.
    pub fn items(&self) -> Vec<&FilterItem> {
        let mut items = Vec::new();
        collect_items(self, &mut items);
        items
    }
}

fn collect_items<'a>(set: &'a FilterSet, out: &mut Vec<&'a FilterItem>) {
    for node in &set.filter_set {
        match node {
            FilterNode::Item(item) => out.push(item),
            FilterNode::Set(child) => collect_items(child, out),
        }
    }
}

impl From<FilterItem> for FilterNode {
    fn from(item: FilterItem) -> Self {
        FilterNode::Item(item)
    }
}

impl From<FilterSet> for FilterNode {
    fn from(set: FilterSet) -> Self {
        FilterNode::Set(set)
    }
}

#[cfg(test)]
mod tests {
    use super::{Conjunction, FilterNode, FilterSet};
    use crate::filter::{operator::FilterOperator, value::FilterValue};

    #[test]
    fn test_deserialize_nested_filter_set() {
        let set: FilterSet = serde_json::from_str(
            r#"{
                "conjunction": "or",
                "filterSet": [
                    {"fieldId": "fldName", "operator": "contains", "value": "acme"},
                    {
                        "conjunction": "and",
                        "filterSet": [
                            {"fieldId": "fldStatus", "operator": "isNoneOf",
                             "value": ["done", "archived"]},
                            {"fieldId": "fldOwner", "operator": "isEmpty"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(set.conjunction, Conjunction::Or);
        assert!(matches!(set.filter_set[1], FilterNode::Set(_)));

        let items = set.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].operator, FilterOperator::IsNoneOf);
        assert_eq!(items[2].value, FilterValue::Null);
    }

    #[test]
    fn test_item_with_unknown_operator_is_not_read_as_empty_set() {
        let result = serde_json::from_str::<FilterNode>(
            r#"{"fieldId": "fldName", "operator": "isSimilarTo", "value": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_conjunction_defaults_to_and() {
        let set: FilterSet = serde_json::from_str(r#"{"filterSet": []}"#).unwrap();
        assert_eq!(set.conjunction, Conjunction::And);
        assert!(set.is_empty());
    }
}
