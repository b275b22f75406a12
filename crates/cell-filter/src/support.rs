//! Which operators each kind of field accepts.

use model::{
    field::{CellValueType, FieldDescriptor, FieldType},
    filter::FilterOperator::{self, *},
};

const TEXT: &[FilterOperator] = &[Is, IsNot, Contains, DoesNotContain, IsEmpty, IsNotEmpty];

const NUMBER: &[FilterOperator] = &[
    Is,
    IsNot,
    IsGreater,
    IsGreaterEqual,
    IsLess,
    IsLessEqual,
    IsEmpty,
    IsNotEmpty,
];

const BOOLEAN: &[FilterOperator] = &[Is];

const DATE: &[FilterOperator] = &[
    Is,
    IsNot,
    IsExactly,
    IsBefore,
    IsAfter,
    IsOnOrBefore,
    IsOnOrAfter,
    IsEmpty,
    IsNotEmpty,
];

const SELECT: &[FilterOperator] = &[Is, IsNot, IsAnyOf, IsNoneOf, IsEmpty, IsNotEmpty];

const MULTIPLE: &[FilterOperator] = &[
    HasAnyOf, HasAllOf, HasNoneOf, IsExactly, IsEmpty, IsNotEmpty,
];

const LINK: &[FilterOperator] = &[
    Is,
    IsNot,
    IsAnyOf,
    IsNoneOf,
    IsEmpty,
    IsNotEmpty,
    Contains,
    DoesNotContain,
];

const LINK_MULTIPLE: &[FilterOperator] = &[
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsExactly,
    IsEmpty,
    IsNotEmpty,
    Contains,
    DoesNotContain,
];

const ATTACHMENT: &[FilterOperator] = &[IsEmpty, IsNotEmpty];

/// The operators a filter on `field` may use.
pub fn supported_operators(field: &FieldDescriptor) -> &'static [FilterOperator] {
    let multiple = field.is_multiple();
    match field.field_type {
        FieldType::Link if multiple => LINK_MULTIPLE,
        FieldType::Link => LINK,
        FieldType::User | FieldType::MultipleSelect if multiple => MULTIPLE,
        FieldType::User | FieldType::SingleSelect => SELECT,
        FieldType::Attachment => ATTACHMENT,
        _ if multiple => MULTIPLE,
        _ => match field.cell_value_type {
            CellValueType::String => TEXT,
            CellValueType::Number => NUMBER,
            CellValueType::Boolean => BOOLEAN,
            CellValueType::DateTime => DATE,
        },
    }
}

pub fn is_supported(field: &FieldDescriptor, operator: FilterOperator) -> bool {
    supported_operators(field).contains(&operator)
}
