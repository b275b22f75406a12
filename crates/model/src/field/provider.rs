use crate::field::FieldDescriptor;
use std::collections::HashMap;

/// Supplies field metadata by id. Lookups are synchronous; callers resolve
/// metadata before compiling filters.
pub trait FieldMetadataProvider: Send + Sync {
    fn field(&self, field_id: &str) -> Option<&FieldDescriptor>;
}

/// In-memory provider keyed by field id, preserving declaration order.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
    by_id: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let by_id = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.id.clone(), idx))
            .collect();
        Self { fields, by_id }
    }

    /// Parses a JSON array of field descriptors.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        let fields: Vec<FieldDescriptor> = serde_json::from_str(source)?;
        Ok(Self::new(fields))
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldMetadataProvider for FieldRegistry {
    fn field(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.by_id.get(field_id).and_then(|idx| self.fields.get(*idx))
    }
}
