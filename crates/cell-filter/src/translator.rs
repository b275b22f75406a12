//! Folds a filter tree into one condition on the query.

use crate::{
    CompiledCondition,
    compiler::{CellValueFilter, FilterParams},
    error::FilterError,
};
use model::{
    field::provider::FieldMetadataProvider,
    filter::{Conjunction, FilterItem, FilterNode, FilterSet},
};
use planner::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr},
    context::QueryContext,
};
use tracing::{debug, warn};

/// Resolves each item's field through a metadata provider and compiles the
/// tree with one [`CellValueFilter`].
pub struct FilterTranslator<'a> {
    filter: &'a CellValueFilter,
    fields: &'a dyn FieldMetadataProvider,
}

impl<'a> FilterTranslator<'a> {
    pub fn new(filter: &'a CellValueFilter, fields: &'a dyn FieldMetadataProvider) -> Self {
        Self { filter, fields }
    }

    /// Compiles `set` in document order and attaches it to `ctx` as one
    /// condition. An empty tree attaches nothing.
    pub fn translate(&self, ctx: &mut QueryContext, set: &FilterSet) -> Result<(), FilterError> {
        match self.translate_set(ctx, set) {
            Ok(Some(expr)) => {
                debug!(items = set.items().len(), "translated filter tree");
                ctx.where_expr(expr);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!(error = %err, "rejected filter");
                Err(err)
            }
        }
    }

    /// Compiles a single item against its field's metadata.
    pub fn compile_item(
        &self,
        ctx: &QueryContext,
        item: &FilterItem,
    ) -> Result<CompiledCondition, FilterError> {
        let field = self
            .fields
            .field(&item.field_id)
            .ok_or_else(|| FilterError::UnknownField(item.field_id.clone()))?;

        self.filter
            .compile(ctx, &FilterParams::new(field, item.operator, &item.value))
    }

    fn translate_set(
        &self,
        ctx: &QueryContext,
        set: &FilterSet,
    ) -> Result<Option<Expr>, FilterError> {
        let op = match set.conjunction {
            Conjunction::And => BinaryOperator::And,
            Conjunction::Or => BinaryOperator::Or,
        };

        let mut folded: Option<Expr> = None;
        for node in &set.filter_set {
            let expr = match node {
                FilterNode::Item(item) => Expr::Raw(self.compile_item(ctx, item)?),
                FilterNode::Set(child) => match self.translate_set(ctx, child)? {
                    Some(expr) => expr,
                    None => continue,
                },
            };

            folded = Some(match folded {
                None => expr,
                Some(left) => Expr::BinaryOp(Box::new(BinaryOp {
                    left,
                    op: op.clone(),
                    right: expr,
                })),
            });
        }
        Ok(folded)
    }
}
