//! Deterministic physical names from stack context and logical suffix.

use crate::core::types::StackContext;

/// Compute the physical provider name for a resource.
///
/// Without a logical suffix the name is `{stack}-{project}`; with one it is
/// `{stack}-{project}-{logical}`. Identical inputs always produce identical
/// names, which is what makes repeated builds wire up the same resources.
pub fn physical_name(ctx: &StackContext, logical: Option<&str>) -> String {
    match logical {
        Some(suffix) => format!("{}-{}-{}", ctx.stack, ctx.project, suffix),
        None => format!("{}-{}", ctx.stack, ctx.project),
    }
}
