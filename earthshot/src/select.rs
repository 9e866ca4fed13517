//! Scene selection from catalog results.

use crate::catalog::SceneResult;

/// Picks the scene to acquire from a catalog result list.
///
/// A single result is returned as-is. With more than one, the first
/// atmospherically-corrected product wins; otherwise the first result in
/// catalog order. The list is never re-sorted: catalog order is part of the
/// contract.
pub fn select_scene(results: &[SceneResult]) -> Option<&SceneResult> {
    match results {
        [] => None,
        [only] => Some(only),
        many => many
            .iter()
            .find(|r| r.product_type.is_atmospherically_corrected())
            .or_else(|| many.first()),
    }
}
