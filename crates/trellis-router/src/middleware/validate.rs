use std::path::Path;

use super::{MiddlewareBinding, MiddlewareDecl, Scope};
use crate::error::{Result, RoutingError};

/// Checks the middleware contract for one binding and freezes its order
///
/// Every item must be asynchronous; the first blocking item fails the whole
/// binding with its index.
pub fn validate_binding(
    binding: &MiddlewareBinding,
    scope: Scope,
    source: &Path,
) -> Result<MiddlewareDecl> {
    if let Some((index, blocking)) = binding
        .items()
        .iter()
        .enumerate()
        .find(|(_, mw)| !mw.is_async())
    {
        return Err(RoutingError::middleware(
            source,
            format!(
                "{scope} middleware `{}` at index {index} must be async",
                blocking.name()
            ),
        ));
    }

    Ok(MiddlewareDecl {
        scope,
        items: binding.items().to_vec(),
        source: source.to_path_buf(),
    })
}
