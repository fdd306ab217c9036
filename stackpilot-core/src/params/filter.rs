//! Template parameter filter.

use crate::template::TemplateDocument;
use crate::types::ParameterMap;
use tracing::debug;

/// Keep only the parameters `template` still declares, preserving order.
///
/// Applied to the live stack's parameters before merging, never to caller
/// overrides. The control plane rejects `UsePrevious` for an undeclared key.
pub fn filter_to_template(template: &TemplateDocument, params: &ParameterMap) -> ParameterMap {
    let declared = template.parameter_names();
    let mut kept = ParameterMap::new();

    for (key, value) in params {
        if declared.contains(key.as_str()) {
            kept.insert(key.clone(), value.clone());
        } else {
            debug!(parameter = %key, "Dropping parameter no longer declared by template");
        }
    }

    kept
}
