use crate::graph::Parameters;
use crate::registry::FunctionSchema;

/// Serializes `parameters` in the order the schema declares.
///
/// Parameters the schema doesn't name are dropped; names without a value become
/// empty arguments so positions stay stable.
pub fn ordered_arguments(schema: &FunctionSchema, parameters: &Parameters) -> Vec<String> {
    schema
        .parameters
        .iter()
        .map(|name| {
            parameters
                .get(name)
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .collect()
}

