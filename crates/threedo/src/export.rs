//! Text and JSON renderings of a converted model.
//!
//! The binary `.3do` encoding is owned by the model serializer; these
//! exports are for inspection and for handing the model to other tools.

use thiserror::Error;

use crate::model::Model;

/// Errors that can occur while exporting a model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line per flavor in ascending offset order:
/// `offset type values1 values2 [parents]`.
pub fn listing(model: &Model) -> String {
    let mut out = String::new();
    for (offset, flavor) in model.flavors() {
        out.push_str(&format!("{offset:>6} {flavor}\n"));
    }
    out
}

/// Pretty-printed JSON manifest with the file tables and every flavor.
pub fn json(model: &Model) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(model)?)
}
