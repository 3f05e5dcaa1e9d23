//! Threedo - converter from `.3d` object descriptions to ICR2 flavor graphs.
//!
//! Loading, lowering and inspection for the `.3d` text format. The result
//! of a conversion is a [`Model`]: the offset-addressed flavor records plus
//! the tables of files they reference. Encoding the model into a binary
//! `.3do` file is left to the model serializer.

pub mod config;

mod convert;
mod error;
mod export;
mod model;

pub use threedo_core::{angle, files, flavor, graph, plane};
pub use threedo_parser::{Definitions, LoadOptions};

pub use convert::{ConvertError, ConvertOptions, Converter, TrackHashError, convert};
pub use error::ThreedoError;
pub use model::Model;

use log::{debug, info, trace, warn};

use config::AppConfig;

/// Builder for loading and converting `.3d` documents.
///
/// # Examples
///
/// ```rust
/// use threedo::{ModelBuilder, config::AppConfig};
///
/// let source = "3D VERSION 3.0;\nA : NIL;\n";
///
/// let builder = ModelBuilder::new(AppConfig::default());
///
/// // Parse the document into definitions
/// let definitions = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Lower the root definition
/// let model = builder.convert(&definitions, "A", None)
///     .expect("Failed to convert");
///
/// println!("{}", builder.render_listing(&model));
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Loading and conversion settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse a document into its named definitions.
    ///
    /// Warnings of a successful load are logged and kept on the returned
    /// [`Definitions`].
    ///
    /// # Errors
    ///
    /// Returns `ThreedoError::Parse` with every diagnostic of the document.
    pub fn parse(&self, source: &str) -> Result<Definitions, ThreedoError> {
        info!("Parsing document");

        let options = LoadOptions {
            allow_duplicates: self.config.parse().allow_duplicates(),
        };
        let definitions = threedo_parser::parse_document(source, options)
            .map_err(|err| ThreedoError::new_parse_error(err, source))?;

        for warning in definitions.warnings() {
            warn!(definition:? = warning.definition(); "{}", warning.message());
        }
        debug!(definitions = definitions.len(); "Document parsed successfully");
        trace!(definitions:?; "Parsed definitions");

        Ok(definitions)
    }

    /// Lower `root` into a model.
    ///
    /// With `track_hash` set, the list containing that name is rewritten
    /// into the track-hash layout and `FACE` splits are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ThreedoError::Convert` for undefined references, malformed
    /// payloads or a malformed track.
    pub fn convert(
        &self,
        definitions: &Definitions,
        root: &str,
        track_hash: Option<&str>,
    ) -> Result<Model, ThreedoError> {
        let options = ConvertOptions {
            scale: self.config.convert().scale(),
            track_hash: track_hash.map(str::to_string),
        };
        let model = convert(definitions, root, options)?;
        info!(flavors = model.flavors().len(); "Model built");
        Ok(model)
    }

    /// Render one line per flavor, in offset order.
    pub fn render_listing(&self, model: &Model) -> String {
        export::listing(model)
    }

    /// Render the JSON manifest of a model.
    ///
    /// # Errors
    ///
    /// Returns `ThreedoError::Export` if encoding fails.
    pub fn render_json(&self, model: &Model) -> Result<String, ThreedoError> {
        let json = export::json(model)?;
        debug!(bytes = json.len(); "JSON manifest rendered");
        Ok(json)
    }
}
