//! Template-backed components rendered with Tera.
//!
//! The template is parsed once when the component is built. At render time
//! the bundle, overlaid on the component's defaults, becomes the Tera context.
//! Nested content is exposed as the `nested` variable, and the producer is
//! only forced when the template source actually references `nested`. A
//! producer's output replaces a `nested` input; without a producer, a `nested`
//! input is rendered as given.
//!
//! ```rust
//! use rendercell::{Component, TemplateComponent, bundle};
//!
//! let card = TemplateComponent::new("card", "<div>{{ heading }}{{ nested }}</div>")
//!     .unwrap()
//!     .with_defaults(bundle! { "heading" => "Untitled" });
//!
//! assert_eq!(card.render_plain(&bundle! {}).unwrap(), "<div>Untitled</div>");
//! ```

use std::error::Error as _;
use std::fmt;

use regex::Regex;
use tera::{Context as TeraContext, Tera};

use super::{Component, Nested};
use crate::bundle::InputBundle;
use crate::core::RenderError;

/// Context variable holding nested content.
const NESTED_VAR: &str = "nested";

/// A component whose output is a Tera template rendered against the bundle.
pub struct TemplateComponent {
    name: String,
    source: String,
    tera: Tera,
    defaults: InputBundle,
    enabled: bool,
    uses_nested: bool,
}

impl TemplateComponent {
    /// Parse `source` into a template named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the template does not parse.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self, RenderError> {
        let name = name.into();
        let source = source.into();

        let mut tera = Tera::default();
        // Output is markup assembled by the caller; escaping is the author's call.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&name, &source).map_err(|e| RenderError::Template {
            component: name.clone(),
            message: format_tera_error(&e, &name),
        })?;

        let uses_nested = references_nested(&source);
        tracing::debug!("Parsed template '{}' (uses nested: {})", name, uses_nested);

        Ok(Self {
            name,
            source,
            tera,
            defaults: InputBundle::new(),
            enabled: true,
            uses_nested,
        })
    }

    /// Values used for keys the render bundle does not provide.
    #[must_use]
    pub fn with_defaults(mut self, defaults: InputBundle) -> Self {
        self.defaults = defaults;
        self
    }

    /// When disabled, the template source is returned verbatim.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn defaults(&self) -> &InputBundle {
        &self.defaults
    }

    pub fn uses_nested(&self) -> bool {
        self.uses_nested
    }

    fn build_context(
        &self,
        bundle: &InputBundle,
        nested: Nested<'_>,
    ) -> Result<TeraContext, RenderError> {
        let merged = bundle.merged_over(&self.defaults);
        let mut context =
            TeraContext::from_value(merged.to_json()).map_err(|e| RenderError::Template {
                component: self.name.clone(),
                message: format_tera_error(&e, &self.name),
            })?;

        if self.uses_nested && (nested.is_present() || !merged.contains_key(NESTED_VAR)) {
            context.insert(NESTED_VAR, &nested.render()?);
        }
        Ok(context)
    }

    /// Turn a Tera render error into a [`RenderError`].
    ///
    /// Unknown variables become [`RenderError::MissingInput`] with suggestions
    /// drawn from the keys that were available.
    fn convert_error(&self, error: &tera::Error, bundle: &InputBundle) -> RenderError {
        let chain = error_chain(error);

        if let Some(variable) = chain.iter().find_map(|msg| extract_variable_name(msg)) {
            let available = bundle.merged_over(&self.defaults);
            let root = variable.split('.').next().unwrap_or(&variable);
            return RenderError::MissingInput {
                suggestions: available.similar_keys(root),
                key: variable,
            };
        }

        RenderError::Template {
            component: self.name.clone(),
            message: format_tera_error(error, &self.name),
        }
    }
}

impl Component for TemplateComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        if !self.enabled {
            tracing::debug!("Templating disabled, returning '{}' source as-is", self.name);
            return Ok(self.source.clone());
        }

        let context = self.build_context(bundle, nested)?;
        self.tera.render(&self.name, &context).map_err(|e| self.convert_error(&e, bundle))
    }
}

impl fmt::Debug for TemplateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateComponent")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("uses_nested", &self.uses_nested)
            .finish_non_exhaustive()
    }
}

/// Whether any `{{ }}` or `{% %}` tag in `source` mentions `nested`.
fn references_nested(source: &str) -> bool {
    match Regex::new(r"\{[{%][^}]*\bnested\b") {
        Ok(re) => re.is_match(source),
        // Unreachable for a literal pattern; force nested content rather than drop it.
        Err(_) => true,
    }
}

fn error_chain(error: &tera::Error) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages
}

/// Extract the variable name from "Variable `foo` not found" messages.
fn extract_variable_name(error_msg: &str) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Collapse a Tera error chain into one readable line.
///
/// Tera wraps the root cause in "Failed to render 'name'" layers that add no
/// information; those are dropped.
fn format_tera_error(error: &tera::Error, template_name: &str) -> String {
    let is_wrapper = |msg: &str| {
        (msg.starts_with("Failed to render") || msg.starts_with("Failed to parse"))
            && msg.contains(template_name)
    };

    let messages: Vec<String> = error_chain(error)
        .into_iter()
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty() && !is_wrapper(msg))
        .collect();

    if messages.is_empty() {
        "template syntax error".to_string()
    } else {
        messages.join(" -> ")
    }
}
