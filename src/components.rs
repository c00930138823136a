//! Built-in components.
//!
//! One of each component style, used by the CLI and handy as worked examples:
//!
//! | name             | style                 | output                                   |
//! |------------------|-----------------------|------------------------------------------|
//! | `formal-greeter` | [`View`] instance     | `<h1>Hi, {title} {name}.</h1>`           |
//! | `layout`         | hand-written struct   | `<main>` page shell around nested output |
//! | `card`           | [`TemplateComponent`] | `<section>` box around nested output     |

use std::sync::Arc;

use crate::bundle::InputBundle;
use crate::component::{Component, Instance, Nested, TemplateComponent, View};
use crate::config::TemplatingConfig;
use crate::core::RenderError;

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: &[&str] = &["formal-greeter", "layout", "card"];

/// Greets someone by title and name.
///
/// Inputs: `name` (required), `title` (defaults to `President`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalGreeter {
    title: String,
    name: String,
}

impl FormalGreeter {
    pub const DEFAULT_TITLE: &'static str = "President";

    fn salutation(&self) -> String {
        format!("{} {}", self.title, self.name)
    }
}

impl View for FormalGreeter {
    const NAME: &'static str = "formal-greeter";

    fn from_bundle(bundle: &InputBundle) -> Result<Self, RenderError> {
        Ok(Self {
            title: bundle.str_or("title", Self::DEFAULT_TITLE).to_string(),
            name: bundle.require_str("name")?.to_string(),
        })
    }

    fn render(&self, nested: Nested<'_>) -> Result<String, RenderError> {
        Ok(format!("<h1>Hi, {}.</h1>{}", self.salutation(), nested.render()?))
    }
}

/// Page shell that places nested content under a heading.
///
/// Inputs: `heading` (defaults to `Untitled`), `footer` (optional).
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout;

impl Component for Layout {
    fn name(&self) -> &str {
        "layout"
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        let heading = bundle.str_or("heading", "Untitled");
        let body = nested.render()?;

        let mut out = format!("<main><header>{heading}</header>{body}");
        if let Some(footer) = bundle.str("footer") {
            out.push_str(&format!("<footer>{footer}</footer>"));
        }
        out.push_str("</main>");
        Ok(out)
    }
}

const CARD_TEMPLATE: &str = "<section class=\"card\"><h2>{{ heading }}</h2>\
{% if nested %}<div>{{ nested }}</div>{% endif %}</section>";

/// Template-backed card. Nested content is only rendered when present.
///
/// Inputs: `heading` (defaults to `Card`).
pub fn card(templating: &TemplatingConfig) -> Result<TemplateComponent, RenderError> {
    Ok(TemplateComponent::new("card", CARD_TEMPLATE)?
        .with_defaults(InputBundle::new().with("heading", "Card"))
        .with_enabled(templating.enabled))
}

/// Look up a built-in component by name.
///
/// Returns `Ok(None)` for unknown names.
pub fn builtin(
    name: &str,
    templating: &TemplatingConfig,
) -> Result<Option<Arc<dyn Component>>, RenderError> {
    let component: Arc<dyn Component> = match name {
        "formal-greeter" => Arc::new(Instance::<FormalGreeter>::new()),
        "layout" => Arc::new(Layout),
        "card" => Arc::new(card(templating)?),
        _ => return Ok(None),
    };
    Ok(Some(component))
}
