//! Template rendering.
//!
//! Every page goes through the same wrapper template ([`WRAPPER_TEMPLATE`]),
//! which lays out the site chrome and embeds the page named by the context's
//! `template_name` entry. The [`Renderer`] trait keeps handlers independent of
//! the engine so tests can substitute a recording fake.
//!
//! The production renderer is [`TeraRenderer`], backed by templates compiled
//! into the binary from the `templates/` directory.

use tera::Tera;
use thiserror::Error;

pub mod context;
pub mod escape;

pub use context::{TEMPLATE_NAME_KEY, TemplateContext};
pub use escape::html_escape;

/// The fixed template every page is rendered through.
pub const WRAPPER_TEMPLATE: &str = "chrome.html";

/// Context key under which the rendered page template is handed to the wrapper.
const PAGE_BODY_KEY: &str = "page_body";

/// Templates compiled into the binary, as `(name, source)` pairs.
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("chrome.html", include_str!("../../templates/chrome.html")),
    ("main.html", include_str!("../../templates/main.html")),
    ("resume.html", include_str!("../../templates/resume.html")),
    ("projects.html", include_str!("../../templates/projects.html")),
    ("contact.html", include_str!("../../templates/contact.html")),
];

/// Errors that can occur while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template is registered under the requested name.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// The template engine failed to parse or render.
    #[error("template error: {0}")]
    Tera(#[from] tera::Error),
}

/// Produces HTML from a template name and a context.
pub trait Renderer: Send + Sync {
    /// Renders `template` with the given context.
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError>;
}

/// Tera-backed renderer.
///
/// When the context carries a `template_name` different from the template
/// being rendered, that page is rendered first with the same context and
/// passed to the outer template as `page_body`.
#[derive(Debug)]
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Builds a renderer over the templates embedded in the binary.
    pub fn embedded() -> Result<Self, RenderError> {
        Self::from_sources(EMBEDDED_TEMPLATES.iter().copied())
    }

    /// Builds a renderer from `(name, source)` pairs.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;
        Ok(TeraRenderer { tera })
    }

    fn ensure_known(&self, template: &str) -> Result<(), RenderError> {
        if self.tera.get_template_names().any(|name| name == template) {
            Ok(())
        } else {
            Err(RenderError::UnknownTemplate(template.to_string()))
        }
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError> {
        self.ensure_known(template)?;
        let mut tera_context = tera::Context::from_serialize(context)?;

        if let Some(page) = context.template_name().filter(|page| *page != template) {
            self.ensure_known(page)?;
            let body = self.tera.render(page, &tera_context)?;
            tera_context.insert(PAGE_BODY_KEY, &body);
        }

        Ok(self.tera.render(template, &tera_context)?)
    }
}
