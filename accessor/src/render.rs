//! Accessor method templates.

use minijinja::Environment;
use serde::Serialize;

use crate::errors::RenderError;
use crate::tags::AccessKind;

const GETTER_TEMPLATE: &str = "func ({{ receiver }} *{{ receiver_type }}) Get{{ field }}() {{ type_text }} {
\treturn {{ receiver }}.{{ field }}
}";

const SETTER_TEMPLATE: &str = "func ({{ receiver }} *{{ receiver_type }}) Set{{ field }}(param {{ type_text }}) {
\t{{ receiver }}.{{ field }} = param
}";

/// Values interpolated into an accessor template.
#[derive(Debug, Serialize)]
struct AccessorContext<'a> {
    receiver: String,
    receiver_type: &'a str,
    field: &'a str,
    type_text: &'a str,
}

impl<'a> AccessorContext<'a> {
    fn new(receiver_type: &'a str, field: &'a str, type_text: &'a str) -> Self {
        Self {
            receiver: receiver_name(receiver_type),
            receiver_type,
            field,
            type_text,
        }
    }
}

/// Lowercased first character of the struct name.
fn receiver_name(receiver_type: &str) -> String {
    receiver_type
        .chars()
        .next()
        .map(|first| first.to_lowercase().collect())
        .unwrap_or_default()
}

/// Renders getter and setter methods from fixed templates.
pub struct AccessorRenderer {
    env: Environment<'static>,
}

impl AccessorRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template("getter", GETTER_TEMPLATE)
            .map_err(|source| RenderError {
                template: "getter",
                source,
            })?;
        env.add_template("setter", SETTER_TEMPLATE)
            .map_err(|source| RenderError {
                template: "setter",
                source,
            })?;
        Ok(Self { env })
    }

    /// `func (p *Point) GetX() int { ... }`
    pub fn render_getter(&self, receiver_type: &str, field: &str, type_text: &str) -> Result<String, RenderError> {
        self.render("getter", AccessorContext::new(receiver_type, field, type_text))
    }

    /// `func (p *Point) SetX(param int) { ... }`
    pub fn render_setter(&self, receiver_type: &str, field: &str, type_text: &str) -> Result<String, RenderError> {
        self.render("setter", AccessorContext::new(receiver_type, field, type_text))
    }

    pub fn render_kind(
        &self,
        kind: AccessKind,
        receiver_type: &str,
        field: &str,
        type_text: &str,
    ) -> Result<String, RenderError> {
        match kind {
            AccessKind::Write => self.render_setter(receiver_type, field, type_text),
            AccessKind::Read => self.render_getter(receiver_type, field, type_text),
        }
    }

    fn render(&self, template: &'static str, context: AccessorContext<'_>) -> Result<String, RenderError> {
        self.env
            .get_template(template)
            .and_then(|tmpl| tmpl.render(&context))
            .map_err(|source| RenderError { template, source })
    }
}
