use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use handlebars::{Handlebars, no_escape};
use serde_json::{Map, Value, json};
use tracing::{debug, error, warn};

use crate::models::{
    message::RenderedMessage,
    notification::{NotificationKind, NotificationRequest},
    template::{
        HTML_LAYOUT, OWNER_COPY_HTML, OWNER_COPY_SUBJECT_PREFIX, OWNER_COPY_TEXT, TEMPLATES,
        template_for,
    },
};

const LAYOUT: &str = "layout";
const OWNER_COPY: &str = "owner_copy";

/// Renders requests against the built-in template table.
///
/// Subjects and text bodies go through a registry without escaping; HTML
/// bodies use Handlebars' default HTML escaping. Strict mode stays off, so
/// unknown placeholders render as empty strings.
#[derive(Clone)]
pub struct TemplateRenderer {
    from: String,
    text: Arc<Handlebars<'static>>,
    html: Arc<Handlebars<'static>>,
}

impl TemplateRenderer {
    /// Registers every built-in template once.
    pub fn new(from: impl Into<String>) -> Result<Self, Error> {
        let mut text = Handlebars::new();
        text.register_escape_fn(no_escape);
        let mut html = Handlebars::new();

        for template in TEMPLATES.iter() {
            let kind = template.kind;
            register(&mut text, &subject_name(kind), template.subject)?;
            register(&mut text, &text_name(kind), template.body_text)?;
            register(&mut html, &html_name(kind), template.body_html)?;
        }

        register(&mut text, OWNER_COPY, OWNER_COPY_TEXT)?;
        register(&mut html, OWNER_COPY, OWNER_COPY_HTML)?;
        register(&mut html, LAYOUT, HTML_LAYOUT)?;

        debug!(count = TEMPLATES.len(), "Email templates registered");

        Ok(Self {
            from: from.into(),
            text: Arc::new(text),
            html: Arc::new(html),
        })
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    pub fn render(&self, request: &NotificationRequest) -> RenderedMessage {
        let kind = request.kind();
        let data = Value::Object(Self::variables(request));

        debug!(kind = %kind, "Rendering template");

        let missing = Self::missing_fields(request);
        if !missing.is_empty() {
            warn!(
                kind = %kind,
                missing_fields = ?missing,
                "Template fields missing, rendering them empty"
            );
        }

        let mut subject = render_or_empty(&self.text, &subject_name(kind), &data);
        let mut text = render_or_empty(&self.text, &text_name(kind), &data);
        let mut content = render_or_empty(&self.html, &html_name(kind), &data);

        if request.copy_of().is_some() {
            subject = format!("{}{}", OWNER_COPY_SUBJECT_PREFIX, subject);
            text = format!("{}{}", render_or_empty(&self.text, OWNER_COPY, &data), text);
            content = format!("{}{}", render_or_empty(&self.html, OWNER_COPY, &data), content);
        }

        let html = render_or_empty(
            &self.html,
            LAYOUT,
            &json!({ "subject": &subject, "content": content }),
        );

        RenderedMessage {
            from: self.from.clone(),
            to: request.recipient().trim().to_string(),
            subject,
            text,
            html: Some(html),
        }
    }

    /// Required fields of the request's template that have no value.
    pub fn missing_fields(request: &NotificationRequest) -> Vec<&'static str> {
        let variables = Self::variables(request);

        template_for(request.kind())
            .required_fields
            .iter()
            .copied()
            .filter(|field| variables.get(*field).is_none_or(is_blank))
            .collect()
    }

    fn variables(request: &NotificationRequest) -> Map<String, Value> {
        let mut variables: Map<String, Value> = request
            .params()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        variables.insert("firstName".to_string(), Value::from(request.first_name()));
        variables.insert("lastName".to_string(), Value::from(request.last_name()));
        variables.insert("fullName".to_string(), Value::from(request.full_name()));
        variables.insert(
            "recipient".to_string(),
            Value::from(request.copy_of().unwrap_or(request.recipient())),
        );

        variables
    }
}

fn subject_name(kind: NotificationKind) -> String {
    format!("{}_subject", kind.as_str())
}

fn text_name(kind: NotificationKind) -> String {
    format!("{}_text", kind.as_str())
}

fn html_name(kind: NotificationKind) -> String {
    format!("{}_html", kind.as_str())
}

fn register(registry: &mut Handlebars<'static>, name: &str, template: &str) -> Result<(), Error> {
    registry
        .register_template_string(name, template)
        .map_err(|e| anyhow!("Failed to register template '{}': {}", name, e))
}

/// Registered templates only reference plain variables, so a render error
/// means a broken registry; it is logged and the part rendered empty.
fn render_or_empty(registry: &Handlebars<'static>, name: &str, data: &Value) -> String {
    registry.render(name, data).unwrap_or_else(|e| {
        error!(template = name, error = %e, "Template rendering failed");
        String::new()
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
