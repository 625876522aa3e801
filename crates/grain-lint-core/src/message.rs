//! Message templates and the placeholder formatter.
//!
//! Every diagnostic text is produced from a [`MessageTemplate`]: a stable
//! message id paired with a text containing `{{field}}` placeholders.
//! Rendering fails with [`FormatError`] when a placeholder has no value,
//! so a detector that forgets a field aborts loudly instead of printing a
//! broken message.
//!
//! ```
//! use grain_lint_core::message::{MessageData, MessageTemplate};
//!
//! const TOO_LONG: MessageTemplate =
//!     MessageTemplate::new("tooManyLines", "Function has {{count}} lines (max: {{max}})");
//!
//! let mut data = MessageData::new();
//! data.insert("count".into(), "24".into());
//! data.insert("max".into(), "20".into());
//! assert_eq!(TOO_LONG.format(&data).unwrap(), "Function has 24 lines (max: 20)");
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;

/// Values substituted into a template, keyed by placeholder name.
pub type MessageData = BTreeMap<String, String>;

/// Errors raised while rendering a message template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A placeholder referenced by the template has no value.
    #[error("message `{message_id}` references `{{{{{field}}}}}` but no value was supplied")]
    MissingField {
        /// Template that was being rendered.
        message_id: String,
        /// Placeholder without a value.
        field: String,
    },

    /// A `{{` opened a placeholder that never closes.
    #[error("message `{message_id}` has an unterminated placeholder")]
    Unterminated {
        /// Template that was being rendered.
        message_id: String,
    },

    /// The catalogue has no template with this id.
    #[error("unknown message id `{0}`")]
    UnknownMessage(String),
}

/// A message id paired with its template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Stable identifier reported as `messageId`.
    pub id: &'static str,
    /// Template text with `{{field}}` placeholders.
    pub text: &'static str,
}

impl MessageTemplate {
    /// Creates a template.
    #[must_use]
    pub const fn new(id: &'static str, text: &'static str) -> Self {
        Self { id, text }
    }

    /// Lists the placeholder names this template requires, in order of
    /// first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Unterminated`] for a malformed template.
    pub fn required_fields(&self) -> Result<Vec<&'static str>, FormatError> {
        let mut fields: Vec<&'static str> = Vec::new();
        for segment in self.segments()? {
            if let Segment::Field(name) = segment {
                if !fields.contains(&name) {
                    fields.push(name);
                }
            }
        }
        Ok(fields)
    }

    /// Renders the template with `data`.
    ///
    /// Keys in `data` that the template does not reference are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MissingField`] when a placeholder has no value.
    pub fn format(&self, data: &MessageData) -> Result<String, FormatError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in self.segments()? {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = data.get(name).ok_or_else(|| FormatError::MissingField {
                        message_id: self.id.to_string(),
                        field: name.to_string(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Result<Vec<Segment>, FormatError> {
        let text = self.text;
        let mut segments = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(&rest[..open]));
            }
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| FormatError::Unterminated {
                message_id: self.id.to_string(),
            })?;
            segments.push(Segment::Field(after[..close].trim()));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }
        Ok(segments)
    }
}

enum Segment {
    Text(&'static str),
    Field(&'static str),
}

/// Fluent builder collecting the data for one template.
#[derive(Debug, Clone)]
pub struct Message {
    template: MessageTemplate,
    data: MessageData,
}

impl Message {
    /// Starts a message for `template`.
    #[must_use]
    pub fn new(template: MessageTemplate) -> Self {
        Self {
            template,
            data: MessageData::new(),
        }
    }

    /// Supplies a placeholder value.
    #[must_use]
    pub fn arg(mut self, field: &str, value: impl Display) -> Self {
        self.data.insert(field.to_string(), value.to_string());
        self
    }

    /// Returns the template id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.template.id
    }

    /// Returns the collected data.
    #[must_use]
    pub fn data(&self) -> &MessageData {
        &self.data
    }

    /// Renders the message.
    ///
    /// # Errors
    ///
    /// Propagates [`FormatError`] from the template.
    pub fn render(&self) -> Result<String, FormatError> {
        self.template.format(&self.data)
    }

    /// Consumes the builder, returning its data.
    #[must_use]
    pub fn into_data(self) -> MessageData {
        self.data
    }
}

/// A rule's set of templates, addressable by message id.
#[derive(Debug, Clone, Copy)]
pub struct MessageCatalog {
    templates: &'static [MessageTemplate],
}

impl MessageCatalog {
    /// Wraps a static template table.
    #[must_use]
    pub const fn new(templates: &'static [MessageTemplate]) -> Self {
        Self { templates }
    }

    /// Looks up a template by id.
    #[must_use]
    pub fn get(&self, message_id: &str) -> Option<&MessageTemplate> {
        self.templates.iter().find(|t| t.id == message_id)
    }

    /// Renders the template named `message_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownMessage`] for an unknown id, or the
    /// template's own rendering error.
    pub fn format(&self, message_id: &str, data: &MessageData) -> Result<String, FormatError> {
        self.get(message_id)
            .ok_or_else(|| FormatError::UnknownMessage(message_id.to_string()))?
            .format(data)
    }

    /// Returns all templates.
    #[must_use]
    pub fn templates(&self) -> &'static [MessageTemplate] {
        self.templates
    }
}
