use crate::markup::{Document, Element, Node};
use crate::utils::error::{Result, SiteError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactFormError {
    #[error("Please fill in all required fields.")]
    MissingFields { fields: Vec<&'static str> },

    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// 表單送出後要顯示給使用者的訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

impl ContactForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();
        Self {
            name: get("name"),
            email: get("email"),
            phone: get("phone"),
            service: get("service"),
            message: get("message"),
        }
    }

    /// Reads the named controls inside the form matched by `form_selector`.
    pub fn from_document(document: &Document, form_selector: &str) -> Result<Self> {
        let path = document
            .query_selector(form_selector)?
            .ok_or_else(|| SiteError::selector(form_selector, "no form matches"))?;
        let form = document
            .element(&path)
            .ok_or_else(|| SiteError::selector(form_selector, "not an element"))?;

        let mut fields = HashMap::new();
        collect_fields(&form.children, &mut fields);
        Ok(Self::from_fields(&fields))
    }

    pub fn validate(&self) -> std::result::Result<(), ContactFormError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("service", &self.service),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ContactFormError::MissingFields { fields: missing });
        }
        if !EMAIL.is_match(&self.email) {
            return Err(ContactFormError::InvalidEmail);
        }
        Ok(())
    }

    pub fn submit(&self) -> Notification {
        match self.validate() {
            Ok(()) => {
                tracing::info!("📨 Contact request from {} about {}", self.email, self.service);
                Notification {
                    kind: NotificationKind::Success,
                    message: "Thank you! Your message has been sent. We'll get back to you soon."
                        .to_string(),
                }
            }
            Err(e) => {
                tracing::debug!("Contact form rejected: {:?}", e);
                Notification {
                    kind: NotificationKind::Error,
                    message: e.to_string(),
                }
            }
        }
    }
}

fn collect_fields(nodes: &[Node], fields: &mut HashMap<String, String>) {
    for node in nodes {
        let Node::Element(element) = node else {
            continue;
        };
        if let Some(name) = element.attr("name") {
            let value = match element.tag.as_str() {
                "input" => element.attr("value").unwrap_or_default().to_string(),
                "textarea" => element.text_content(),
                "select" => selected_option(element),
                _ => {
                    collect_fields(&element.children, fields);
                    continue;
                }
            };
            fields.entry(name.to_string()).or_insert(value);
            continue;
        }
        collect_fields(&element.children, fields);
    }
}

fn selected_option(select: &Element) -> String {
    let mut options = Vec::new();
    collect_options(&select.children, &mut options);
    options
        .iter()
        .find(|o| o.attr("selected").is_some())
        .or_else(|| options.first())
        .map(|o| {
            o.attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| o.text_content())
        })
        .unwrap_or_default()
}

fn collect_options<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.tag == "option" {
                out.push(element);
            } else {
                collect_options(&element.children, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, service: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            service: service.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_required_fields() {
        let err = form("", "a@b.co", "").validate().unwrap_err();
        assert_eq!(
            err,
            ContactFormError::MissingFields {
                fields: vec!["name", "service"]
            }
        );
        assert_eq!(err.to_string(), "Please fill in all required fields.");
    }

    #[test]
    fn test_email_shape() {
        assert!(form("Ana", "ana@clinic.vet", "surgery").validate().is_ok());
        for bad in ["ana", "ana@clinic", "ana @clinic.vet", "@clinic.vet", "ana@@clinic.vet"] {
            assert_eq!(
                form("Ana", bad, "surgery").validate(),
                Err(ContactFormError::InvalidEmail),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_submit_notifications() {
        let ok = form("Ana", "ana@clinic.vet", "surgery").submit();
        assert_eq!(ok.kind, NotificationKind::Success);

        let bad = form("Ana", "nope", "surgery").submit();
        assert_eq!(bad.kind, NotificationKind::Error);
        assert_eq!(bad.message, "Please enter a valid email address.");
    }

    #[test]
    fn test_from_document_reads_controls() {
        let doc = Document::parse(
            r#"<form id="contactForm">
<div class="row"><input type="text" name="name" value="Ana"></div>
<input type="email" name="email" value="ana@clinic.vet">
<select name="service"><option value="">Choose</option><option value="dental" selected>Dental</option></select>
<textarea name="message">Hi &amp; thanks</textarea>
</form>"#,
        )
        .unwrap();

        let form = ContactForm::from_document(&doc, "#contactForm").unwrap();

        assert_eq!(form.name, "Ana");
        assert_eq!(form.email, "ana@clinic.vet");
        assert_eq!(form.service, "dental");
        assert_eq!(form.message, "Hi & thanks");
        assert_eq!(form.phone, "");
        assert!(form.validate().is_ok());
        assert!(ContactForm::from_document(&doc, "#missing").is_err());
    }

    #[test]
    fn test_unselected_select_uses_first_option() {
        let doc = Document::parse(
            r#"<form><select name="service"><option value="">Choose</option><option value="x">X</option></select></form>"#,
        )
        .unwrap();
        let form = ContactForm::from_document(&doc, "form").unwrap();
        assert_eq!(form.service, "");
        assert_eq!(
            form.validate(),
            Err(ContactFormError::MissingFields {
                fields: vec!["name", "email", "service"]
            })
        );
    }
}
