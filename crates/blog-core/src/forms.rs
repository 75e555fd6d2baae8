//! Form inputs and their validation.
//!
//! Each form deserializes straight from the request and has a pure
//! `validate_*` function that returns either the cleaned fields or the per-field
//! error messages to re-render with. Validation never touches storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Field name to error messages, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";

/// Comment submission form on the post detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(max = 80, message = "Ensure this value has at most 80 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

/// Cleaned comment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFields {
    pub name: String,
    pub email: String,
    pub body: String,
}

pub fn validate_comment(form: &CommentForm) -> Result<CommentFields, FieldErrors> {
    let cleaned = CommentForm {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        body: form.body.trim().to_string(),
    };

    let mut errors = collect(cleaned.validate());
    require(&mut errors, "name", &cleaned.name);
    require(&mut errors, "email", &cleaned.email);
    require(&mut errors, "body", &cleaned.body);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CommentFields {
        name: cleaned.name,
        email: cleaned.email,
        body: cleaned.body,
    })
}

/// "Recommend this post by email" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ShareForm {
    #[serde(default)]
    #[validate(length(max = 25, message = "Ensure this value has at most 25 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub to: String,
    #[serde(default)]
    pub comments: String,
}

/// Cleaned share fields. `comments` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFields {
    pub name: String,
    pub to: String,
    pub comments: String,
}

pub fn validate_share(form: &ShareForm) -> Result<ShareFields, FieldErrors> {
    let cleaned = ShareForm {
        name: form.name.trim().to_string(),
        to: form.to.trim().to_string(),
        comments: form.comments.trim().to_string(),
    };

    let mut errors = collect(cleaned.validate());
    require(&mut errors, "name", &cleaned.name);
    require(&mut errors, "to", &cleaned.to);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ShareFields {
        name: cleaned.name,
        to: cleaned.to,
        comments: cleaned.comments,
    })
}

/// Search box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
    pub query: Option<String>,
}

impl SearchForm {
    /// Whether a search was requested at all.
    pub fn is_submitted(&self) -> bool {
        self.query.is_some()
    }
}

pub fn validate_search(form: &SearchForm) -> Result<String, FieldErrors> {
    let query = form.query.as_deref().unwrap_or_default().trim();
    if query.is_empty() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "query", query);
        return Err(errors);
    }
    Ok(query.to_string())
}

fn collect(result: Result<(), ValidationErrors>) -> FieldErrors {
    let Err(errors) = result else {
        return FieldErrors::new();
    };

    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// A blank required field reports only that it is missing.
fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.insert(field.to_string(), vec![REQUIRED.to_string()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(name: &str, email: &str, body: &str) -> CommentForm {
        CommentForm {
            name: name.to_string(),
            email: email.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn valid_comment_is_trimmed() {
        let fields = validate_comment(&comment("  Ada ", " ada@example.com ", " Nice post\n")).unwrap();
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.email, "ada@example.com");
        assert_eq!(fields.body, "Nice post");
    }

    #[test]
    fn invalid_email_is_rejected() {
        let errors = validate_comment(&comment("Ada", "not-an-email", "Hi")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["email"], vec!["Enter a valid email address."]);
    }

    #[test]
    fn missing_fields_report_required_only() {
        let errors = validate_comment(&comment("", "", "   ")).unwrap_err();
        assert_eq!(errors.len(), 3);
        for field in ["name", "email", "body"] {
            assert_eq!(errors[field], vec![REQUIRED]);
        }
    }

    #[test]
    fn overlong_comment_name_is_rejected() {
        let errors = validate_comment(&comment(&"x".repeat(81), "a@b.io", "Hi")).unwrap_err();
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn share_comments_are_optional() {
        let form = ShareForm {
            name: "Ada".to_string(),
            to: "friend@example.com".to_string(),
            comments: String::new(),
        };
        let fields = validate_share(&form).unwrap();
        assert_eq!(fields.comments, "");
    }

    #[test]
    fn share_requires_valid_recipient() {
        let form = ShareForm {
            name: "Ada".to_string(),
            to: "friend-at-example".to_string(),
            comments: String::new(),
        };
        let errors = validate_share(&form).unwrap_err();
        assert!(errors.contains_key("to"));
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn blank_search_query_fails() {
        let form = SearchForm {
            query: Some("   ".to_string()),
        };
        assert!(form.is_submitted());
        assert!(validate_search(&form).is_err());
        assert!(!SearchForm::default().is_submitted());
    }

    #[test]
    fn search_query_is_trimmed() {
        let form = SearchForm {
            query: Some(" django ".to_string()),
        };
        assert_eq!(validate_search(&form).unwrap(), "django");
    }
}
