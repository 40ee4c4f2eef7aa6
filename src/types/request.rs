use std::collections::BTreeMap;

use serde::Deserialize;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const INVALID_EMAIL: &str = "Invalid email address.";
pub(crate) const INVALID_USERNAME: &str = "Username may only contain letters, digits, '-' and '_'.";
pub(crate) const INCORRECT_CREDENTIALS: &str = "Incorrect username/password";
pub(crate) const USERNAME_TAKEN: &str = "Username already taken";
pub(crate) const EMAIL_TAKEN: &str = "Email already taken";

// Missing fields deserialize to "" so they fail validation instead of the extractor.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegisterForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginForm {
    pub(crate) fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        errors.required("username", &self.username);
        errors.required("password", &self.password);
        errors
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FeedbackForm {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl FeedbackForm {
    pub(crate) fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if errors.required("title", &self.title) {
            errors.length("title", &self.title, 1, 100);
        }
        errors.required("content", &self.content);
        errors
    }
}

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub(crate) fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub(crate) fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `value` is present, recording an error if it is not.
    pub(crate) fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, REQUIRED);
            return false;
        }
        true
    }

    pub(crate) fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        if len < min || len > max {
            self.add(
                field,
                format!("Field must be between {min} and {max} characters long."),
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_required() {
        let form: LoginForm = serde_urlencoded::from_str("username=alice").unwrap();
        let errors = form.validate();

        assert!(errors.get("username").is_empty());
        assert_eq!(errors.get("password"), [REQUIRED.to_string()]);
    }

    #[test]
    fn feedback_title_is_bounded() {
        let form = FeedbackForm {
            title: "x".repeat(101),
            content: "body".into(),
        };

        assert_eq!(
            form.validate().get("title"),
            ["Field must be between 1 and 100 characters long.".to_string()]
        );

        let form = FeedbackForm {
            title: "x".repeat(100),
            content: "body".into(),
        };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn whitespace_only_content_is_missing() {
        let form = FeedbackForm {
            title: "Hello".into(),
            content: "   ".into(),
        };

        assert_eq!(form.validate().get("content"), [REQUIRED.to_string()]);
    }
}
