use chrono::{DateTime, Utc};

use crate::types::request::FeedbackForm;
use crate::types::Username;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Feedback {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) username: Username,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub(crate) struct NewFeedback {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) username: Username,
}

impl NewFeedback {
    pub(crate) fn new(form: FeedbackForm, username: &str) -> Self {
        Self {
            title: form.title,
            content: form.content,
            username: username.to_owned(),
        }
    }
}

/// The mutable fields of a feedback row.
#[derive(Clone, Debug)]
pub(crate) struct FeedbackChanges {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl From<FeedbackForm> for FeedbackChanges {
    fn from(form: FeedbackForm) -> Self {
        Self {
            title: form.title,
            content: form.content,
        }
    }
}

impl From<&Feedback> for FeedbackForm {
    fn from(feedback: &Feedback) -> Self {
        Self {
            title: feedback.title.clone(),
            content: feedback.content.clone(),
        }
    }
}
