pub(crate) mod feedback;
pub(crate) mod request;
pub(crate) mod user;

pub(crate) use feedback::{Feedback, FeedbackChanges, NewFeedback};
pub(crate) use user::{NewUser, User, Username};
