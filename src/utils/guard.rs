/// How the session claim relates to the owner of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access<'a> {
    Anonymous,
    Owner,
    Other(&'a str),
}

pub(crate) fn check<'a>(claim: Option<&'a str>, owner: &str) -> Access<'a> {
    match claim {
        None => Access::Anonymous,
        Some(username) if username == owner => Access::Owner,
        Some(username) => Access::Other(username),
    }
}
