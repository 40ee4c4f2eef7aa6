pub(crate) type Username = String;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct User {
    pub(crate) username: Username,
    pub(crate) password: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl User {
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user staged for insertion. `password` already holds the bcrypt hash.
#[derive(Clone, Debug)]
pub(crate) struct NewUser {
    pub(crate) username: Username,
    pub(crate) password: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl From<NewUser> for User {
    fn from(user: NewUser) -> Self {
        User {
            username: user.username,
            password: user.password,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}
