use std::sync::Arc;

use regex::Regex;

use crate::core::error::{self, Error};
use crate::core::store::Store;
use crate::types::request::{FormErrors, INVALID_EMAIL, INVALID_USERNAME, RegisterForm};
use crate::types::{NewUser, User};

#[derive(Clone)]
pub(crate) struct UserController {
    store: Arc<dyn Store>,
    cost: u32,
    username_pattern: Regex,
    email_pattern: Regex,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("cost", &self.cost)
            .field("username_pattern", &self.username_pattern.as_str())
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(store: Arc<dyn Store>, cost: u32) -> Result<Self, error::ConfigError> {
        Ok(Self {
            store,
            cost,
            username_pattern: Regex::new(r"^[a-zA-Z0-9_-]+$")?,
            email_pattern: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?,
        })
    }

    pub(crate) fn validate_registration(&self, form: &RegisterForm) -> FormErrors {
        let mut errors = FormErrors::default();

        if errors.required("username", &form.username)
            && errors.length("username", &form.username, 5, 20)
            && !self.username_pattern.is_match(&form.username)
        {
            errors.add("username", INVALID_USERNAME);
        }

        errors.required("password", &form.password);

        if errors.required("email", &form.email) {
            if !self.email_pattern.is_match(&form.email) {
                errors.add("email", INVALID_EMAIL);
            }
            errors.length("email", &form.email, 5, 50);
        }

        if errors.required("first_name", &form.first_name) {
            errors.length("first_name", &form.first_name, 1, 30);
        }
        if errors.required("last_name", &form.last_name) {
            errors.length("last_name", &form.last_name, 1, 30);
        }

        errors
    }

    /// Hashes the password and stages the user. Nothing is written until the
    /// caller commits the returned record.
    pub(crate) async fn register(&self, form: RegisterForm) -> Result<NewUser, Error> {
        let password = self.hash(form.password).await?;

        Ok(NewUser {
            username: form.username,
            password,
            email: form.email,
            first_name: form.first_name,
            last_name: form.last_name,
        })
    }

    /// Returns the user only if the username exists and the password matches.
    pub(crate) async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, Error> {
        let Some(user) = self.store.get_user(username).await? else {
            return Ok(None);
        };

        let password = password.to_owned();
        let hash = user.password.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        Ok(valid.then_some(user))
    }

    async fn hash(&self, value: String) -> Result<String, Error> {
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(value, cost)).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MemoryStore;
    use crate::core::store::Insert;

    fn controller() -> (Arc<MemoryStore>, UserController) {
        let store = Arc::new(MemoryStore::default());
        let controller = UserController::new(store.clone(), 4).unwrap();
        (store, controller)
    }

    fn alice() -> RegisterForm {
        RegisterForm {
            username: "alice".into(),
            password: "pw12345".into(),
            email: "a@x.com".into(),
            first_name: "Alice".into(),
            last_name: "A".into(),
        }
    }

    #[tokio::test]
    async fn register_hashes_and_authenticate_verifies() {
        let (store, controller) = controller();

        let user = controller.register(alice()).await.unwrap();
        assert_ne!(user.password, "pw12345");
        assert!(matches!(
            store.insert_user(user).await.unwrap(),
            Insert::Created(_)
        ));

        let found = controller.authenticate("alice", "pw12345").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_no_match() {
        let (store, controller) = controller();
        let user = controller.register(alice()).await.unwrap();
        store.insert_user(user).await.unwrap();

        assert_eq!(controller.authenticate("alice", "wrong").await.unwrap(), None);
        assert_eq!(controller.authenticate("nobody", "pw12345").await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_does_not_commit() {
        let (store, controller) = controller();
        controller.register(alice()).await.unwrap();

        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn registration_rules() {
        let (_, controller) = controller();

        let mut form = alice();
        assert!(controller.validate_registration(&form).is_empty());

        form.last_name = "x".repeat(31);
        assert_eq!(
            controller.validate_registration(&form).get("last_name"),
            ["Field must be between 1 and 30 characters long.".to_string()]
        );

        form.last_name = "A".into();
        form.username = "al ice".into();
        form.email = "not-an-email".into();
        let errors = controller.validate_registration(&form);
        assert_eq!(errors.get("username"), [INVALID_USERNAME.to_string()]);
        assert_eq!(errors.get("email"), [INVALID_EMAIL.to_string()]);
    }
}
