use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::core::error::Error;
use crate::core::store::{Insert, Store, Taken};
use crate::types::{Feedback, FeedbackChanges, NewFeedback, NewUser, User};

/// `Store` kept in process memory, with the same uniqueness and cascade rules
/// as the PostgreSQL schema.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, User>,
    feedback: BTreeMap<i32, Feedback>,
    last_id: i32,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    pub(crate) fn feedback_count(&self) -> usize {
        self.tables().feedback.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<Insert<User>, Error> {
        let mut tables = self.tables();

        if tables.users.contains_key(&user.username) {
            return Ok(Insert::Conflict(Taken::Username));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Ok(Insert::Conflict(Taken::Email));
        }

        let user = User::from(user);
        tables.users.insert(user.username.clone(), user.clone());

        Ok(Insert::Created(user))
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.tables().users.get(username).cloned())
    }

    async fn delete_user(&self, username: &str) -> Result<bool, Error> {
        let mut tables = self.tables();

        if tables.users.remove(username).is_none() {
            return Ok(false);
        }
        tables.feedback.retain(|_, f| f.username != username);

        Ok(true)
    }

    async fn get_feedback_by_user(&self, username: &str) -> Result<Vec<Feedback>, Error> {
        Ok(self
            .tables()
            .feedback
            .values()
            .rev()
            .filter(|f| f.username == username)
            .cloned()
            .collect())
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, Error> {
        let mut tables = self.tables();

        if !tables.users.contains_key(&feedback.username) {
            return Err(Error::UserNotFound);
        }

        tables.last_id += 1;
        let feedback = Feedback {
            id: tables.last_id,
            title: feedback.title,
            content: feedback.content,
            username: feedback.username,
            created_at: Utc::now(),
        };
        tables.feedback.insert(feedback.id, feedback.clone());

        Ok(feedback)
    }

    async fn get_feedback(&self, id: i32) -> Result<Option<Feedback>, Error> {
        Ok(self.tables().feedback.get(&id).cloned())
    }

    async fn update_feedback(
        &self,
        id: i32,
        changes: FeedbackChanges,
    ) -> Result<Option<Feedback>, Error> {
        let mut tables = self.tables();

        Ok(tables.feedback.get_mut(&id).map(|feedback| {
            feedback.title = changes.title;
            feedback.content = changes.content;
            feedback.clone()
        }))
    }

    async fn delete_feedback(&self, id: i32) -> Result<bool, Error> {
        Ok(self.tables().feedback.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "hash".into(),
            email: email.into(),
            first_name: "First".into(),
            last_name: "Last".into(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_username_and_email() {
        let store = MemoryStore::default();

        let created = store.insert_user(new_user("alice", "a@x.com")).await.unwrap();
        assert!(matches!(created, Insert::Created(_)));

        let dup_name = store.insert_user(new_user("alice", "b@x.com")).await.unwrap();
        assert_eq!(dup_name, Insert::Conflict(Taken::Username));

        let dup_email = store.insert_user(new_user("bobby", "a@x.com")).await.unwrap();
        assert_eq!(dup_email, Insert::Conflict(Taken::Email));

        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_feedback() {
        let store = MemoryStore::default();
        store.insert_user(new_user("alice", "a@x.com")).await.unwrap();
        store.insert_user(new_user("bobby", "b@x.com")).await.unwrap();

        for (title, username) in [("one", "alice"), ("two", "alice"), ("three", "bobby")] {
            store
                .insert_feedback(NewFeedback {
                    title: title.into(),
                    content: "text".into(),
                    username: username.into(),
                })
                .await
                .unwrap();
        }

        assert!(store.delete_user("alice").await.unwrap());
        assert!(!store.delete_user("alice").await.unwrap());

        assert!(store.get_feedback_by_user("alice").await.unwrap().is_empty());
        assert_eq!(store.feedback_count(), 1);
    }
}
