use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub password: String,
}

impl User {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

pub trait UserDirectory: Send + Sync {
    fn find(&self, login: &str) -> Option<User>;
}

/// 进程内固定的用户表
#[derive(Debug, Clone)]
pub struct StaticUserDirectory {
    users: HashMap<String, User>,
}

impl StaticUserDirectory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.login.clone(), user))
                .collect(),
        }
    }
}

impl Default for StaticUserDirectory {
    fn default() -> Self {
        Self::new([
            User::new("user1", "password1"),
            User::new("user2", "password2"),
            User::new("user3", "password3"),
        ])
    }
}

impl UserDirectory for StaticUserDirectory {
    fn find(&self, login: &str) -> Option<User> {
        self.users.get(login).cloned()
    }
}
