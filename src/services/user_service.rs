use tracing::info;

use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::traits::UserRepository;

pub struct UserService<R: UserRepository> {
    repository: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Register a new user by name
    pub fn register(&self, name: &str) -> GatorResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatorError::InvalidArgs("user name cannot be empty".to_string()));
        }

        let user = self.repository.create_user(&User::new(name.to_string()))?;
        info!(user = %user.name, id = %user.id, "registered user");
        Ok(user)
    }

    /// Resolve the authenticated user for follow-scoped commands
    pub fn get(&self, name: &str) -> GatorResult<User> {
        self.repository.get_user_by_name(name)
    }

    /// List all users
    pub fn list(&self) -> GatorResult<Vec<User>> {
        self.repository.get_users()
    }

    /// Remove every user along with their feeds and follows
    pub fn reset(&self) -> GatorResult<usize> {
        let removed = self.repository.reset()?;
        info!(removed, "reset users");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::MockUserRepository;

    #[test]
    fn test_register_trims_name() {
        let mut repo = MockUserRepository::new();
        repo.expect_create_user()
            .withf(|user| user.name == "lane")
            .times(1)
            .returning(|user| Ok(user.clone()));

        let service = UserService::new(repo);
        let user = service.register("  lane ").unwrap();
        assert_eq!(user.name, "lane");
    }

    #[test]
    fn test_register_empty_name_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_create_user().never();

        let service = UserService::new(repo);
        let result = service.register("   ");
        assert!(matches!(result, Err(GatorError::InvalidArgs(_))));
    }

    #[test]
    fn test_register_duplicate_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_create_user()
            .returning(|user| Err(GatorError::DuplicateKey(format!("user {}", user.name))));

        let service = UserService::new(repo);
        let result = service.register("lane");
        assert!(matches!(result, Err(GatorError::DuplicateKey(_))));
    }
}
