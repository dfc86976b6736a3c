use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult, Entity, Money, UserId};

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 30;
const EMAIL_MAX: usize = 50;

/// Registration request for a new marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
}

impl RegisterUser {
    fn validate(&self) -> DomainResult<()> {
        let name_len = self.username.chars().count();
        if self.username.trim() != self.username {
            return Err(DomainError::validation(
                "username cannot start or end with whitespace",
            ));
        }
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&name_len) {
            return Err(DomainError::validation(format!(
                "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
            )));
        }

        let email = self.email.trim();
        if email.is_empty() || email.chars().count() > EMAIL_MAX {
            return Err(DomainError::validation(format!(
                "email must be 1-{EMAIL_MAX} characters"
            )));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(DomainError::validation("email must look like name@domain")),
        }
    }
}

/// A registered user and their purchasing budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    budget: Money,
    version: u64,
}

impl User {
    /// Validate a registration and create the user with `starting_budget`.
    pub fn register(cmd: &RegisterUser, starting_budget: Money) -> DomainResult<Self> {
        Self::register_with_id(UserId::new(), cmd, starting_budget)
    }

    pub fn register_with_id(
        id: UserId,
        cmd: &RegisterUser,
        starting_budget: Money,
    ) -> DomainResult<Self> {
        cmd.validate()?;
        Ok(Self {
            id,
            username: cmd.username.clone(),
            email: cmd.email.trim().to_lowercase(),
            budget: starting_budget,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Normalized (trimmed, lowercase) email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn budget(&self) -> Money {
        self.budget
    }

    pub(crate) fn set_budget(&mut self, budget: Money) {
        self.budget = budget;
        self.version += 1;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
