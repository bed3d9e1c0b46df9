//! User accounts
//!
//! Passwords are stored as Argon2 PHC strings and never leave the registry;
//! every public view of an account is a `User`, which carries no hash.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::UserError;

/// Identifier of a user account
pub type UserId = i64;

/// Role label the registration form sends for administrators
const ADMIN_LABEL: &str = "Administrador";

/// Access level of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Map a role label from the registration form
    pub fn from_label(label: &str) -> Self {
        if label == ADMIN_LABEL {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub photo: Option<String>,
    pub role: Role,
    pub notes: Option<String>,
}

/// Registration data
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default, alias = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "senha")]
    pub password: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default, alias = "celular")]
    pub phone: String,
    #[serde(default, alias = "foto")]
    pub photo: Option<String>,
    /// Role label; only `"Administrador"` grants admin
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Account changes; `None` leaves a field untouched
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
    pub cpf: Option<String>,
    #[serde(alias = "celular")]
    pub phone: Option<String>,
    #[serde(alias = "foto")]
    pub photo: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
}

struct Account {
    user: User,
    password_hash: String,
}

struct Accounts {
    next_id: UserId,
    by_id: BTreeMap<UserId, Account>,
}

impl Accounts {
    fn email_in_use(&self, email: &str, except: Option<UserId>) -> bool {
        self.by_id
            .values()
            .any(|account| account.user.email == email && Some(account.user.id) != except)
    }
}

/// Thread-safe in-memory user registry
pub struct UserRegistry {
    accounts: RwLock<Accounts>,
    hasher: Argon2<'static>,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRegistry {
    /// Create an empty registry; the first user gets id 1
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(Accounts {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
            hasher: Argon2::default(),
        }
    }

    /// Create an account
    ///
    /// Name, email, password, cpf and phone are required. The email must not
    /// belong to another account.
    pub fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        for (field, value) in [
            ("name", &new_user.name),
            ("email", &new_user.email),
            ("password", &new_user.password),
            ("cpf", &new_user.cpf),
            ("phone", &new_user.phone),
        ] {
            if value.trim().is_empty() {
                return Err(UserError::MissingField(field));
            }
        }

        let password_hash = self.hash_password(&new_user.password)?;

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.email_in_use(&new_user.email, None) {
            return Err(UserError::EmailTaken(new_user.email));
        }

        let id = accounts.next_id;
        accounts.next_id += 1;

        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            cpf: new_user.cpf,
            phone: new_user.phone,
            photo: new_user.photo,
            role: new_user.role.as_deref().map(Role::from_label).unwrap_or_default(),
            notes: new_user.notes,
        };
        accounts.by_id.insert(
            id,
            Account {
                user: user.clone(),
                password_hash,
            },
        );

        info!("Registered user {} ({:?})", id, user.role);
        Ok(user)
    }

    /// Check credentials and return the account
    ///
    /// Unknown email and wrong password fail the same way.
    pub fn login(&self, email: &str, password: &str) -> Result<User, UserError> {
        let (user, password_hash) = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            let account = accounts
                .by_id
                .values()
                .find(|account| account.user.email == email)
                .ok_or(UserError::InvalidCredentials)?;
            (account.user.clone(), account.password_hash.clone())
        };

        let parsed = PasswordHash::new(&password_hash).map_err(|e| UserError::Hash(e.to_string()))?;
        self.hasher
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| UserError::InvalidCredentials)?;

        debug!("User {} logged in", user.id);
        Ok(user)
    }

    /// Fetch an account
    pub fn find_by_id(&self, id: UserId) -> Result<User, UserError> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .by_id
            .get(&id)
            .map(|account| account.user.clone())
            .ok_or(UserError::NotFound { id })
    }

    /// All accounts ordered by id
    pub fn list(&self) -> Vec<User> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .by_id
            .values()
            .map(|account| account.user.clone())
            .collect()
    }

    /// Change an account
    pub fn update(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        let password_hash = match &update.password {
            Some(password) if !password.is_empty() => Some(self.hash_password(password)?),
            _ => None,
        };

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if !accounts.by_id.contains_key(&id) {
            return Err(UserError::NotFound { id });
        }
        if let Some(email) = &update.email {
            if accounts.email_in_use(email, Some(id)) {
                return Err(UserError::EmailTaken(email.clone()));
            }
        }

        let account = accounts
            .by_id
            .get_mut(&id)
            .ok_or(UserError::NotFound { id })?;
        let user = &mut account.user;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(cpf) = update.cpf {
            user.cpf = cpf;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        if let Some(photo) = update.photo {
            user.photo = Some(photo);
        }
        if let Some(role) = update.role {
            user.role = Role::from_label(&role);
        }
        if let Some(notes) = update.notes {
            user.notes = Some(notes);
        }
        if let Some(hash) = password_hash {
            account.password_hash = hash;
        }

        debug!("Updated user {}", id);
        Ok(account.user.clone())
    }

    /// Remove an account
    pub fn delete(&self, id: UserId) -> Result<(), UserError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.by_id.remove(&id).is_none() {
            return Err(UserError::NotFound { id });
        }
        debug!("Deleted user {}", id);
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::Hash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Maria Souza".to_string(),
            email: email.to_string(),
            password: "s3nha-forte".to_string(),
            cpf: "123.456.789-00".to_string(),
            phone: "+55 11 99999-0000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_and_login() {
        let registry = UserRegistry::new();
        let user = registry.register(new_user("maria@example.com")).unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.role, Role::User);
        assert_eq!(
            registry.login("maria@example.com", "s3nha-forte").unwrap(),
            user
        );
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let registry = UserRegistry::new();
        registry.register(new_user("maria@example.com")).unwrap();

        assert!(matches!(
            registry.login("maria@example.com", "wrong"),
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            registry.login("nobody@example.com", "s3nha-forte"),
            Err(UserError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_required_fields() {
        let registry = UserRegistry::new();
        let mut user = new_user("maria@example.com");
        user.phone = String::new();

        assert!(matches!(
            registry.register(user),
            Err(UserError::MissingField("phone"))
        ));
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let registry = UserRegistry::new();
        registry.register(new_user("maria@example.com")).unwrap();

        assert!(matches!(
            registry.register(new_user("maria@example.com")),
            Err(UserError::EmailTaken(_))
        ));
    }

    #[test]
    fn test_role_from_label() {
        let registry = UserRegistry::new();
        let admin: NewUser = serde_json::from_value(json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "senha": "pw",
            "cpf": "1",
            "celular": "2",
            "role": "Administrador"
        }))
        .unwrap();

        assert_eq!(registry.register(admin).unwrap().role, Role::Admin);
        assert_eq!(Role::from_label("admin"), Role::User);
    }

    #[test]
    fn test_user_view_has_no_password() {
        let registry = UserRegistry::new();
        let user = registry.register(new_user("maria@example.com")).unwrap();
        let value = serde_json::to_value(user).unwrap();

        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], json!("user"));
    }

    #[test]
    fn test_update_rehashes_password() {
        let registry = UserRegistry::new();
        let user = registry.register(new_user("maria@example.com")).unwrap();

        let updated = registry
            .update(
                user.id,
                UserUpdate {
                    name: Some("Maria S.".to_string()),
                    password: Some("nova-senha".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Maria S.");
        assert_eq!(updated.email, "maria@example.com");
        assert!(registry.login("maria@example.com", "s3nha-forte").is_err());
        assert!(registry.login("maria@example.com", "nova-senha").is_ok());
    }

    #[test]
    fn test_update_email_collision() {
        let registry = UserRegistry::new();
        registry.register(new_user("maria@example.com")).unwrap();
        let joao = registry.register(new_user("joao@example.com")).unwrap();

        let result = registry.update(
            joao.id,
            UserUpdate {
                email: Some("maria@example.com".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(UserError::EmailTaken(_))));

        // Keeping one's own email is not a collision
        let result = registry.update(
            joao.id,
            UserUpdate {
                email: Some("joao@example.com".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_delete_and_find() {
        let registry = UserRegistry::new();
        let user = registry.register(new_user("maria@example.com")).unwrap();

        registry.delete(user.id).unwrap();
        assert!(matches!(
            registry.find_by_id(user.id),
            Err(UserError::NotFound { id: 1 })
        ));
        assert!(matches!(
            registry.delete(user.id),
            Err(UserError::NotFound { .. })
        ));
    }
}
