//! User service - registration and lookup

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
    Argon2,
};
use database::{BaseRepository, RepositoryError, RepositoryResult};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{RegisterUser, User};

/// User service providing registration and lookup.
///
/// Credential validation for logins belongs to the upstream gateway; the
/// gateway uses `get_by_email` + `verify_password` and issues its own
/// tokens.
#[derive(Clone)]
pub struct UserService {
    users: BaseRepository<User>,
}

impl UserService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: BaseRepository::new(db),
        }
    }

    /// Initialize indexes for the users collection
    pub async fn init_indexes(&self) -> RepositoryResult<()> {
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_email_unique".to_string())
                    .build(),
            )
            .build();

        self.users.collection().create_indexes(vec![email_unique]).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    /// Register a new user
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        input.validate().map_err(RepositoryError::from)?;

        if self
            .users
            .find_one(doc! { "email": &input.email })
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(input.name, input.email, password_hash);

        let user = self.users.create(user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Get a user by id
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> UserResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Get a user by email (used by the upstream auth collaborator)
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> UserResult<User> {
        self.users
            .find_one(doc! { "email": email })
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Verify a password against a user's stored hash
    pub fn verify_password(&self, user: &User, password: &str) -> UserResult<bool> {
        let parsed =
            PasswordHash::new(&user.password_hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }
}
