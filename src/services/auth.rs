// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Identity, User, UserRole},
};

const BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
        }
    }

    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        if self.user_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::UsernameAlreadyExists);
        }

        let hashed_password = hash_password(password).await?;

        // A constraint UNIQUE ainda cobre a corrida entre a checagem e o INSERT
        let user = self.user_repo.create_user(name, email, &hashed_password).await?;
        tracing::info!(user_id = %user.id, "Usuário registrado");
        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id, user.role)?;
        Ok((token, user))
    }

    /// Valida a assinatura e a expiração; o papel vem do próprio token.
    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

        Ok(Identity {
            user_id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }

    pub fn create_token(&self, user_id: Uuid, role: UserRole) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user_id,
            role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub async fn profile(&self, identity: &Identity) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(identity.user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.profile(identity).await?;

        if !verify_password(current_password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let hashed = hash_password(new_password).await?;
        if self.user_repo.update_password(user.id, &hashed).await? == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn update_username(
        &self,
        identity: &Identity,
        current_username: &str,
        new_username: &str,
    ) -> Result<User, AppError> {
        let user = self.profile(identity).await?;

        if user.name != current_username {
            return Err(AppError::BadRequest("O nome de usuário atual não confere.".into()));
        }
        if user.name == new_username {
            return Ok(user);
        }
        if self.user_repo.find_by_name(new_username).await?.is_some() {
            return Err(AppError::UsernameAlreadyExists);
        }

        if self.user_repo.update_name(user.id, new_username).await? == 0 {
            return Err(AppError::UserNotFound);
        }
        self.profile(identity).await
    }
}

// bcrypt é CPU-bound: roda fora das threads do runtime
async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}
