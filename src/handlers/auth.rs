use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, LoginUserPayload, RegisterResponse, RegisterUserPayload, UpdatePasswordPayload,
        UpdateUsernamePayload, UserProfile,
    },
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = RegisterResponse),
        (status = 400, description = "Campos inválidos"),
        (status = 409, description = "E-mail ou nome já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    payload: Result<Json<RegisterUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = app_state
        .auth_service
        .register_user(&payload.name, &payload.email, &payload.password)
        .await?;

    let body = RegisterResponse {
        message: "Usuário registrado com sucesso.".into(),
        user: user.into(),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginUserPayload>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        message: "Login efetuado com sucesso.".into(),
        token,
        user: user.into(),
    }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Perfil do usuário", body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = app_state.auth_service.profile(&identity).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/api/users/me/password",
    tag = "Users",
    request_body = UpdatePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada"),
        (status = 401, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<UpdatePasswordPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    app_state
        .auth_service
        .update_password(&identity, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(json!({ "message": "Senha alterada com sucesso." })))
}

#[utoipa::path(
    patch,
    path = "/api/users/me/username",
    tag = "Users",
    request_body = UpdateUsernamePayload,
    responses(
        (status = 200, description = "Nome alterado", body = UserProfile),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_username(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<UpdateUsernamePayload>, JsonRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = app_state
        .auth_service
        .update_username(&identity, &payload.current_username, &payload.new_username)
        .await?;

    Ok(Json(user.into()))
}
