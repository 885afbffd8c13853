//! Store registration, staff login and staff management

use shared::error::{AppError, ErrorCode};
use shared::models::{
    LoginRequest, LoginResponse, StaffRole, StaffUser, StaffUserCreate, Store, StoreRegister,
    StoreUpdate, is_valid_slug,
};
use shared::realtime::{ChangeAction, Entity};

use crate::auth::StaffIdentity;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, verify_password};
use crate::db;
use crate::db::users::NewUser;
use crate::error::{ServiceResult, on_unique_violation};
use crate::state::AppState;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email,
    validate_money, validate_optional_text, validate_password, validate_required_text,
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token(state: &AppState, user: StaffUser) -> ServiceResult<LoginResponse> {
    let (token, expires_at) = create_token(&user, &state.jwt_secret).map_err(|e| {
        tracing::error!(user_id = user.id, "JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(LoginResponse {
        token,
        expires_at,
        user,
    })
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

/// Create a store with its first admin and log that admin in
pub async fn register_store(state: &AppState, req: &StoreRegister) -> ServiceResult<LoginResponse> {
    let slug = req.slug.trim().to_lowercase();
    if !is_valid_slug(&slug) {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "Slug must be 3-48 characters of a-z, 0-9 and '-'",
        )
        .with_detail("field", "slug")
        .into());
    }
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&req.admin_name, "admin_name", MAX_NAME_LEN)?;
    let email = normalize_email(&req.admin_email);
    validate_email(&email)?;
    validate_password(&req.admin_password)?;

    let password_hash = hash(&req.admin_password)?;
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let store: Store = db::stores::create(&mut *tx, &slug, req.name.trim(), now)
        .await
        .map_err(|e| {
            on_unique_violation(e, || {
                AppError::new(ErrorCode::StoreSlugExists).with_detail("slug", slug.clone())
            })
        })?;
    let admin = db::users::create(
        &mut *tx,
        store.id,
        &NewUser {
            name: req.admin_name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: StaffRole::Admin,
            driver_id: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(store_id = store.id, slug = %store.slug, "Store registered");
    issue_token(state, admin)
}

/// Staff login. Unknown store, unknown email and wrong password are
/// reported the same way.
pub async fn login(state: &AppState, req: &LoginRequest) -> ServiceResult<LoginResponse> {
    let slug = req.store_slug.trim().to_lowercase();
    let email = normalize_email(&req.email);

    let store = db::stores::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    let creds = db::users::find_credentials(&state.pool, store.id, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &creds.password_hash) {
        tracing::info!(store_id = store.id, "Login rejected: wrong password");
        return Err(AppError::invalid_credentials().into());
    }
    if !creds.user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    tracing::info!(store_id = store.id, user_id = creds.user.id, role = %creds.user.role, "Staff logged in");
    issue_token(state, creds.user)
}

/// Current user, re-read so deactivation shows up before the token expires
pub async fn me(state: &AppState, identity: &StaffIdentity) -> ServiceResult<StaffUser> {
    let user = db::users::find_by_id(&state.pool, identity.store_id, identity.user_id)
        .await?
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }
    Ok(user)
}

pub async fn list_staff(state: &AppState, store_id: i64) -> ServiceResult<Vec<StaffUser>> {
    Ok(db::users::list(&state.pool, store_id).await?)
}

/// Create a staff account. Driver accounts must link a driver of the store.
pub async fn create_staff(
    state: &AppState,
    store_id: i64,
    req: &StaffUserCreate,
) -> ServiceResult<StaffUser> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    validate_password(&req.password)?;

    match (req.role, req.driver_id) {
        (StaffRole::Driver, Some(driver_id)) => {
            db::drivers::find(&state.pool, store_id, driver_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::DriverNotFound).with_detail("driver_id", driver_id)
                })?;
        }
        (StaffRole::Driver, None) => {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Driver accounts need a driver_id",
            )
            .with_detail("field", "driver_id")
            .into());
        }
        (_, Some(_)) => {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "Only driver accounts can link a driver",
            )
            .with_detail("field", "driver_id")
            .into());
        }
        (_, None) => {}
    }

    let password_hash = hash(&req.password)?;
    let user = db::users::create(
        &state.pool,
        store_id,
        &NewUser {
            name: req.name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: req.role,
            driver_id: req.driver_id,
        },
    )
    .await
    .map_err(|e| {
        on_unique_violation(e, || {
            AppError::already_exists("Staff user").with_detail("email", email.clone())
        })
    })?;

    tracing::info!(store_id, user_id = user.id, role = %user.role, "Staff user created");
    Ok(user)
}

fn reject_self(identity: &StaffIdentity, user_id: i64) -> Result<(), AppError> {
    if identity.user_id == user_id {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "You cannot change your own account here",
        ));
    }
    Ok(())
}

pub async fn set_staff_active(
    state: &AppState,
    identity: &StaffIdentity,
    user_id: i64,
    is_active: bool,
) -> ServiceResult<StaffUser> {
    reject_self(identity, user_id)?;
    let user = db::users::set_active(&state.pool, identity.store_id, user_id, is_active)
        .await?
        .ok_or_else(|| AppError::not_found("Staff user"))?;
    state.accounts.remember(user.id, user.is_active);
    tracing::info!(store_id = identity.store_id, user_id, is_active, "Staff user updated");
    Ok(user)
}

pub async fn delete_staff(
    state: &AppState,
    identity: &StaffIdentity,
    user_id: i64,
) -> ServiceResult<()> {
    reject_self(identity, user_id)?;
    if !db::users::delete(&state.pool, identity.store_id, user_id).await? {
        return Err(AppError::not_found("Staff user").into());
    }
    state.accounts.remember(user_id, false);
    tracing::info!(store_id = identity.store_id, user_id, "Staff user deleted");
    Ok(())
}

/// Store settings readable by any staff member
pub async fn store_settings(state: &AppState, store_id: i64) -> ServiceResult<Store> {
    Ok(db::stores::find_by_id(&state.pool, store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?)
}

pub async fn update_store(
    state: &AppState,
    store_id: i64,
    req: &StoreUpdate,
) -> ServiceResult<Store> {
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.logo_url, "logo_url", MAX_URL_LEN)?;
    if let Some(min) = req.min_order_value {
        validate_money(min, "min_order_value")?;
    }

    let store = db::stores::update(&state.pool, store_id, req)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    tracing::info!(store_id, is_open = store.is_open, "Store settings updated");
    state
        .realtime
        .notify(store_id, Entity::Store, ChangeAction::Update, store_id);
    Ok(store)
}
