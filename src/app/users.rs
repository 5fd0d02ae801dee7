//! Registration, login and logout.

use std::collections::BTreeMap;

use crate::app::models::User;
use crate::app::validation::{self, FieldErrors};
use crate::auth::{hash_password, verify_login, SessionUser, USER_KEY};
use crate::db::{named, DbValue};
use crate::error::AppError;
use crate::http::request::RequestContext;
use crate::http::response::Outcome;

const INCORRECT_CREDENTIALS: &str = "Incorrect credentials";

pub async fn login(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    Ok(login_form(ctx, FieldErrors::new(), BTreeMap::new()))
}

pub async fn create(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    Ok(register_form(ctx, FieldErrors::new(), BTreeMap::new()))
}

/// Register an account and log it in.
pub async fn store(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let name = ctx.form.value("name").trim().to_string();
    let email = ctx.form.value("email").trim().to_string();
    let city = ctx.form.value("city").trim().to_string();
    let state = ctx.form.value("state").trim().to_string();
    let password = ctx.form.value("password").to_string();
    let confirmation = ctx.form.value("password_confirmation").to_string();

    let entered: BTreeMap<String, String> = [
        ("name", &name),
        ("email", &email),
        ("city", &city),
        ("state", &state),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.clone()))
    .collect();

    let mut errors = FieldErrors::new();
    if !validation::email(&email) {
        errors.insert("email".into(), "Please enter a valid email address".into());
    }
    if !validation::string(&name, 2, 50) {
        errors.insert("name".into(), "Name must be between 2 and 50 characters".into());
    }
    if !validation::string(&password, 6, 50) {
        errors.insert("password".into(), "Password must be at least 6 characters".into());
    }
    if !validation::matches(&password, &confirmation) {
        errors.insert("password_confirmation".into(), "Passwords do not match".into());
    }

    if !errors.is_empty() {
        return Ok(register_form(ctx, errors, entered));
    }

    let existing: Option<User> = ctx
        .db
        .fetch_optional("SELECT * FROM users WHERE email = :email", &named([("email", email.as_str())]))
        .await?;

    if existing.is_some() {
        errors.insert("email".into(), "That email already exists".into());
        return Ok(register_form(ctx, errors, entered));
    }

    let hashed = hash_password(&password)?;
    let inserted = ctx
        .db
        .execute(
            "INSERT INTO users (name, email, city, state, password) \
             VALUES (:name, :email, :city, :state, :password)",
            &named([
                ("name", DbValue::from(name.as_str())),
                ("email", email.as_str().into()),
                ("city", non_empty(&city).into()),
                ("state", non_empty(&state).into()),
                ("password", hashed.into()),
            ]),
        )
        .await?;

    tracing::info!(user_id = inserted.last_insert_id, "User registered");

    ctx.session.set(
        USER_KEY,
        SessionUser {
            id: inserted.last_insert_id,
            name,
            email,
            city: non_empty(&city).map(str::to_string),
            state: non_empty(&state).map(str::to_string),
        },
    );
    Ok(Outcome::redirect("/"))
}

/// Log in with email and password.
pub async fn authenticate(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let email = ctx.form.value("email").trim().to_string();
    let password = ctx.form.value("password").to_string();

    let mut entered = BTreeMap::new();
    entered.insert("email".to_string(), email.clone());

    let mut errors = FieldErrors::new();
    if !validation::email(&email) {
        errors.insert("email".into(), "Please enter a valid email address".into());
    }
    if !validation::string(&password, 6, 50) {
        errors.insert("password".into(), "Password must be at least 6 characters".into());
    }

    if !errors.is_empty() {
        return Ok(login_form(ctx, errors, entered));
    }

    let user: Option<User> = ctx
        .db
        .fetch_optional("SELECT * FROM users WHERE email = :email", &named([("email", email.as_str())]))
        .await?;

    let verified = verify_login(&password, user.as_ref().map(|u| u.password.as_str()));
    let Some(user) = user.filter(|_| verified) else {
        tracing::info!("Login rejected");
        errors.insert("email".into(), INCORRECT_CREDENTIALS.into());
        return Ok(login_form(ctx, errors, entered));
    };

    tracing::info!(user_id = user.id, "User logged in");
    ctx.session.set(
        USER_KEY,
        SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
            city: user.city,
            state: user.state,
        },
    );
    Ok(Outcome::redirect("/"))
}

/// Destroy the session; the response expires the cookie.
pub async fn logout(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    ctx.session.clear_all();
    Ok(Outcome::redirect("/"))
}

fn login_form(ctx: &mut RequestContext<'_>, errors: FieldErrors, values: BTreeMap<String, String>) -> Outcome {
    ctx.view("users/login.html")
        .with("errors", &errors)
        .with("values", &values)
        .into()
}

fn register_form(ctx: &mut RequestContext<'_>, errors: FieldErrors, values: BTreeMap<String, String>) -> Outcome {
    ctx.view("users/create.html")
        .with("errors", &errors)
        .with("values", &values)
        .into()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
