//! Job listing handlers.

use std::collections::BTreeMap;

use crate::app::models::Listing;
use crate::app::validation::{self, FieldErrors};
use crate::auth::{current_user_id, is_owner};
use crate::db::{named, DbValue, NamedParams};
use crate::error::AppError;
use crate::http::request::RequestContext;
use crate::http::response::Outcome;

/// Fields a listing form may set.
pub const ALLOWED_FIELDS: &[&str] = &[
    "title",
    "description",
    "salary",
    "tags",
    "company",
    "address",
    "city",
    "state",
    "phone",
    "email",
    "requirements",
    "benefits",
];

/// Fields a listing cannot be saved without.
pub const REQUIRED_FIELDS: &[&str] = &["title", "description", "email", "city", "state", "salary"];

const LISTING_NOT_FOUND: &str = "Listing not found.";

pub async fn index(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let listings: Vec<Listing> = ctx
        .db
        .fetch_all(
            "SELECT * FROM listings ORDER BY created_at DESC, id DESC",
            &NamedParams::new(),
        )
        .await?;

    Ok(ctx
        .view("listings/index.html")
        .with("heading", "All Jobs")
        .with("listings", &listings)
        .into())
}

pub async fn create(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    Ok(ctx
        .view("listings/create.html")
        .with("errors", &FieldErrors::new())
        .with("values", &BTreeMap::<String, String>::new())
        .into())
}

/// Listings matching `keywords` and `location` from the query string.
pub async fn search(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let keywords = ctx.query.value("keywords").trim().to_string();
    let location = ctx.query.value("location").trim().to_string();

    let listings: Vec<Listing> = ctx
        .db
        .fetch_all(
            "SELECT * FROM listings \
             WHERE (title LIKE :keywords ESCAPE '\\' OR description LIKE :keywords ESCAPE '\\' \
                    OR tags LIKE :keywords ESCAPE '\\' OR company LIKE :keywords ESCAPE '\\') \
               AND (city LIKE :location ESCAPE '\\' OR state LIKE :location ESCAPE '\\') \
             ORDER BY created_at DESC, id DESC",
            &named([
                ("keywords", contains_pattern(&keywords)),
                ("location", contains_pattern(&location)),
            ]),
        )
        .await?;

    tracing::debug!(keywords = %keywords, location = %location, found = listings.len(), "Listing search");

    Ok(ctx
        .view("listings/index.html")
        .with("heading", "Search Results")
        .with("listings", &listings)
        .with("keywords", &keywords)
        .with("location", &location)
        .into())
}

pub async fn show(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let listing = find_listing(ctx).await?;
    let owner = is_owner(ctx.session, listing.user_id);

    Ok(ctx
        .view("listings/show.html")
        .with("listing", &listing)
        .with("is_owner", &owner)
        .into())
}

pub async fn store(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let values = validation::allow_list(&ctx.form, ALLOWED_FIELDS);
    let errors = validation::require(&values, REQUIRED_FIELDS);

    if !errors.is_empty() {
        return Ok(ctx
            .view("listings/create.html")
            .with("errors", &errors)
            .with("values", &values)
            .into());
    }

    let user_id = current_user_id(ctx.session)
        .ok_or_else(|| AppError::unauthorized("You must be logged in to post a listing"))?;

    let columns: Vec<&str> = values.keys().map(String::as_str).collect();
    let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    let sql = format!(
        "INSERT INTO listings (user_id, {}) VALUES (:user_id, {})",
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut params = bind_values(values);
    params.insert("user_id".to_string(), user_id.into());

    let inserted = ctx.db.execute(&sql, &params).await?;
    tracing::info!(listing_id = inserted.last_insert_id, user_id, "Listing created");

    ctx.session
        .set_flash_message("success_message", "Listing created successfully");
    Ok(Outcome::redirect("/listings"))
}

pub async fn edit(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let listing = find_listing(ctx).await?;

    if let Some(refused) = refuse_non_owner(ctx, &listing, "update") {
        return Ok(refused);
    }

    Ok(ctx
        .view("listings/edit.html")
        .with("listing_id", &listing.id)
        .with("errors", &FieldErrors::new())
        .with("values", &listing.form_values())
        .into())
}

pub async fn update(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let listing = find_listing(ctx).await?;

    if let Some(refused) = refuse_non_owner(ctx, &listing, "update") {
        return Ok(refused);
    }

    let values = validation::allow_list(&ctx.form, ALLOWED_FIELDS);
    let errors = validation::require(&values, REQUIRED_FIELDS);

    if !errors.is_empty() {
        let mut shown = listing.form_values();
        shown.extend(values);
        return Ok(ctx
            .view("listings/edit.html")
            .with("listing_id", &listing.id)
            .with("errors", &errors)
            .with("values", &shown)
            .into());
    }

    let assignments: Vec<String> = values.keys().map(|c| format!("{c} = :{c}")).collect();
    let sql = format!("UPDATE listings SET {} WHERE id = :id", assignments.join(", "));

    let mut params = bind_values(values);
    params.insert("id".to_string(), listing.id.into());

    ctx.db.execute(&sql, &params).await?;
    tracing::info!(listing_id = listing.id, "Listing updated");

    ctx.session
        .set_flash_message("success_message", "Listing updated successfully");
    Ok(Outcome::redirect(format!("/listings/{}", listing.id)))
}

pub async fn destroy(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let listing = find_listing(ctx).await?;

    if let Some(refused) = refuse_non_owner(ctx, &listing, "delete") {
        return Ok(refused);
    }

    ctx.db
        .execute("DELETE FROM listings WHERE id = :id", &named([("id", listing.id)]))
        .await?;
    tracing::info!(listing_id = listing.id, "Listing deleted");

    ctx.session
        .set_flash_message("success_message", "Listing deleted successfully");
    Ok(Outcome::redirect("/listings"))
}

/// The listing named by the `id` route parameter.
async fn find_listing(ctx: &RequestContext<'_>) -> Result<Listing, AppError> {
    let id: i64 = ctx
        .param("id")
        .parse()
        .map_err(|_| AppError::not_found(LISTING_NOT_FOUND))?;

    ctx.db
        .fetch_optional("SELECT * FROM listings WHERE id = :id", &named([("id", id)]))
        .await?
        .ok_or_else(|| AppError::not_found(LISTING_NOT_FOUND))
}

/// Redirect back to the listing with a flash message unless the user owns it.
fn refuse_non_owner(ctx: &mut RequestContext<'_>, listing: &Listing, action: &str) -> Option<Outcome> {
    if is_owner(ctx.session, listing.user_id) {
        return None;
    }

    tracing::warn!(listing_id = listing.id, action, "Ownership check failed");
    ctx.session.set_flash_message(
        "error_message",
        format!("You are not authorized to {action} this listing"),
    );
    Some(Outcome::redirect(format!("/listings/{}", listing.id)))
}

/// `LIKE` pattern matching `text` anywhere, with its own `%` and `_` taken
/// literally. Pairs with `ESCAPE '\'`.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Empty optional values are stored as NULL.
fn bind_values(values: BTreeMap<String, String>) -> NamedParams {
    values
        .into_iter()
        .map(|(field, value)| {
            let value = if value.is_empty() {
                DbValue::Null
            } else {
                DbValue::Text(value)
            };
            (field, value)
        })
        .collect()
}
