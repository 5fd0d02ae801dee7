use crate::app::models::Listing;
use crate::db::NamedParams;
use crate::error::AppError;
use crate::http::request::RequestContext;
use crate::http::response::Outcome;

/// Number of listings on the home page.
const LATEST: i64 = 6;

pub async fn index(ctx: &mut RequestContext<'_>) -> Result<Outcome, AppError> {
    let mut params = NamedParams::new();
    params.insert("limit".into(), LATEST.into());

    let listings: Vec<Listing> = ctx
        .db
        .fetch_all(
            "SELECT * FROM listings ORDER BY created_at DESC, id DESC LIMIT :limit",
            &params,
        )
        .await?;

    Ok(ctx.view("home.html").with("listings", &listings).into())
}
