//! The job board application: its route table and handlers.

pub mod home;
pub mod listings;
pub mod models;
pub mod users;
pub mod validation;

use std::future::Future;

use crate::error::AppError;
use crate::http::dispatcher::Handler;
use crate::http::request::RequestContext;
use crate::http::response::Outcome;
use crate::routing::Router;

/// Every handler a route can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    HomeIndex,
    ListingsIndex,
    ListingsCreate,
    ListingsEdit,
    ListingsSearch,
    ListingsShow,
    ListingsStore,
    ListingsUpdate,
    ListingsDestroy,
    UsersCreate,
    UsersLogin,
    UsersStore,
    UsersLogout,
    UsersAuthenticate,
}

impl Handler for Action {
    fn call<'a, 'b>(
        &'a self,
        ctx: &'a mut RequestContext<'b>,
    ) -> impl Future<Output = Result<Outcome, AppError>> + Send + 'a
    where
        'b: 'a,
    {
        async move {
            match self {
                Action::HomeIndex => home::index(ctx).await,
                Action::ListingsIndex => listings::index(ctx).await,
                Action::ListingsCreate => listings::create(ctx).await,
                Action::ListingsEdit => listings::edit(ctx).await,
                Action::ListingsSearch => listings::search(ctx).await,
                Action::ListingsShow => listings::show(ctx).await,
                Action::ListingsStore => listings::store(ctx).await,
                Action::ListingsUpdate => listings::update(ctx).await,
                Action::ListingsDestroy => listings::destroy(ctx).await,
                Action::UsersCreate => users::create(ctx).await,
                Action::UsersLogin => users::login(ctx).await,
                Action::UsersStore => users::store(ctx).await,
                Action::UsersLogout => users::logout(ctx).await,
                Action::UsersAuthenticate => users::authenticate(ctx).await,
            }
        }
    }
}

/// The application's routes, in match order.
///
/// Order matters: `/listings/create` and `/listings/search` must stay above
/// `/listings/{id}` or the placeholder swallows them.
pub fn routes() -> Router<Action> {
    let mut router = Router::new();
    router
        .get("/", Action::HomeIndex, &[])
        .get("/listings", Action::ListingsIndex, &[])
        .get("/listings/create", Action::ListingsCreate, &["auth"])
        .get("/listings/edit/{id}", Action::ListingsEdit, &["auth"])
        .get("/listings/search", Action::ListingsSearch, &[])
        .get("/listings/{id}", Action::ListingsShow, &[])
        .post("/listings", Action::ListingsStore, &["auth"])
        .put("/listings/{id}", Action::ListingsUpdate, &["auth"])
        .delete("/listings/{id}", Action::ListingsDestroy, &["auth"])
        .get("/auth/register", Action::UsersCreate, &["guest"])
        .get("/auth/login", Action::UsersLogin, &["guest"])
        .post("/auth/register", Action::UsersStore, &["guest"])
        .post("/auth/logout", Action::UsersLogout, &["auth"])
        .post("/auth/login", Action::UsersAuthenticate, &["guest"]);
    router
}
