//! API service routes
//!
//! Route handlers translate the HTTP surface into store operations. Every
//! self-service handler scopes its queries through the authenticated
//! identity; the admin surface additionally passes the role gate.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{Identity, auth_middleware},
    models::{NewBook, NewUser, OrderStatus, PlacedLine},
    state::AppState,
    validation::{validate_email, validate_password, validate_price, validate_username},
};

/// Request for user sign-in
#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Request for profile update
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub address: Option<String>,
    pub avatar: Option<String>,
}

/// Request for password change
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Request for adding a book to the cart
#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub book_id: String,
}

/// Request for setting a cart line's quantity
#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub qty: i32,
}

/// One line of an order placement request. Any price field the client
/// includes is ignored; totals come from the catalog.
#[derive(Deserialize)]
pub struct PlaceOrderLine {
    pub book_id: Uuid,
    pub qty: Option<i32>,
}

/// Request for placing an order
#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub order: Vec<PlaceOrderLine>,
}

/// Request for updating an order's status (admin)
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/change-password", put(change_password))
        .route("/account", delete(delete_account))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/cart/:book_id",
            put(set_cart_quantity).delete(remove_cart_item),
        )
        .route("/favourites", get(list_favourites))
        .route(
            "/favourites/:book_id",
            put(add_favourite).delete(remove_favourite),
        )
        .route("/order", post(place_order))
        .route("/orders", get(list_my_orders).delete(clear_order_history))
        .route("/admin/books", post(add_book))
        .route("/admin/books/:id", put(update_book).delete(delete_book))
        .route("/admin/orders", get(admin_list_orders))
        .route("/admin/orders/:id", put(admin_update_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/signup", post(signup))
        .route("/sign-in", post(sign_in))
        .route("/books", get(list_books))
        .route("/books/recent", get(recent_books))
        .route("/books/:id", get(get_book))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "bookmart-api"
    }))
}

/// Create a new user account
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&payload.username).map_err(ApiError::Validation)?;
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;
    if payload.address.trim().is_empty() {
        return Err(ApiError::Validation("Address is required".to_string()));
    }

    let user = state.user_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user.profile(),
        })),
    ))
}

/// Sign in and receive the session cookie
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Sign-in attempt for user: {}", payload.username);

    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .session_service
        .issue(&user)
        .map_err(ApiError::Internal)?;
    let jar = jar.add(state.session_service.cookie(token));

    Ok((
        jar,
        Json(json!({
            "id": user.id,
            "role": user.role,
            "message": "Login successful",
        })),
    ))
}

/// Clear the session cookie
///
/// The removal cookie reuses the exact attribute set of the sign-in cookie;
/// anything else and the browser keeps the session alive.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    let jar = jar.remove(state.session_service.removal_cookie());

    Ok((jar, Json(json!({"message": "Logged out successfully"}))))
}

/// Get the authenticated user's profile, without the password hash
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user.profile()))
}

/// Update the authenticated user's address and avatar
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .update_profile(
            identity.user_id,
            payload.address.as_deref(),
            payload.avatar.as_deref(),
        )
        .await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user.profile(),
    })))
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_password(&payload.new_password).map_err(ApiError::Validation)?;

    let user = state
        .user_repository
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if !state
        .user_repository
        .verify_password(&user, &payload.old_password)?
    {
        return Err(ApiError::InvalidCredentials);
    }

    state
        .user_repository
        .change_password(identity.user_id, &payload.new_password)
        .await?;

    Ok(Json(json!({"message": "Password changed successfully"})))
}

/// Delete the authenticated user's account
///
/// Cart and favourites go with the account; order records stay.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    state.user_repository.delete(identity.user_id).await?;
    let jar = jar.remove(state.session_service.removal_cookie());

    Ok((jar, Json(json!({"message": "Account deleted"}))))
}

/// List the whole catalog
pub async fn list_books(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let books = state.book_repository.list().await?;
    Ok(Json(books))
}

/// List the most recently added books
pub async fn recent_books(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let books = state.book_repository.recent(4).await?;
    Ok(Json(books))
}

/// Get one book's details
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let book = state
        .book_repository
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Book"))?;

    Ok(Json(book))
}

fn validate_book(book: &NewBook) -> ApiResult<()> {
    if book.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if book.author.trim().is_empty() {
        return Err(ApiError::Validation("Author is required".to_string()));
    }
    validate_price(book.price).map_err(ApiError::Validation)?;
    Ok(())
}

/// Add a book to the catalog (admin)
pub async fn add_book(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<NewBook>,
) -> ApiResult<impl IntoResponse> {
    identity.require_admin()?;
    validate_book(&payload)?;

    let book = state.book_repository.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Book added", "book": book})),
    ))
}

/// Replace a book's catalog data (admin)
pub async fn update_book(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewBook>,
) -> ApiResult<impl IntoResponse> {
    identity.require_admin()?;
    validate_book(&payload)?;

    let book = state.book_repository.update(id, &payload).await?;

    Ok(Json(json!({"message": "Book updated successfully", "book": book})))
}

/// Delete a book from the catalog (admin)
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    identity.require_admin()?;

    state.book_repository.delete(id).await?;

    Ok(Json(json!({"message": "Book is deleted"})))
}

/// Get the authenticated user's cart, resolved against the catalog
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let cart = state.cart_repository.get(identity.user_id).await?;
    Ok(Json(json!({"cart": cart})))
}

/// Add one copy of a book to the cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AddToCartRequest>,
) -> ApiResult<impl IntoResponse> {
    let book_id: Uuid = payload.book_id.parse().map_err(|_| ApiError::InvalidBookId)?;

    let cart = state
        .cart_repository
        .add_item(identity.user_id, book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Book added to cart", "cart": cart})),
    ))
}

/// Set the quantity of an existing cart line
pub async fn set_cart_quantity(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<SetQuantityRequest>,
) -> ApiResult<impl IntoResponse> {
    let cart = state
        .cart_repository
        .set_quantity(identity.user_id, book_id, payload.qty)
        .await?;

    Ok(Json(json!({"message": "Cart updated", "cart": cart})))
}

/// Remove a book from the cart; idempotent
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(book_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let cart = state
        .cart_repository
        .remove_item(identity.user_id, book_id)
        .await?;

    Ok(Json(json!({"message": "Book removed from cart", "cart": cart})))
}

/// Empty the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    state.cart_repository.clear(identity.user_id).await?;
    Ok(Json(json!({"message": "Cart cleared"})))
}

/// List the authenticated user's favourite books
pub async fn list_favourites(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let favourites = state.favourite_repository.list(identity.user_id).await?;
    Ok(Json(json!({"data": favourites})))
}

/// Add a book to favourites; a no-op when already present
pub async fn add_favourite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(book_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state
        .favourite_repository
        .add(identity.user_id, book_id)
        .await?;

    Ok(Json(json!({"message": "Book added to favourites"})))
}

/// Remove a book from favourites
pub async fn remove_favourite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(book_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state
        .favourite_repository
        .remove(identity.user_id, book_id)
        .await?;

    Ok(Json(json!({"message": "Book removed from favourites"})))
}

/// Place an order from the submitted lines
///
/// The total is computed server-side from the current catalog prices; the
/// notification dispatch happens after the order is durable and never
/// affects the response.
pub async fn place_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<PlaceOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let lines: Vec<PlacedLine> = payload
        .order
        .into_iter()
        .map(|line| PlacedLine {
            book_id: line.book_id,
            qty: line.qty.unwrap_or(1),
        })
        .collect();

    let order = state.order_repository.place_order(&user, &lines).await?;

    state.notifier.dispatch(&order);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Order placed successfully",
            "order": order,
        })),
    ))
}

/// List the authenticated user's orders, newest first
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let orders = state.order_repository.list_for_user(identity.user_id).await?;

    Ok(Json(json!({"status": "success", "orders": orders})))
}

/// Clear the authenticated user's order history; irreversible
pub async fn clear_order_history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    state.order_repository.clear_history(identity.user_id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Order history cleared successfully",
    })))
}

/// List every order in the system (admin)
pub async fn admin_list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    identity.require_admin()?;

    let orders = state.order_repository.list_all().await?;

    Ok(Json(json!({"status": "success", "data": orders})))
}

/// Update an order's status (admin)
pub async fn admin_update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    identity.require_admin()?;

    let status: OrderStatus = payload
        .status
        .parse()
        .map_err(|_| ApiError::InvalidStatus(payload.status.clone()))?;

    let order = state.order_repository.update_status(id, status).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Status updated successfully",
        "order": order,
    })))
}
