//! Cart route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use bookshop_core::{Cart, CartItem};

use super::JsonBody;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Acknowledgement for cart mutations.
#[derive(Debug, Serialize)]
pub struct CartAck {
    pub message: &'static str,
}

/// Append an item to the caller's cart.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    JsonBody(item): JsonBody<CartItem>,
) -> Result<Json<CartAck>> {
    state.carts().add_item(&user_id, item).await?;
    Ok(Json(CartAck {
        message: "Item added to cart",
    }))
}

/// Return the caller's cart (empty if they never added anything).
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn get_cart(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Cart>> {
    Ok(Json(state.carts().get_cart(&user_id).await?))
}

/// Empty the caller's cart.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn clear_cart(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<CartAck>> {
    state.carts().clear_cart(&user_id).await?;
    Ok(Json(CartAck {
        message: "Cart cleared",
    }))
}
