use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use foodgram_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    cart::download_shopping_cart,
    engagement::{add_favorite, add_to_shopping_cart, remove_favorite, remove_from_shopping_cart},
    health::{healthz, readyz},
    ingredient::{create_ingredient, get_ingredient, list_ingredients},
    recipe::{create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe},
    subscription::{list_subscriptions, subscribe, unsubscribe},
    tag::{create_tag, get_tag, list_tags},
    user::{create_user, get_me, get_user, list_users, set_password},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let media = media_mount(&state.images.url_prefix).map(|mount| (mount, state.images.root.clone()));

    let mut router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/me", get(get_me))
        .route("/api/users/set_password", post(set_password))
        .route("/api/users/subscriptions", get(list_subscriptions))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
        // Catalog
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", get(get_tag))
        .route("/api/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/api/ingredients/{id}", get(get_ingredient))
        // Recipes
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/download_shopping_cart",
            get(download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        .with_state(state);

    if let Some((mount, root)) = media {
        router = router.nest_service(&mount, ServeDir::new(root));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer()),
    )
}

/// Path to mount the media directory at, when `MEDIA_URL` is a local path.
fn media_mount(media_url: &str) -> Option<String> {
    let mount = media_url.trim_end_matches('/');
    (mount.starts_with('/') && mount.len() > 1).then(|| mount.to_owned())
}
