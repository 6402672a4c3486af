use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::cart::DownloadShoppingCartUseCase;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const CSV_DISPOSITION: &str = "attachment; filename=\"shopping_list.csv\"";

// ── GET /api/recipes/download_shopping_cart ──────────────────────────────────

pub async fn download_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let usecase = DownloadShoppingCartUseCase {
        engagements: state.engagement_repo(),
    };
    let csv = usecase.execute(identity.user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        csv,
    )
        .into_response())
}
