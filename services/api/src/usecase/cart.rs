use tracing::debug;
use uuid::Uuid;

use crate::domain::repository::EngagementRepository;
use crate::domain::types::render_cart_csv;
use crate::error::ApiError;

// ── DownloadShoppingCart ─────────────────────────────────────────────────────

pub struct DownloadShoppingCartUseCase<E: EngagementRepository> {
    pub engagements: E,
}

impl<E: EngagementRepository> DownloadShoppingCartUseCase<E> {
    /// Render the aggregated shopping list. An empty cart yields the header line only.
    pub async fn execute(&self, user_id: Uuid) -> Result<String, ApiError> {
        let rows = self.engagements.aggregate_cart(user_id).await?;
        debug!(user_id = %user_id, rows = rows.len(), "shopping list aggregated");
        Ok(render_cart_csv(&rows))
    }
}
