use std::collections::HashMap;

use metrics::counter;
use tokio::sync::Mutex;

use crate::share::{CardPayload, RenderError, ShareCard, ShareClient};

/// Card creation flow: at-most-once render per unique payload.
///
/// The signature key is the serialized payload itself, so the same
/// assumptions never hit the renderer twice while the process lives.
/// Holding the map lock across the render also serializes writes, which
/// keeps concurrent regenerates last-write-wins without extra locking.
pub struct CardService {
    client: ShareClient,
    rendered: Mutex<HashMap<String, ShareCard>>,
}

impl CardService {
    pub fn new(client: ShareClient) -> Self {
        Self {
            client,
            rendered: Mutex::new(HashMap::new()),
        }
    }

    /// Render the card for this payload, or return the already-rendered
    /// descriptor for an identical one.
    pub async fn ensure_card(&self, payload: &CardPayload) -> Result<ShareCard, RenderError> {
        let signature = serde_json::to_string(payload).unwrap_or_default();

        let mut rendered = self.rendered.lock().await;
        if let Some(card) = rendered.get(&signature) {
            return Ok(card.clone());
        }

        let card = self.client.create_card(payload).await?;
        counter!("cards_rendered_total").increment(1);
        tracing::info!(card_id = %card.id, wallet = %payload.wallet, "Share card rendered");
        rendered.insert(signature, card.clone());
        Ok(card)
    }

    /// Re-render an existing card id with a fresh payload (overwrites the
    /// stored image; the service treats it as idempotent).
    pub async fn regenerate(
        &self,
        card_id: &str,
        payload: &CardPayload,
    ) -> Result<ShareCard, RenderError> {
        let signature = serde_json::to_string(payload).unwrap_or_default();

        let mut rendered = self.rendered.lock().await;
        let card = self.client.regenerate_card(card_id, payload).await?;
        rendered.insert(signature, card.clone());
        Ok(card)
    }
}
