use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::{Delivery, MessageGateway, MessagingError, OutgoingMessage};

pub fn messaging_router<M>(gateway: Arc<M>) -> Router
where
    M: MessageGateway + 'static,
{
    Router::new()
        .route("/api/v1/crm/whatsapp", post(send_handler::<M>))
        .with_state(gateway)
}

async fn send_handler<M>(
    State(gateway): State<Arc<M>>,
    Json(message): Json<OutgoingMessage>,
) -> Result<Json<Delivery>, MessagingError>
where
    M: MessageGateway + 'static,
{
    let message = message.validated()?;
    Ok(Json(gateway.send_text(&message).await?))
}
