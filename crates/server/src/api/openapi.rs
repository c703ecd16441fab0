//! OpenAPI/Utoipa configuration.

use crate::api::{health::MISC_TAG, relay::RELAY_TAG};
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Telegram Relay API",
        version = "1.0.0",
        description = "Relays message text to the Telegram Bot API and keeps a local log of every attempt."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = RELAY_TAG, description = "Message relay and send history")
    )
)]
pub struct ApiDoc;
