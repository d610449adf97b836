use axum::debug_handler;
use tower_sessions::Session;

use crate::{
    res::{Envelope, Success, SUCCESS},
    AppResult,
};

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<Envelope<Success>> {
    session.flush().await?;
    Ok(Envelope::ok(SUCCESS))
}
