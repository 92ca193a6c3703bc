use axum::{http::StatusCode, Json};
use contracts::amo::{AmoSnapshot, ErrorResponse};

use crate::shared::amocrm::{AmoClient, AmoError};
use crate::shared::config;

/// GET /api/amo
///
/// Снимок данных AmoCRM: менеджеры с привязанными сделками плюс воронки.
/// Любая ошибка любого из трёх запросов схлопывается в один общий
/// ответ 500; различие (структура воронок или сеть/разбор) остаётся
/// только в логах.
pub async fn get_snapshot() -> Result<Json<AmoSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let config = config::get();

    let result = match AmoClient::new(&config.amo) {
        Ok(client) => client.fetch_snapshot().await,
        Err(e) => Err(AmoError::Upstream(e.to_string())),
    };

    match result {
        Ok(snapshot) => {
            tracing::info!(
                "AmoCRM: снимок получен, {} менеджеров, {} воронок",
                snapshot.users.len(),
                snapshot.pipelines.len()
            );
            Ok(Json(snapshot))
        }
        Err(e) => {
            tracing::error!("Ошибка при загрузке данных из AmoCRM: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: "Ошибка получения данных".to_string() }),
            ))
        }
    }
}
