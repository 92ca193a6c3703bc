//! Запросы страниц отчётов к бэкенду.

use contracts::amo::{AmoSnapshot, ErrorResponse};
use gloo_net::http::Request;

/// Снимок данных AmoCRM. Запрашивается один раз при открытии страницы
/// отчёта; обновление данных — только перезагрузкой страницы.
pub async fn fetch_snapshot() -> Result<AmoSnapshot, String> {
    let response = Request::get("/api/amo")
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("HTTP {}", response.status()));
        return Err(message);
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
