//! HTTP-клиент для AmoCRM API v4.
//!
//! За один снимок выполняются три последовательных запроса: менеджеры,
//! сделки с дополнительными полями и воронки. Сделки привязываются к
//! менеджерам по `responsible_user_id` один раз на сервере. Частичных
//! результатов нет: любая ошибка роняет весь снимок.

use contracts::amo::{AmoSnapshot, Lead, Pipeline, User};
use serde::Deserialize;
use thiserror::Error;

use super::config::AmoConfig;

#[derive(Debug, Error)]
pub enum AmoError {
    /// Ответ по воронкам не содержит массива `_embedded.pipelines`
    #[error("ошибка структуры данных воронок AmoCRM")]
    PipelineShape,
    /// Сетевая ошибка или тело, которое не разбирается в ожидаемую форму
    #[error("ошибка обращения к AmoCRM: {0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct UsersEmbedded {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    #[serde(rename = "_embedded")]
    embedded: UsersEmbedded,
}

#[derive(Debug, Deserialize)]
struct LeadsEmbedded {
    leads: Vec<Lead>,
}

#[derive(Debug, Deserialize)]
struct LeadsEnvelope {
    #[serde(rename = "_embedded")]
    embedded: LeadsEmbedded,
}

pub struct AmoClient {
    client: reqwest::Client,
    base_url: String,
    secret_token: String,
}

impl AmoClient {
    pub fn new(config: &AmoConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_token: config.secret_token.clone(),
        })
    }

    /// Забирает менеджеров, сделки и воронки и собирает их в один снимок.
    ///
    /// Без повторов, без пагинации и без кэша: каждая страница отчёта
    /// делает три исходящих запроса.
    pub async fn fetch_snapshot(&self) -> Result<AmoSnapshot, AmoError> {
        let users_raw = self.get_json("/api/v4/users").await?;
        let leads_raw = self.get_json("/api/v4/leads?with=custom_fields").await?;
        let pipelines_raw = self.get_json("/api/v4/leads/pipelines").await?;

        // Защита от ошибок структуры: сначала проверяем форму воронок
        let pipelines = parse_pipelines(&pipelines_raw)?;

        let users: UsersEnvelope = serde_json::from_value(users_raw)
            .map_err(|e| AmoError::Upstream(format!("невалидный ответ по менеджерам: {e}")))?;
        let leads: LeadsEnvelope = serde_json::from_value(leads_raw)
            .map_err(|e| AmoError::Upstream(format!("невалидный ответ по сделкам: {e}")))?;

        Ok(AmoSnapshot {
            users: join_leads(users.embedded.users, leads.embedded.leads),
            pipelines,
        })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, AmoError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("AmoCRM: GET {url}");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AmoError::Upstream(format!("запрос {url} не выполнен: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AmoError::Upstream(format!(
                "AmoCRM вернул HTTP {} на {url}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AmoError::Upstream(format!("невалидный JSON от {url}: {e}")))
    }
}

/// Проверяет, что `_embedded.pipelines` — массив, и разбирает записи
fn parse_pipelines(raw: &serde_json::Value) -> Result<Vec<Pipeline>, AmoError> {
    let records = raw
        .pointer("/_embedded/pipelines")
        .and_then(|v| v.as_array())
        .ok_or(AmoError::PipelineShape)?;

    records
        .iter()
        .map(|record| {
            serde_json::from_value(record.clone())
                .map_err(|e| AmoError::Upstream(format!("невалидная запись воронки: {e}")))
        })
        .collect()
}

/// Раздаёт сделки менеджерам по `responsible_user_id`
fn join_leads(users: Vec<User>, leads: Vec<Lead>) -> Vec<User> {
    users
        .into_iter()
        .map(|mut user| {
            user.leads = leads
                .iter()
                .filter(|lead| lead.responsible_user_id == user.id)
                .cloned()
                .collect();
            user
        })
        .collect()
}
