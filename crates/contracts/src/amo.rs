use serde::{Deserialize, Serialize};

/// Одно значение дополнительного поля сделки.
///
/// AmoCRM отдаёт значение как строку, число или boolean,
/// поэтому храним его как `serde_json::Value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: serde_json::Value,
}

/// Дополнительное поле сделки: имя поля плюс список значений.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub field_name: String,
    pub values: Vec<FieldValue>,
}

/// Сделка (заявка) из AmoCRM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<i64>,
    pub responsible_user_id: i64,
    /// Unix-время создания сделки в секундах
    pub created_at: i64,
    pub pipeline_id: i64,
    pub status_id: i64,
    #[serde(default)]
    pub custom_fields_values: Vec<CustomFieldValue>,
}

impl Lead {
    /// Достаёт значение дополнительного поля по названию.
    ///
    /// Берётся первое значение первого поля с подходящим именем.
    /// Если поля нет или список значений пуст — `None`.
    pub fn custom_field(&self, field_name: &str) -> Option<String> {
        self.custom_fields_values
            .iter()
            .find(|f| f.field_name == field_name)
            .and_then(|f| f.values.first())
            .and_then(|v| match &v.value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
    }
}

/// Менеджер с привязанными к нему сделками
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

/// Воронка продаж: отчёты ищут воронку по точному названию
/// ("Студенты <год>", "Воронка"), поэтому имя — рабочий идентификатор.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: i64,
    pub name: String,
}

/// Ответ `GET /api/amo`: менеджеры с уже привязанными сделками плюс воронки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmoSnapshot {
    pub users: Vec<User>,
    pub pipelines: Vec<Pipeline>,
}

/// Тело ошибки `500 { "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead_with_fields(fields: Vec<CustomFieldValue>) -> Lead {
        Lead {
            id: 1,
            name: "Заявка".into(),
            price: None,
            responsible_user_id: 10,
            created_at: 0,
            pipeline_id: 100,
            status_id: 1,
            custom_fields_values: fields,
        }
    }

    #[test]
    fn custom_field_returns_first_value_of_first_match() {
        let lead = lead_with_fields(vec![
            CustomFieldValue {
                field_name: "Форма".into(),
                values: vec![
                    FieldValue { value: json!("Очная") },
                    FieldValue { value: json!("Заочная") },
                ],
            },
            CustomFieldValue {
                field_name: "Форма".into(),
                values: vec![FieldValue { value: json!("Вечерняя") }],
            },
        ]);
        assert_eq!(lead.custom_field("Форма").as_deref(), Some("Очная"));
    }

    #[test]
    fn custom_field_missing_or_empty_is_none() {
        let lead = lead_with_fields(vec![CustomFieldValue {
            field_name: "База".into(),
            values: vec![],
        }]);
        assert_eq!(lead.custom_field("База"), None);
        assert_eq!(lead.custom_field("Специальность"), None);
    }

    #[test]
    fn custom_field_stringifies_numbers() {
        let lead = lead_with_fields(vec![CustomFieldValue {
            field_name: "База".into(),
            values: vec![FieldValue { value: json!(9) }],
        }]);
        assert_eq!(lead.custom_field("База").as_deref(), Some("9"));
    }

    #[test]
    fn lead_parses_without_custom_fields() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 5,
            "name": "Сделка",
            "responsible_user_id": 2,
            "created_at": 1740000000,
            "pipeline_id": 7,
            "status_id": 142
        }))
        .expect("lead without custom_fields_values must parse");
        assert!(lead.custom_fields_values.is_empty());
        assert_eq!(lead.price, None);
    }
}
