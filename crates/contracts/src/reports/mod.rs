//! Агрегация отчётов поверх снимка данных AmoCRM.
//!
//! Обе функции чистые: пересчитываются целиком при каждом изменении
//! фильтров, ничего не кэшируют и не мутируют входные данные.

pub mod enrollment;
pub mod payment;

use chrono::{Datelike, TimeZone, Utc};

use crate::amo::Pipeline;

/// Проверка сделки по фильтрам месяца и года.
///
/// `month` — номер месяца 0..=11, `None` означает "все месяцы",
/// `None` в `year` — "все года". Дата считается по UTC.
pub(crate) fn matches_period(created_at: i64, month: Option<u32>, year: Option<i32>) -> bool {
    let date = match Utc.timestamp_opt(created_at, 0) {
        chrono::LocalResult::Single(d) => d,
        _ => return false,
    };
    let matches_month = month.map_or(true, |m| date.month0() == m);
    let matches_year = year.map_or(true, |y| date.year() == y);
    matches_month && matches_year
}

/// Ищет воронку по точному названию
pub(crate) fn find_pipeline_id(pipelines: &[Pipeline], name: &str) -> Option<i64> {
    pipelines.iter().find(|p| p.name == name).map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-15 12:00:00 UTC
    const MARCH_2025: i64 = 1742040000;

    #[test]
    fn matches_period_with_wildcards() {
        assert!(matches_period(MARCH_2025, None, None));
        assert!(matches_period(MARCH_2025, Some(2), None));
        assert!(matches_period(MARCH_2025, None, Some(2025)));
        assert!(matches_period(MARCH_2025, Some(2), Some(2025)));
    }

    #[test]
    fn matches_period_rejects_other_month_or_year() {
        assert!(!matches_period(MARCH_2025, Some(3), Some(2025)));
        assert!(!matches_period(MARCH_2025, Some(2), Some(2024)));
    }

    #[test]
    fn find_pipeline_id_is_exact_match() {
        let pipelines = vec![
            Pipeline { id: 1, name: "Студенты 2025".into() },
            Pipeline { id: 2, name: "Воронка".into() },
        ];
        assert_eq!(find_pipeline_id(&pipelines, "Воронка"), Some(2));
        assert_eq!(find_pipeline_id(&pipelines, "Студенты 2025"), Some(1));
        assert_eq!(find_pipeline_id(&pipelines, "студенты 2025"), None);
        assert_eq!(find_pipeline_id(&pipelines, "Студенты"), None);
    }
}
