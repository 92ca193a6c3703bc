//! Отчёт по оплатам: сколько сделок у каждого менеджера в воронке
//! "Воронка" и сколько из них оплачено (status_id = 142).

use serde::{Deserialize, Serialize};

use super::{find_pipeline_id, matches_period};
use crate::amo::{Pipeline, User};

/// Название воронки продаж для отчёта по оплатам
pub const PAYMENT_PIPELINE_NAME: &str = "Воронка";

/// Статус AmoCRM "успешно реализовано" — сделка оплачена
pub const PAID_STATUS_ID: i64 = 142;

/// Фильтры отчёта по оплатам. `None` — без ограничения.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFilter {
    /// Месяц 0..=11
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Строка отчёта по одному менеджеру
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStats {
    pub name: String,
    pub paid: u32,
    pub total: u32,
}

impl ManagerStats {
    /// Конверсия в процентах: "0%" если сделок нет,
    /// иначе округлённое отношение оплаченных к общему числу.
    pub fn conversion(&self) -> String {
        conversion_label(self.paid, self.total)
    }
}

/// Отчёт по оплатам: по строке на менеджера в порядке списка менеджеров.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReport {
    pub rows: Vec<ManagerStats>,
}

impl PaymentReport {
    pub fn total_paid(&self) -> u32 {
        self.rows.iter().map(|r| r.paid).sum()
    }

    pub fn total_leads(&self) -> u32 {
        self.rows.iter().map(|r| r.total).sum()
    }

    /// Конверсия итоговой строки
    pub fn total_conversion(&self) -> String {
        conversion_label(self.total_paid(), self.total_leads())
    }
}

fn conversion_label(paid: u32, total: u32) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", (paid as f64 / total as f64 * 100.0).round() as u32)
}

/// Строит отчёт по оплатам.
///
/// Если воронки "Воронка" нет, у каждого менеджера остаются нули —
/// это не ошибка.
pub fn build_report(
    users: &[User],
    pipelines: &[Pipeline],
    filter: &PaymentFilter,
) -> PaymentReport {
    let pipeline_id = find_pipeline_id(pipelines, PAYMENT_PIPELINE_NAME);

    let rows = users
        .iter()
        .map(|user| {
            let mut paid = 0;
            let mut total = 0;
            if let Some(pipeline_id) = pipeline_id {
                for lead in &user.leads {
                    if !matches_period(lead.created_at, filter.month, filter.year) {
                        continue;
                    }
                    if lead.pipeline_id != pipeline_id {
                        continue;
                    }
                    total += 1;
                    if lead.status_id == PAID_STATUS_ID {
                        paid += 1;
                    }
                }
            }
            ManagerStats {
                name: user.name.clone(),
                paid,
                total,
            }
        })
        .collect();

    PaymentReport { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amo::Lead;

    // 2025-03-15 12:00:00 UTC
    const MARCH_2025: i64 = 1742040000;

    fn lead(created_at: i64, pipeline_id: i64, status_id: i64) -> Lead {
        Lead {
            id: 1,
            name: "Сделка".into(),
            price: None,
            responsible_user_id: 10,
            created_at,
            pipeline_id,
            status_id,
            custom_fields_values: vec![],
        }
    }

    fn user(id: i64, name: &str, leads: Vec<Lead>) -> User {
        User {
            id,
            name: name.into(),
            email: format!("m{id}@example.com"),
            leads,
        }
    }

    fn funnel() -> Vec<Pipeline> {
        vec![Pipeline { id: 5, name: PAYMENT_PIPELINE_NAME.into() }]
    }

    #[test]
    fn paid_and_total_are_counted_per_manager() {
        let users = vec![user(
            10,
            "Анна",
            vec![
                lead(MARCH_2025, 5, PAID_STATUS_ID),
                lead(MARCH_2025, 5, 1),
            ],
        )];
        let filter = PaymentFilter { month: Some(2), year: Some(2025) };

        let report = build_report(&users, &funnel(), &filter);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].paid, 1);
        assert_eq!(report.rows[0].total, 2);
        assert_eq!(report.rows[0].conversion(), "50%");
    }

    #[test]
    fn missing_funnel_pipeline_gives_zero_rows_per_manager() {
        let users = vec![
            user(10, "Анна", vec![lead(MARCH_2025, 5, PAID_STATUS_ID)]),
            user(20, "Борис", vec![]),
        ];
        let pipelines = vec![Pipeline { id: 5, name: "Студенты 2025".into() }];
        let filter = PaymentFilter::default();

        let report = build_report(&users, &pipelines, &filter);
        assert_eq!(report.rows.len(), 2);
        for row in &report.rows {
            assert_eq!((row.paid, row.total), (0, 0));
            assert_eq!(row.conversion(), "0%");
        }
        assert_eq!(report.total_conversion(), "0%");
    }

    #[test]
    fn rows_follow_user_order() {
        let users = vec![
            user(20, "Борис", vec![]),
            user(10, "Анна", vec![]),
        ];
        let report = build_report(&users, &funnel(), &PaymentFilter::default());
        let names: Vec<&str> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Борис", "Анна"]);
    }

    #[test]
    fn leads_outside_period_or_pipeline_are_ignored() {
        let users = vec![user(
            10,
            "Анна",
            vec![
                // другой месяц
                lead(MARCH_2025 - 40 * 86400, 5, PAID_STATUS_ID),
                // другая воронка
                lead(MARCH_2025, 6, PAID_STATUS_ID),
                lead(MARCH_2025, 5, PAID_STATUS_ID),
            ],
        )];
        let filter = PaymentFilter { month: Some(2), year: Some(2025) };

        let report = build_report(&users, &funnel(), &filter);
        assert_eq!(report.rows[0].total, 1);
        assert_eq!(report.rows[0].paid, 1);
        assert_eq!(report.rows[0].conversion(), "100%");
    }

    #[test]
    fn conversion_rounds_to_whole_percent() {
        let stats = ManagerStats { name: "Анна".into(), paid: 1, total: 3 };
        assert_eq!(stats.conversion(), "33%");
        let stats = ManagerStats { name: "Анна".into(), paid: 2, total: 3 };
        assert_eq!(stats.conversion(), "67%");
    }

    #[test]
    fn summary_row_sums_all_managers() {
        let users = vec![
            user(10, "Анна", vec![lead(MARCH_2025, 5, PAID_STATUS_ID)]),
            user(
                20,
                "Борис",
                vec![lead(MARCH_2025, 5, 1), lead(MARCH_2025, 5, PAID_STATUS_ID)],
            ),
        ];
        let filter = PaymentFilter { month: None, year: Some(2025) };

        let report = build_report(&users, &funnel(), &filter);
        assert_eq!(report.total_paid(), 2);
        assert_eq!(report.total_leads(), 3);
        assert_eq!(report.total_conversion(), "67%");
    }
}
