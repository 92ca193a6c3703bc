//! Отчёт по набору: количество заявок по специальности, форме обучения
//! и базе (9/11 класс) внутри воронки "Студенты <год>".

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{find_pipeline_id, matches_period};
use crate::amo::{Lead, Pipeline, User};

/// Значение по умолчанию для отсутствующих полей "Специальность" и "Форма"
pub const NOT_SPECIFIED: &str = "Не указано";

/// Название воронки набора за конкретный год
pub fn students_pipeline_name(year: i32) -> String {
    format!("Студенты {year}")
}

/// Фильтры отчёта по набору. `None` — без ограничения.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentFilter {
    /// Месяц 0..=11
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Ограничение по одному менеджеру
    pub user_id: Option<i64>,
}

/// База поступления. Учитываются только 9 и 11 классы,
/// остальные значения молча отбрасываются.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Nine,
    Eleven,
}

impl Grade {
    /// Разбор значения поля "База": обрезаем пробелы и хвост " класс".
    /// "9 класс" → Nine, "11" → Eleven, всё прочее → None.
    pub fn parse(raw: &str) -> Option<Grade> {
        let trimmed = raw.trim();
        let normalized = trimmed.strip_suffix(" класс").unwrap_or(trimmed);
        match normalized {
            "9" => Some(Grade::Nine),
            "11" => Some(Grade::Eleven),
            _ => None,
        }
    }
}

/// Счётчики одной строки отчёта (специальность + форма обучения)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    #[serde(rename = "9")]
    pub grade9: u32,
    #[serde(rename = "11")]
    pub grade11: u32,
    pub total: u32,
}

impl GradeCounts {
    pub fn get(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Nine => self.grade9,
            Grade::Eleven => self.grade11,
        }
    }

    fn add(&mut self, grade: Grade) {
        match grade {
            Grade::Nine => self.grade9 += 1,
            Grade::Eleven => self.grade11 += 1,
        }
        self.total += 1;
    }
}

/// Форма обучения внутри специальности
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    pub form: String,
    pub counts: GradeCounts,
}

/// Группа строк одной специальности
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyGroup {
    pub specialty: String,
    pub forms: Vec<FormRow>,
}

/// Сгруппированный отчёт по набору.
///
/// Специальности и формы хранятся в порядке первого появления
/// (порядок менеджеров, внутри — порядок сделок), как и отображаются.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedData {
    pub specialties: Vec<SpecialtyGroup>,
}

impl GroupedData {
    pub fn is_empty(&self) -> bool {
        self.specialties.is_empty()
    }

    /// Итог по базе (9 или 11) по всем специальностям и формам
    pub fn total_by_grade(&self, grade: Grade) -> u32 {
        self.specialties
            .iter()
            .flat_map(|s| s.forms.iter())
            .map(|f| f.counts.get(grade))
            .sum()
    }

    /// Итог по всем заявкам отчёта
    pub fn total_overall(&self) -> u32 {
        self.specialties
            .iter()
            .flat_map(|s| s.forms.iter())
            .map(|f| f.counts.total)
            .sum()
    }

    fn counts_mut(&mut self, specialty: &str, form: &str) -> &mut GradeCounts {
        let si = match self
            .specialties
            .iter()
            .position(|s| s.specialty == specialty)
        {
            Some(i) => i,
            None => {
                self.specialties.push(SpecialtyGroup {
                    specialty: specialty.to_string(),
                    forms: Vec::new(),
                });
                self.specialties.len() - 1
            }
        };
        let group = &mut self.specialties[si];
        let fi = match group.forms.iter().position(|f| f.form == form) {
            Some(i) => i,
            None => {
                group.forms.push(FormRow {
                    form: form.to_string(),
                    counts: GradeCounts::default(),
                });
                group.forms.len() - 1
            }
        };
        &mut group.forms[fi].counts
    }
}

/// Три поля сделки, извлечённые один раз при обработке
struct LeadFields {
    specialty: String,
    form: String,
    grade: Option<Grade>,
}

impl LeadFields {
    fn resolve(lead: &Lead) -> Self {
        Self {
            specialty: lead
                .custom_field("Специальность")
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            form: lead
                .custom_field("Форма")
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            grade: lead.custom_field("База").as_deref().and_then(Grade::parse),
        }
    }
}

/// Строит отчёт по набору для текущего календарного года
/// в качестве года воронки по умолчанию.
pub fn build_grouped(
    users: &[User],
    pipelines: &[Pipeline],
    filter: &EnrollmentFilter,
) -> GroupedData {
    build_grouped_for_year(users, pipelines, filter, Utc::now().year())
}

/// Строит отчёт по набору.
///
/// Воронка ищется по имени "Студенты <год фильтра>"; при фильтре
/// "все года" подставляется `fallback_year`, даже если сами сделки
/// при этом не ограничены по году. Если воронки с таким именем нет,
/// отчёт пуст — это не ошибка.
pub fn build_grouped_for_year(
    users: &[User],
    pipelines: &[Pipeline],
    filter: &EnrollmentFilter,
    fallback_year: i32,
) -> GroupedData {
    let pipeline_name = students_pipeline_name(filter.year.unwrap_or(fallback_year));
    let pipeline_id = find_pipeline_id(pipelines, &pipeline_name);

    let mut data = GroupedData::default();
    let Some(pipeline_id) = pipeline_id else {
        return data;
    };

    for user in users {
        if filter.user_id.is_some_and(|id| user.id != id) {
            continue;
        }
        for lead in &user.leads {
            if !matches_period(lead.created_at, filter.month, filter.year) {
                continue;
            }
            if lead.pipeline_id != pipeline_id {
                continue;
            }

            let fields = LeadFields::resolve(lead);
            let Some(grade) = fields.grade else {
                continue;
            };
            data.counts_mut(&fields.specialty, &fields.form).add(grade);
        }
    }

    data
}
