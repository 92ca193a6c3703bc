//! Подписи месяцев и список лет для фильтров отчётов.

pub const MONTH_NAMES: [&str; 12] = [
    "январь", "февраль", "март", "апрель", "май", "июнь",
    "июль", "август", "сентябрь", "октябрь", "ноябрь", "декабрь",
];

/// Название месяца по номеру 0..=11
pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("")
}

/// "январь" → "Январь" (для опций выпадающего списка)
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Года для фильтра: от 2030 вниз до 2024
pub fn filter_years() -> Vec<i32> {
    (2024..=2030).rev().collect()
}
