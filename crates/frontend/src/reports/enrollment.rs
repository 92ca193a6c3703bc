//! Страница "Статистика по специальностям": заявки воронки
//! "Студенты <год>" по специальности, форме обучения и базе 9/11.

use chrono::{Datelike, Utc};
use contracts::amo::{Pipeline, User};
use contracts::reports::enrollment::{build_grouped, EnrollmentFilter, Grade};
use leptos::logging::log;
use leptos::prelude::*;

use crate::shared::api::fetch_snapshot;
use crate::shared::months::{capitalize_first, filter_years, month_name, MONTH_NAMES};

#[component]
pub fn EnrollmentPage() -> impl IntoView {
    let now = Utc::now();

    // Фильтры: по умолчанию текущий месяц и год, все менеджеры
    let (selected_month, set_selected_month) = signal::<Option<u32>>(Some(now.month0()));
    let (selected_year, set_selected_year) = signal::<Option<i32>>(Some(now.year()));
    let (selected_user_id, set_selected_user_id) = signal::<Option<i64>>(None);

    let (users, set_users) = signal::<Vec<User>>(Vec::new());
    let (pipelines, set_pipelines) = signal::<Vec<Pipeline>>(Vec::new());
    let (error, set_error) = signal::<Option<String>>(None);

    // Подгружаем данные при открытии страницы из API amocrm
    Effect::new(move |_| {
        leptos::task::spawn_local(async move {
            match fetch_snapshot().await {
                Ok(snapshot) => {
                    set_users.set(snapshot.users);
                    set_pipelines.set(snapshot.pipelines);
                }
                Err(e) => {
                    log!("Failed to fetch AmoCRM snapshot: {e}");
                    set_error.set(Some(e));
                }
            }
        });
    });

    // Пересчитываем таблицу при каждом изменении данных или фильтров
    let grouped = Memo::new(move |_| {
        let filter = EnrollmentFilter {
            month: selected_month.get(),
            year: selected_year.get(),
            user_id: selected_user_id.get(),
        };
        users.with(|u| pipelines.with(|p| build_grouped(u, p, &filter)))
    });

    let title = move || {
        let month = selected_month
            .get()
            .map(month_name)
            .unwrap_or("все месяцы");
        let year = selected_year
            .get()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "все года".to_string());
        format!("Статистика по специальностям: {month} {year}")
    };

    view! {
        <div class="container">
            <h1 class="page-title">{title}</h1>

            {move || {
                error
                    .get()
                    .map(|e| view! { <p class="fetch-error">{e}</p> })
            }}

            <div class="filters">
                <div>
                    <label class="filter-label">"Месяц:"</label>
                    <select
                        class="main-filter"
                        prop:value=move || {
                            selected_month.get().map(|m| m.to_string()).unwrap_or_default()
                        }
                        on:change=move |ev| {
                            let val = event_target_value(&ev);
                            set_selected_month.set(if val.is_empty() { None } else { val.parse().ok() });
                        }
                    >
                        <option value="">"Все месяцы"</option>
                        {MONTH_NAMES
                            .iter()
                            .enumerate()
                            .map(|(i, name)| {
                                view! {
                                    <option value=i.to_string()>{capitalize_first(name)}</option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>

                <div>
                    <label class="filter-label">"Год:"</label>
                    <select
                        class="main-filter"
                        prop:value=move || {
                            selected_year.get().map(|y| y.to_string()).unwrap_or_default()
                        }
                        on:change=move |ev| {
                            let val = event_target_value(&ev);
                            set_selected_year.set(if val.is_empty() { None } else { val.parse().ok() });
                        }
                    >
                        <option value="">"Все года"</option>
                        {filter_years()
                            .into_iter()
                            .map(|year| {
                                view! { <option value=year.to_string()>{year}</option> }
                            })
                            .collect_view()}
                    </select>
                </div>

                <div>
                    <label class="filter-label">"Менеджер:"</label>
                    <select
                        class="main-filter"
                        prop:value=move || {
                            selected_user_id.get().map(|id| id.to_string()).unwrap_or_default()
                        }
                        on:change=move |ev| {
                            let val = event_target_value(&ev);
                            set_selected_user_id
                                .set(if val.is_empty() { None } else { val.parse().ok() });
                        }
                    >
                        <option value="">"Все менеджеры"</option>
                        {move || {
                            users
                                .get()
                                .into_iter()
                                .map(|user| {
                                    view! {
                                        <option value=user.id.to_string()>{user.name}</option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                </div>
            </div>

            <table class="summary-table">
                <thead class="summary-header">
                    <tr>
                        <th class="cell-left">"Специальность"</th>
                        <th class="cell-left">"Форма обучения"</th>
                        <th class="cell-right">"11 класс"</th>
                        <th class="cell-right">"9 класс"</th>
                        <th class="cell-right">"Итого"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        grouped
                            .get()
                            .specialties
                            .into_iter()
                            .map(|group| {
                                let specialty = group.specialty;
                                group
                                    .forms
                                    .into_iter()
                                    .enumerate()
                                    .map(|(i, row)| {
                                        // Название специальности только в первой строке группы
                                        let label = if i == 0 { specialty.clone() } else { String::new() };
                                        view! {
                                            <tr>
                                                <td class="cell-left">{label}</td>
                                                <td class="cell-left">{row.form}</td>
                                                <td class="cell-right">{row.counts.grade11.to_string()}</td>
                                                <td class="cell-right">{row.counts.grade9.to_string()}</td>
                                                <td class="cell-right cell-total">{row.counts.total.to_string()}</td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()
                            })
                            .collect_view()
                    }}

                    // Последняя строка — общий итог
                    <tr class="summary-footer">
                        <td class="cell-left" colspan="2">"Итого по всем"</td>
                        <td class="cell-right">
                            {move || grouped.get().total_by_grade(Grade::Eleven).to_string()}
                        </td>
                        <td class="cell-right">
                            {move || grouped.get().total_by_grade(Grade::Nine).to_string()}
                        </td>
                        <td class="cell-right cell-total">
                            {move || grouped.get().total_overall().to_string()}
                        </td>
                    </tr>
                </tbody>
            </table>
        </div>
    }
}
