//! Страница "Оплачено": сделки воронки "Воронка" по менеджерам,
//! оплаченные и всего, с конверсией.

use chrono::{Datelike, Utc};
use contracts::amo::{Pipeline, User};
use contracts::reports::payment::{build_report, PaymentFilter};
use leptos::logging::log;
use leptos::prelude::*;

use crate::shared::api::fetch_snapshot;
use crate::shared::months::{filter_years, month_name, MONTH_NAMES};

#[component]
pub fn PaymentPage() -> impl IntoView {
    let now = Utc::now();

    let (selected_month, set_selected_month) = signal::<Option<u32>>(Some(now.month0()));
    let (selected_year, set_selected_year) = signal::<Option<i32>>(Some(now.year()));

    let (users, set_users) = signal::<Vec<User>>(Vec::new());
    let (pipelines, set_pipelines) = signal::<Vec<Pipeline>>(Vec::new());
    let (error, set_error) = signal::<Option<String>>(None);

    // Получаем данные с api amocrm и сохраняем их в стейт
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

    // Статистика по менеджерам пересчитывается на каждое изменение фильтров
    let report = Memo::new(move |_| {
        let filter = PaymentFilter {
            month: selected_month.get(),
            year: selected_year.get(),
        };
        users.with(|u| pipelines.with(|p| build_report(u, p, &filter)))
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
        format!("Оплачено за {month} {year}")
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
                                view! { <option value=i.to_string()>{*name}</option> }
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
            </div>

            <table class="summary-table">
                <thead class="summary-header">
                    <tr>
                        <th class="cell-left">"Менеджер"</th>
                        <th class="cell-right">"Оплачено"</th>
                        <th class="cell-right">"Всего"</th>
                        <th class="cell-right">"Конверсия"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        report
                            .get()
                            .rows
                            .into_iter()
                            .map(|stat| {
                                let conversion = stat.conversion();
                                view! {
                                    <tr>
                                        <td class="cell-left">{stat.name}</td>
                                        <td class="cell-right">{stat.paid.to_string()}</td>
                                        <td class="cell-right">{stat.total.to_string()}</td>
                                        <td class="cell-right">{conversion}</td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}

                    // Последняя строка — это итоги по всем
                    <tr class="summary-footer">
                        <td class="cell-left">"Итого"</td>
                        <td class="cell-right">
                            {move || report.get().total_paid().to_string()}
                        </td>
                        <td class="cell-right">
                            {move || report.get().total_leads().to_string()}
                        </td>
                        <td class="cell-right">{move || report.get().total_conversion()}</td>
                    </tr>
                </tbody>
            </table>
        </div>
    }
}
