use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;

use crate::reports::enrollment::EnrollmentPage;
use crate::reports::payment::PaymentPage;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <nav class="top-nav">
                <A href="/">"Специальности"</A>
                <A href="/paid">"Оплаты"</A>
            </nav>
            <main>
                <Routes fallback=|| view! { <p>"Страница не найдена"</p> }>
                    <Route path=path!("/") view=EnrollmentPage />
                    <Route path=path!("/paid") view=PaymentPage />
                </Routes>
            </main>
        </Router>
    }
}
