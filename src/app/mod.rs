use crate::components::notices::NoticeStack;
use crate::pages::{AdminPage, HomePage, NewsListPage, PrivacyPage};
use crate::routes::{view_for_path, View};
use crate::state::{refresh_public_data, AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::hooks::use_location;
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <AppShell />
        </Router>
    }
}

#[component]
fn AppShell() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let location = use_location();

    // Re-resolve whenever the path or the `?u=` query changes. The admin
    // panel loads its own rows after the session gate instead.
    {
        let app = app.clone();
        Effect::new(move |_| {
            let path = location.pathname.get();
            let _search = location.search.get();
            if view_for_path(&path) != View::Admin {
                refresh_public_data(app.clone());
            }
        });
    }

    view! {
        <NoticeStack />
        // Unknown paths render Home so a hard reload of any URL still lands
        // on a working page.
        <Routes fallback=|| view! { <HomePage /> }>
            <Route path=path!("") view=HomePage />
            <Route path=path!("admin") view=AdminPage />
            <Route path=path!("privacy") view=PrivacyPage />
            <Route path=path!("news") view=NewsListPage />
        </Routes>
    }
}
