use crate::api::{generated_default_slug, ApiError, ApiErrorKind, LinkPayload, NewsPayload};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::insight::{build_insight_context, fetch_tip, InsightConfig};
use crate::models::{LinkItem, News, Profile};
use crate::routes::{path_for, public_url_for_slug, View};
use crate::state::list_cache::{prepend_item, remove_where, replace_where};
use crate::state::{load_admin_data, AppContext, AppState};
use crate::storage::save_session;
use crate::util::{display_date, log_warn, normalize_slug};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

// ---- form validation (no network until these pass) -------------------------

pub(crate) fn validate_link_form(title: &str, url: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if url.trim().is_empty() {
        return Err("URL is required".to_string());
    }
    Ok(())
}

pub(crate) fn validate_news_form(title: &str, content: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if content.trim().is_empty() {
        return Err("Content is required".to_string());
    }
    Ok(())
}

pub(crate) fn validate_profile_form(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(())
}

/// Display name seeded into a fresh profile right after sign-up.
pub(crate) fn seeded_profile_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or("").trim();
    if local.is_empty() {
        "New profile".to_string()
    } else {
        local.to_string()
    }
}

// ---- shared handlers -------------------------------------------------------

/// Expired or missing credentials end the session; everything else is a
/// notice with the backend's message.
fn report_write_error(app: &AppState, e: ApiError) {
    match e.kind {
        ApiErrorKind::Unauthenticated | ApiErrorKind::Unauthorized => {
            let mut client = app.client.get_untracked();
            client.sign_out();
            app.client.set(client);
            app.session.set(None);
            app.notifier.error("Session expired. Sign in again.");
        }
        _ => {
            app.notifier.error(e.message);
        }
    }
}

fn first_selected_file(ev: &web_sys::Event) -> Option<web_sys::File> {
    let input = ev
        .target()?
        .dyn_ref::<web_sys::HtmlInputElement>()?
        .clone();
    input.files().and_then(|list| list.get(0))
}

async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| "Reading the file failed".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Upload the picked file and store its public URL in `target`. The form
/// stays disabled (via `uploading`) until this settles.
fn upload_into(
    app: AppState,
    ev: web_sys::Event,
    purpose: &'static str,
    target: RwSignal<String>,
    uploading: RwSignal<bool>,
) {
    let Some(file) = first_selected_file(&ev) else {
        return;
    };

    uploading.set(true);
    spawn_local(async move {
        let client = app.client.get_untracked();
        let name = file.name();
        let content_type = file.type_();

        let result = match read_file_bytes(&file).await {
            Ok(bytes) => client.upload_object(purpose, &name, bytes, &content_type).await,
            Err(e) => {
                uploading.set(false);
                app.notifier.error(e);
                return;
            }
        };

        match result {
            Ok(url) => {
                target.set(field_value_after_upload(target.get_untracked(), Ok(url)));
                app.notifier.success("Image uploaded");
            }
            Err(e) => {
                target.set(field_value_after_upload(target.get_untracked(), Err(&e)));
                report_write_error(&app, e);
            }
        }
        uploading.set(false);
    });
}

/// New value for an upload-backed form field; a failed upload keeps whatever
/// the field already held.
pub(crate) fn field_value_after_upload(
    previous: String,
    outcome: Result<String, &ApiError>,
) -> String {
    match outcome {
        Ok(url) => url,
        Err(_) => previous,
    }
}

/// Row id to delete, gated on the confirmation dialog. A declined prompt
/// yields nothing, so no request is ever built.
pub(crate) fn confirmed_delete_id(confirmed: bool, id: &str) -> Option<String> {
    confirmed.then(|| id.to_string())
}

fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}

// ---- public pages ----------------------------------------------------------

#[component]
pub fn HomePage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let profile = app.profile;
    let links = app.links;
    let news = app.news;
    let loading = app.profile_loading;
    let not_found = app.profile_not_found;

    let app_for_clicks = app.clone();
    let track_click = move |link_id: String| {
        let client = app_for_clicks.client.get_untracked();
        // Detached: the anchor navigates regardless of what tracking does.
        spawn_local(async move {
            if let Err(e) = client.increment_link_clicks(&link_id).await {
                log_warn(&format!("click tracking failed: {e}"));
            }
        });
    };

    view! {
        <div class="min-h-screen bg-zinc-50">
            <Show when=move || not_found.get() fallback=|| ().into_view()>
                <NotFoundView />
            </Show>

            <Show when=move || !not_found.get() fallback=|| ().into_view()>
                <main class="mx-auto w-full max-w-xl px-4 py-10 flex flex-col gap-8">
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <div class="flex justify-center py-10">
                            <Spinner class="size-6 text-zinc-400" />
                        </div>
                    </Show>

                    <Show when=move || !loading.get() fallback=|| ().into_view()>
                        <header class="flex flex-col items-center gap-3 text-center">
                            <Show
                                when=move || !profile.get().avatar_url.trim().is_empty()
                                fallback=move || {
                                    view! {
                                        <div class="size-24 rounded-full bg-indigo-100 flex items-center justify-center text-2xl font-semibold text-indigo-600">
                                            {move || {
                                                profile.get().name.chars().next().unwrap_or('?').to_string()
                                            }}
                                        </div>
                                    }
                                }
                            >
                                <img
                                    class="size-24 rounded-full object-cover border border-zinc-200"
                                    src=move || profile.get().avatar_url
                                    alt="Avatar"
                                />
                            </Show>

                            <h1 class="text-2xl font-bold text-zinc-900">
                                {move || profile.get().name}
                            </h1>
                            <p class="text-sm text-zinc-600 whitespace-pre-line">
                                {move || profile.get().bio}
                            </p>

                            {move || {
                                profile
                                    .get()
                                    .mascot_url
                                    .filter(|u| !u.trim().is_empty())
                                    .map(|u| {
                                        view! {
                                            <img
                                                class="size-16 object-contain"
                                                src=u
                                                alt="Mascot"
                                            />
                                        }
                                    })
                            }}
                        </header>

                        <section class="flex flex-col gap-3">
                            {move || {
                                let items = links.get();
                                if items.is_empty() {
                                    view! {
                                        <p class="text-center text-sm text-zinc-400 py-4">
                                            "No links yet."
                                        </p>
                                    }
                                        .into_any()
                                } else {
                                    let track = track_click.clone();
                                    items
                                        .into_iter()
                                        .map(|link| {
                                            let track = track.clone();
                                            let LinkItem {
                                                id,
                                                title,
                                                description,
                                                url,
                                                icon_url,
                                                ..
                                            } = link;
                                            let has_icon = !icon_url.trim().is_empty();
                                            let has_description = !description.trim().is_empty();
                                            view! {
                                                <a
                                                    href=url
                                                    target="_blank"
                                                    rel="noopener noreferrer"
                                                    class="flex items-center gap-4 rounded-2xl border border-zinc-200 bg-white px-5 py-4 shadow-sm transition-all hover:shadow-md hover:-translate-y-0.5"
                                                    on:click=move |_| track(id.clone())
                                                >
                                                    <Show
                                                        when=move || has_icon
                                                        fallback=|| ().into_view()
                                                    >
                                                        <img
                                                            class="size-10 rounded-lg object-cover"
                                                            src=icon_url.clone()
                                                            alt=""
                                                        />
                                                    </Show>
                                                    <div class="flex flex-col min-w-0">
                                                        <span class="font-medium text-zinc-900 truncate">
                                                            {title}
                                                        </span>
                                                        <Show
                                                            when=move || has_description
                                                            fallback=|| ().into_view()
                                                        >
                                                            <span class="text-xs text-zinc-500 truncate">
                                                                {description.clone()}
                                                            </span>
                                                        </Show>
                                                    </div>
                                                </a>
                                            }
                                        })
                                        .collect_view()
                                        .into_any()
                                }
                            }}
                        </section>

                        <section class="flex flex-col gap-3">
                            <div class="flex items-center justify-between">
                                <h2 class="text-sm font-semibold uppercase tracking-wide text-zinc-500">
                                    "Latest news"
                                </h2>
                                <a
                                    href=path_for(View::NewsList)
                                    class="text-xs text-indigo-600 hover:underline"
                                >
                                    "View all"
                                </a>
                            </div>
                            {move || {
                                let items = news.get();
                                if items.is_empty() {
                                    view! {
                                        <p class="text-center text-sm text-zinc-400 py-2">
                                            "Nothing published yet."
                                        </p>
                                    }
                                        .into_any()
                                } else {
                                    items
                                        .into_iter()
                                        .take(2)
                                        .map(|n| {
                                            view! {
                                                <article class="rounded-xl border border-zinc-200 bg-white px-4 py-3">
                                                    <div class="flex items-baseline justify-between gap-2">
                                                        <h3 class="font-medium text-zinc-900 truncate">
                                                            {n.title.clone()}
                                                        </h3>
                                                        <span class="text-xs text-zinc-400 shrink-0">
                                                            {display_date(&n.created_at)}
                                                        </span>
                                                    </div>
                                                    <p class="text-sm text-zinc-600 line-clamp-2">
                                                        {n.content.clone()}
                                                    </p>
                                                </article>
                                            }
                                        })
                                        .collect_view()
                                        .into_any()
                                }
                            }}
                        </section>

                        <footer class="flex items-center justify-center gap-4 text-xs text-zinc-400 pt-4">
                            <a href=path_for(View::Privacy) class="hover:text-zinc-600">
                                "Privacy"
                            </a>
                            <a href=path_for(View::Admin) class="hover:text-zinc-600">
                                "Admin"
                            </a>
                        </footer>
                    </Show>
                </main>
            </Show>
        </div>
    }
}

#[component]
fn NotFoundView() -> impl IntoView {
    view! {
        <main class="mx-auto flex min-h-screen w-full max-w-md flex-col items-center justify-center gap-4 px-4 text-center">
            <h1 class="text-3xl font-bold text-zinc-900">"Profile not found"</h1>
            <p class="text-sm text-zinc-500">
                "There is no page under that name. Check the link, or head back home."
            </p>
            <a
                href="/"
                class="inline-flex h-9 items-center rounded-lg bg-indigo-600 px-4 text-sm font-medium text-white shadow-sm hover:bg-indigo-500"
            >
                "Go home"
            </a>
        </main>
    }
}

#[component]
pub fn NewsListPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let news = app.news;
    let profile = app.profile;
    let loading = app.profile_loading;

    view! {
        <main class="mx-auto w-full max-w-xl px-4 py-10 flex flex-col gap-6">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-bold text-zinc-900">
                    {move || format!("News from {}", profile.get().name)}
                </h1>
                <a href="/" class="text-sm text-indigo-600 hover:underline">"Back"</a>
            </div>

            <Show when=move || loading.get() fallback=|| ().into_view()>
                <div class="flex justify-center py-10">
                    <Spinner class="size-6 text-zinc-400" />
                </div>
            </Show>

            {move || {
                if loading.get() {
                    return ().into_any();
                }
                let items = news.get();
                if items.is_empty() {
                    view! {
                        <p class="text-center text-sm text-zinc-400 py-8">
                            "Nothing published yet."
                        </p>
                    }
                        .into_any()
                } else {
                    items
                        .into_iter()
                        .map(|n| view! { <NewsEntry news=n /> })
                        .collect_view()
                        .into_any()
                }
            }}
        </main>
    }
}

#[component]
fn NewsEntry(news: News) -> impl IntoView {
    let date = display_date(&news.created_at);
    let News {
        title,
        content,
        image_url,
        link_url,
        ..
    } = news;
    let has_image = !image_url.trim().is_empty();

    view! {
        <article class="rounded-2xl border border-zinc-200 bg-white overflow-hidden">
            <Show when=move || has_image fallback=|| ().into_view()>
                <img class="w-full max-h-64 object-cover" src=image_url.clone() alt="" />
            </Show>
            <div class="px-5 py-4 flex flex-col gap-2">
                <div class="flex items-baseline justify-between gap-2">
                    <h2 class="font-semibold text-zinc-900">{title}</h2>
                    <span class="text-xs text-zinc-400 shrink-0">{date}</span>
                </div>
                <p class="text-sm text-zinc-600 whitespace-pre-line">{content}</p>
                {link_url
                    .filter(|u| !u.trim().is_empty())
                    .map(|u| {
                        view! {
                            <a
                                href=u
                                target="_blank"
                                rel="noopener noreferrer"
                                class="text-sm text-indigo-600 hover:underline w-fit"
                            >
                                "Read more"
                            </a>
                        }
                    })}
            </div>
        </article>
    }
}

#[component]
pub fn PrivacyPage() -> impl IntoView {
    view! {
        <main class="mx-auto w-full max-w-xl px-4 py-10 flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-bold text-zinc-900">"Privacy"</h1>
                <a href="/" class="text-sm text-indigo-600 hover:underline">"Back"</a>
            </div>
            <div class="text-sm text-zinc-600 flex flex-col gap-3">
                <p>
                    "Public pages show only what their owner chose to publish: a name, a bio, links and news posts. Nothing else about visitors is collected."
                </p>
                <p>
                    "Link activations are counted in aggregate per link. No visitor identity, IP address or browser fingerprint is stored with the count."
                </p>
                <p>
                    "Account holders sign in with email and password; the session token lives in this browser's local storage and can be discarded at any time by signing out."
                </p>
            </div>
        </main>
    }
}

// ---- admin -----------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
enum AdminTab {
    Links,
    News,
    Profile,
}

#[component]
pub fn AdminPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let session = app.session;

    {
        let app = app.clone();
        Effect::new(move |_| {
            if let Some(s) = session.get() {
                load_admin_data(app.clone(), s.owner_id);
            }
        });
    }

    view! {
        <div class="min-h-screen bg-zinc-50">
            <Show when=move || session.get().is_some() fallback=|| view! { <AuthForm /> }>
                <AdminPanel />
            </Show>
        </div>
    }
}

#[component]
fn AuthForm() -> impl IntoView {
    let app = expect_context::<AppContext>().0;

    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let sign_up_mode: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let on_submit = {
        let app = app.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();

            let app = app.clone();
            let email_val = email.get();
            let password_val = password.get();
            let signing_up = sign_up_mode.get();

            loading.set(true);
            error.set(None);

            spawn_local(async move {
                let mut client = app.client.get_untracked();

                if signing_up {
                    match client.sign_up(&email_val, &password_val).await {
                        Ok(Some(session)) => {
                            client.session = Some(session.clone());
                            save_session(&session);

                            // Seed a profile row so the public page has a slug
                            // from day one.
                            let mut profile = Profile::placeholder();
                            profile.id = session.owner_id.clone();
                            profile.name = seeded_profile_name(&session.email);
                            profile.slug = Some(generated_default_slug());
                            if let Err(e) = client.upsert_profile(&profile).await {
                                log_warn(&format!("seeding profile failed: {e}"));
                            }

                            app.client.set(client);
                            app.session.set(Some(session));
                            app.notifier.success("Welcome!");
                        }
                        Ok(None) => {
                            app.notifier.info("Check your inbox to confirm the account.");
                        }
                        Err(e) => error.set(Some(e.message)),
                    }
                } else {
                    match client.sign_in(&email_val, &password_val).await {
                        Ok(session) => {
                            app.client.set(client);
                            app.session.set(Some(session));
                        }
                        Err(e) => error.set(Some(e.message)),
                    }
                }
                loading.set(false);
            });
        }
    };

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">
                        {move || if sign_up_mode.get() { "Create account" } else { "Sign in" }}
                    </CardTitle>
                    <CardDescription class="text-xs">
                        "Manage your page: links, news and profile."
                    </CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                placeholder="••••••••"
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                error.get().map(|e| {
                                    view! {
                                        <Alert class="border-rose-300">
                                            <AlertDescription class="text-rose-600 text-xs">
                                                {e}
                                            </AlertDescription>
                                        </Alert>
                                    }
                                })
                            }}
                        </Show>

                        <Button
                            class="w-full"
                            size=ButtonSize::Sm
                            attr:disabled=move || loading.get()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner class="size-3" />
                                </Show>
                                {move || if sign_up_mode.get() { "Sign up" } else { "Sign in" }}
                            </span>
                        </Button>

                        <button
                            type="button"
                            class="text-xs text-zinc-500 hover:text-zinc-700 cursor-pointer"
                            on:click=move |_| sign_up_mode.update(|v| *v = !*v)
                        >
                            {move || {
                                if sign_up_mode.get() {
                                    "Already have an account? Sign in"
                                } else {
                                    "No account yet? Sign up"
                                }
                            }}
                        </button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn AdminPanel() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let session = app.session;
    let profile = app.profile;
    let active_tab: RwSignal<AdminTab> = RwSignal::new(AdminTab::Links);

    let insight_config = InsightConfig::from_env();
    let insight_available = insight_config.is_some();
    let tip: RwSignal<Option<String>> = RwSignal::new(None);
    let tip_loading: RwSignal<bool> = RwSignal::new(false);

    let on_sign_out = {
        let app = app.clone();
        move |_| {
            let mut client = app.client.get_untracked();
            client.sign_out();
            app.client.set(client);
            app.session.set(None);
            let _ = window().location().set_href("/");
        }
    };

    let fetch_insight = {
        let app = app.clone();
        let config = insight_config.clone();
        move |_| {
            let Some(config) = config.clone() else {
                return;
            };
            let context = build_insight_context(
                &app.profile.get_untracked(),
                &app.links.get_untracked(),
            );
            tip_loading.set(true);
            spawn_local(async move {
                tip.set(fetch_tip(&config, &context).await);
                tip_loading.set(false);
            });
        }
    };

    let public_url = move || {
        let origin = window().location().origin().unwrap_or_default();
        profile
            .get()
            .slug
            .filter(|s| !s.trim().is_empty())
            .map(|s| public_url_for_slug(&origin, &s))
    };

    view! {
        <main class="mx-auto w-full max-w-2xl px-4 py-8 flex flex-col gap-6">
            <header class="flex items-center justify-between gap-3">
                <div class="flex flex-col">
                    <h1 class="text-xl font-bold text-zinc-900">"Your page"</h1>
                    <span class="text-xs text-zinc-500">
                        {move || session.get().map(|s| s.email).unwrap_or_default()}
                    </span>
                </div>
                <div class="flex items-center gap-2">
                    {move || {
                        public_url().map(|url| {
                            view! {
                                <a
                                    href=url
                                    class="inline-flex h-8 items-center rounded-md border border-zinc-300 bg-white px-3 text-xs font-medium text-zinc-700 shadow-sm hover:bg-zinc-50"
                                >
                                    "View public page"
                                </a>
                            }
                        })
                    }}
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=on_sign_out
                    >
                        "Sign out"
                    </Button>
                </div>
            </header>

            <Show when=move || insight_available fallback=|| ().into_view()>
                <div class="rounded-xl border border-indigo-200 bg-indigo-50 px-4 py-3 flex flex-col gap-2">
                    <div class="flex items-center justify-between">
                        <span class="text-sm font-medium text-indigo-900">"Tip of the day"</span>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            attr:disabled=move || tip_loading.get()
                            on:click=fetch_insight.clone()
                        >
                            <Show when=move || tip_loading.get() fallback=|| ().into_view()>
                                <Spinner class="size-3" />
                            </Show>
                            "Get a tip"
                        </Button>
                    </div>
                    {move || {
                        tip.get().map(|t| {
                            view! { <p class="text-sm text-indigo-800">{t}</p> }
                        })
                    }}
                </div>
            </Show>

            <nav class="flex gap-1 border-b border-zinc-200">
                {AdminTab::iter()
                    .map(|tab| {
                        view! {
                            <button
                                class=move || {
                                    if active_tab.get() == tab {
                                        "px-4 py-2 text-sm font-medium text-indigo-600 border-b-2 border-indigo-600 -mb-px cursor-pointer"
                                    } else {
                                        "px-4 py-2 text-sm text-zinc-500 hover:text-zinc-800 cursor-pointer"
                                    }
                                }
                                on:click=move |_| active_tab.set(tab)
                            >
                                {tab.to_string()}
                            </button>
                        }
                    })
                    .collect_view()}
            </nav>

            {move || match active_tab.get() {
                AdminTab::Links => view! { <LinksTab /> }.into_any(),
                AdminTab::News => view! { <NewsTab /> }.into_any(),
                AdminTab::Profile => view! { <ProfileTab /> }.into_any(),
            }}
        </main>
    }
}

#[component]
fn LinksTab() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let links = app.links;
    let notifier = app.notifier;

    let title: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let url: RwSignal<String> = RwSignal::new(String::new());
    let icon_url: RwSignal<String> = RwSignal::new(String::new());
    let editing: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let uploading: RwSignal<bool> = RwSignal::new(false);

    let clear_form = move || {
        title.set(String::new());
        description.set(String::new());
        url.set(String::new());
        icon_url.set(String::new());
        editing.set(None);
    };

    let on_submit = {
        let app = app.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();

            let title_val = title.get();
            let url_val = url.get();
            if let Err(e) = validate_link_form(&title_val, &url_val) {
                notifier.error(e);
                return;
            }

            let payload = LinkPayload {
                title: title_val.trim().to_string(),
                description: description.get().trim().to_string(),
                url: url_val.trim().to_string(),
                icon_url: icon_url.get().trim().to_string(),
            };
            let editing_id = editing.get();
            let app = app.clone();

            saving.set(true);
            spawn_local(async move {
                let client = app.client.get_untracked();

                match editing_id {
                    Some(id) => match client.update_link(&id, &payload).await {
                        Ok(()) => {
                            links.update(|items| {
                                let updated = items.iter().find(|l| l.id == id).map(|old| {
                                    let mut l = old.clone();
                                    l.title = payload.title.clone();
                                    l.description = payload.description.clone();
                                    l.url = payload.url.clone();
                                    l.icon_url = payload.icon_url.clone();
                                    l
                                });
                                if let Some(updated) = updated {
                                    *items = replace_where(
                                        std::mem::take(items),
                                        updated,
                                        |a, b| a.id == b.id,
                                    );
                                }
                            });
                            notifier.success("Link updated");
                            clear_form();
                        }
                        Err(e) => report_write_error(&app, e),
                    },
                    None => match client.insert_link(&payload).await {
                        Ok(row) => {
                            links.update(|items| {
                                *items = prepend_item(std::mem::take(items), row);
                            });
                            notifier.success("Link added");
                            clear_form();
                        }
                        Err(e) => report_write_error(&app, e),
                    },
                }
                saving.set(false);
            });
        }
    };

    let on_delete = {
        let app = app.clone();
        move |id: String| {
            let Some(id) = confirmed_delete_id(confirm("Delete this link?"), &id) else {
                return;
            };
            let app = app.clone();
            spawn_local(async move {
                let client = app.client.get_untracked();
                match client.delete_link(&id).await {
                    Ok(()) => {
                        links.update(|items| {
                            *items = remove_where(std::mem::take(items), |l| l.id == id);
                        });
                        notifier.info("Link deleted");
                    }
                    Err(e) => report_write_error(&app, e),
                }
            });
        }
    };

    let start_edit = move |link: LinkItem| {
        title.set(link.title);
        description.set(link.description);
        url.set(link.url);
        icon_url.set(link.icon_url);
        editing.set(Some(link.id));
    };

    let on_icon_pick = {
        let app = app.clone();
        move |ev: web_sys::Event| upload_into(app.clone(), ev, "icons", icon_url, uploading)
    };

    view! {
        <div class="flex flex-col gap-5">
            <Card>
                <CardHeader>
                    <CardTitle class="text-base">
                        {move || if editing.get().is_some() { "Edit link" } else { "Add a link" }}
                    </CardTitle>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="link-title" class="text-xs">"Title"</Label>
                            <Input id="link-title" bind_value=title class="h-8 text-sm" />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="link-url" class="text-xs">"URL"</Label>
                            <Input
                                id="link-url"
                                placeholder="https://"
                                bind_value=url
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="link-desc" class="text-xs">"Description"</Label>
                            <Input id="link-desc" bind_value=description class="h-8 text-sm" />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label class="text-xs">"Icon"</Label>
                            <input
                                type="file"
                                accept="image/*"
                                class="text-xs text-zinc-500"
                                disabled=move || uploading.get()
                                on:change=on_icon_pick
                            />
                            <Show when=move || uploading.get() fallback=|| ().into_view()>
                                <span class="text-xs text-zinc-400 inline-flex items-center gap-1">
                                    <Spinner class="size-3" />
                                    "Uploading…"
                                </span>
                            </Show>
                        </div>

                        <div class="flex gap-2">
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || saving.get() || uploading.get()
                            >
                                {move || if editing.get().is_some() { "Save" } else { "Add" }}
                            </Button>
                            <Show when=move || editing.get().is_some() fallback=|| ().into_view()>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    attr:r#type="button"
                                    on:click=move |_| clear_form()
                                >
                                    "Cancel"
                                </Button>
                            </Show>
                        </div>
                    </form>
                </CardContent>
            </Card>

            <div class="flex flex-col gap-2">
                {move || {
                    let items = links.get();
                    if items.is_empty() {
                        view! {
                            <p class="text-center text-sm text-zinc-400 py-4">"No links yet."</p>
                        }
                            .into_any()
                    } else {
                        let on_delete = on_delete.clone();
                        items
                            .into_iter()
                            .map(|link| {
                                let on_delete = on_delete.clone();
                                let delete_id = link.id.clone();
                                let link_for_edit = link.clone();
                                view! {
                                    <div class="flex items-center gap-3 rounded-xl border border-zinc-200 bg-white px-4 py-3">
                                        <div class="flex flex-col min-w-0 flex-1">
                                            <span class="font-medium text-sm text-zinc-900 truncate">
                                                {link.title.clone()}
                                            </span>
                                            <span class="text-xs text-zinc-400 truncate">
                                                {link.url.clone()}
                                            </span>
                                        </div>
                                        <span class="text-xs text-zinc-400 shrink-0">
                                            {format!("{} clicks", link.click_count)}
                                        </span>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            on:click=move |_| start_edit(link_for_edit.clone())
                                        >
                                            "Edit"
                                        </Button>
                                        <Button
                                            variant=ButtonVariant::Destructive
                                            size=ButtonSize::Sm
                                            on:click=move |_| on_delete(delete_id.clone())
                                        >
                                            "Delete"
                                        </Button>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>
        </div>
    }
}

#[component]
fn NewsTab() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let news = app.news;
    let notifier = app.notifier;

    let title: RwSignal<String> = RwSignal::new(String::new());
    let content: RwSignal<String> = RwSignal::new(String::new());
    let image_url: RwSignal<String> = RwSignal::new(String::new());
    let link_url: RwSignal<String> = RwSignal::new(String::new());
    let editing: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let uploading: RwSignal<bool> = RwSignal::new(false);

    let clear_form = move || {
        title.set(String::new());
        content.set(String::new());
        image_url.set(String::new());
        link_url.set(String::new());
        editing.set(None);
    };

    let on_submit = {
        let app = app.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();

            let title_val = title.get();
            let content_val = content.get();
            if let Err(e) = validate_news_form(&title_val, &content_val) {
                notifier.error(e);
                return;
            }

            let link_val = link_url.get().trim().to_string();
            let payload = NewsPayload {
                title: title_val.trim().to_string(),
                content: content_val.trim().to_string(),
                image_url: image_url.get().trim().to_string(),
                link_url: if link_val.is_empty() { None } else { Some(link_val) },
            };
            let editing_id = editing.get();
            let app = app.clone();

            saving.set(true);
            spawn_local(async move {
                let client = app.client.get_untracked();

                match editing_id {
                    Some(id) => match client.update_news(&id, &payload).await {
                        Ok(()) => {
                            news.update(|items| {
                                let updated = items.iter().find(|n| n.id == id).map(|old| {
                                    let mut n = old.clone();
                                    n.title = payload.title.clone();
                                    n.content = payload.content.clone();
                                    n.image_url = payload.image_url.clone();
                                    n.link_url = payload.link_url.clone();
                                    n
                                });
                                if let Some(updated) = updated {
                                    *items = replace_where(
                                        std::mem::take(items),
                                        updated,
                                        |a, b| a.id == b.id,
                                    );
                                }
                            });
                            notifier.success("Post updated");
                            clear_form();
                        }
                        Err(e) => report_write_error(&app, e),
                    },
                    None => match client.insert_news(&payload).await {
                        Ok(row) => {
                            news.update(|items| {
                                *items = prepend_item(std::mem::take(items), row);
                            });
                            notifier.success("Post published");
                            clear_form();
                        }
                        Err(e) => report_write_error(&app, e),
                    },
                }
                saving.set(false);
            });
        }
    };

    let on_delete = {
        let app = app.clone();
        move |id: String| {
            let Some(id) = confirmed_delete_id(confirm("Delete this post?"), &id) else {
                return;
            };
            let app = app.clone();
            spawn_local(async move {
                let client = app.client.get_untracked();
                match client.delete_news(&id).await {
                    Ok(()) => {
                        news.update(|items| {
                            *items = remove_where(std::mem::take(items), |n| n.id == id);
                        });
                        notifier.info("Post deleted");
                    }
                    Err(e) => report_write_error(&app, e),
                }
            });
        }
    };

    let start_edit = move |item: News| {
        title.set(item.title);
        content.set(item.content);
        image_url.set(item.image_url);
        link_url.set(item.link_url.unwrap_or_default());
        editing.set(Some(item.id));
    };

    let on_image_pick = {
        let app = app.clone();
        move |ev: web_sys::Event| upload_into(app.clone(), ev, "news", image_url, uploading)
    };

    view! {
        <div class="flex flex-col gap-5">
            <Card>
                <CardHeader>
                    <CardTitle class="text-base">
                        {move || if editing.get().is_some() { "Edit post" } else { "Publish news" }}
                    </CardTitle>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="news-title" class="text-xs">"Title"</Label>
                            <Input id="news-title" bind_value=title class="h-8 text-sm" />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="news-content" class="text-xs">"Content"</Label>
                            <Textarea id="news-content" bind_value=content class="text-sm" />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="news-link" class="text-xs">"Link (optional)"</Label>
                            <Input
                                id="news-link"
                                placeholder="https://"
                                bind_value=link_url
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label class="text-xs">"Image"</Label>
                            <input
                                type="file"
                                accept="image/*"
                                class="text-xs text-zinc-500"
                                disabled=move || uploading.get()
                                on:change=on_image_pick
                            />
                            <Show when=move || uploading.get() fallback=|| ().into_view()>
                                <span class="text-xs text-zinc-400 inline-flex items-center gap-1">
                                    <Spinner class="size-3" />
                                    "Uploading…"
                                </span>
                            </Show>
                        </div>

                        <div class="flex gap-2">
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || saving.get() || uploading.get()
                            >
                                {move || if editing.get().is_some() { "Save" } else { "Publish" }}
                            </Button>
                            <Show when=move || editing.get().is_some() fallback=|| ().into_view()>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    attr:r#type="button"
                                    on:click=move |_| clear_form()
                                >
                                    "Cancel"
                                </Button>
                            </Show>
                        </div>
                    </form>
                </CardContent>
            </Card>

            <div class="flex flex-col gap-2">
                {move || {
                    let items = news.get();
                    if items.is_empty() {
                        view! {
                            <p class="text-center text-sm text-zinc-400 py-4">
                                "Nothing published yet."
                            </p>
                        }
                            .into_any()
                    } else {
                        let on_delete = on_delete.clone();
                        items
                            .into_iter()
                            .map(|item| {
                                let on_delete = on_delete.clone();
                                let delete_id = item.id.clone();
                                let item_for_edit = item.clone();
                                view! {
                                    <div class="flex items-center gap-3 rounded-xl border border-zinc-200 bg-white px-4 py-3">
                                        <div class="flex flex-col min-w-0 flex-1">
                                            <span class="font-medium text-sm text-zinc-900 truncate">
                                                {item.title.clone()}
                                            </span>
                                            <span class="text-xs text-zinc-400">
                                                {display_date(&item.created_at)}
                                            </span>
                                        </div>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            on:click=move |_| start_edit(item_for_edit.clone())
                                        >
                                            "Edit"
                                        </Button>
                                        <Button
                                            variant=ButtonVariant::Destructive
                                            size=ButtonSize::Sm
                                            on:click=move |_| on_delete(delete_id.clone())
                                        >
                                            "Delete"
                                        </Button>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>
        </div>
    }
}

#[component]
fn ProfileTab() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let profile = app.profile;
    let notifier = app.notifier;

    let name: RwSignal<String> = RwSignal::new(String::new());
    let bio: RwSignal<String> = RwSignal::new(String::new());
    let slug: RwSignal<String> = RwSignal::new(String::new());
    let avatar_url: RwSignal<String> = RwSignal::new(String::new());
    let mascot_url: RwSignal<String> = RwSignal::new(String::new());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let uploading_avatar: RwSignal<bool> = RwSignal::new(false);
    let uploading_mascot: RwSignal<bool> = RwSignal::new(false);

    // Refill the form whenever the loaded profile changes (initial load,
    // or the row coming back from a save).
    Effect::new(move |_| {
        let p = profile.get();
        name.set(p.name);
        bio.set(p.bio);
        slug.set(p.slug.unwrap_or_default());
        avatar_url.set(p.avatar_url);
        mascot_url.set(p.mascot_url.unwrap_or_default());
    });

    let on_submit = {
        let app = app.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();

            let name_val = name.get();
            if let Err(e) = validate_profile_form(&name_val) {
                notifier.error(e);
                return;
            }

            let Some(session) = app.session.get_untracked() else {
                return;
            };

            let slug_val = normalize_slug(&slug.get());
            let mascot_val = mascot_url.get().trim().to_string();
            let row = Profile {
                id: session.owner_id,
                name: name_val.trim().to_string(),
                bio: bio.get().trim().to_string(),
                avatar_url: avatar_url.get().trim().to_string(),
                mascot_url: if mascot_val.is_empty() { None } else { Some(mascot_val) },
                slug: if slug_val.is_empty() { None } else { Some(slug_val) },
            };
            let app = app.clone();

            saving.set(true);
            spawn_local(async move {
                let client = app.client.get_untracked();
                match client.upsert_profile(&row).await {
                    Ok(()) => {
                        app.profile.set(row);
                        notifier.success("Profile saved");
                    }
                    Err(e) => report_write_error(&app, e),
                }
                saving.set(false);
            });
        }
    };

    let on_avatar_pick = {
        let app = app.clone();
        move |ev: web_sys::Event| {
            upload_into(app.clone(), ev, "avatars", avatar_url, uploading_avatar)
        }
    };
    let on_mascot_pick = {
        let app = app.clone();
        move |ev: web_sys::Event| {
            upload_into(app.clone(), ev, "mascots", mascot_url, uploading_mascot)
        }
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">"Profile"</CardTitle>
                <CardDescription class="text-xs">
                    "What visitors see at the top of your page."
                </CardDescription>
            </CardHeader>
            <CardContent>
                <form class="flex flex-col gap-3" on:submit=on_submit>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="profile-name" class="text-xs">"Name"</Label>
                        <Input id="profile-name" bind_value=name class="h-8 text-sm" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="profile-bio" class="text-xs">"Bio"</Label>
                        <Textarea id="profile-bio" bind_value=bio class="text-sm" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="profile-slug" class="text-xs">"Public name (slug)"</Label>
                        <Input
                            id="profile-slug"
                            placeholder="your-name"
                            bind_value=slug
                            class="h-8 text-sm"
                        />
                        <span class="text-xs text-zinc-400">
                            "Lowercase letters, digits and dashes. This becomes your ?u= address."
                        </span>
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label class="text-xs">"Avatar"</Label>
                        <input
                            type="file"
                            accept="image/*"
                            class="text-xs text-zinc-500"
                            disabled=move || uploading_avatar.get()
                            on:change=on_avatar_pick
                        />
                        <Show when=move || uploading_avatar.get() fallback=|| ().into_view()>
                            <span class="text-xs text-zinc-400 inline-flex items-center gap-1">
                                <Spinner class="size-3" />
                                "Uploading…"
                            </span>
                        </Show>
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label class="text-xs">"Mascot (optional)"</Label>
                        <input
                            type="file"
                            accept="image/*"
                            class="text-xs text-zinc-500"
                            disabled=move || uploading_mascot.get()
                            on:change=on_mascot_pick
                        />
                        <Show when=move || uploading_mascot.get() fallback=|| ().into_view()>
                            <span class="text-xs text-zinc-400 inline-flex items-center gap-1">
                                <Spinner class="size-3" />
                                "Uploading…"
                            </span>
                        </Show>
                    </div>

                    <Button
                        size=ButtonSize::Sm
                        class="w-fit"
                        attr:disabled=move || {
                            saving.get() || uploading_avatar.get() || uploading_mascot.get()
                        }
                    >
                        "Save profile"
                    </Button>
                </form>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_form_requires_title_and_url() {
        assert!(validate_link_form("", "https://x").is_err());
        assert!(validate_link_form("   ", "https://x").is_err());
        assert!(validate_link_form("My site", "").is_err());
        assert!(validate_link_form("My site", "https://x").is_ok());
    }

    #[test]
    fn news_form_requires_title_and_content() {
        assert!(validate_news_form("", "body").is_err());
        assert!(validate_news_form("title", "  ").is_err());
        assert!(validate_news_form("title", "body").is_ok());
    }

    #[test]
    fn profile_form_requires_name() {
        assert!(validate_profile_form("").is_err());
        assert!(validate_profile_form("Acme").is_ok());
    }

    #[test]
    fn failed_upload_keeps_the_previous_field_value() {
        let err = ApiError {
            kind: ApiErrorKind::Http,
            message: "bucket missing".to_string(),
        };
        let kept = field_value_after_upload("https://cdn/u1/old.png".to_string(), Err(&err));
        assert_eq!(kept, "https://cdn/u1/old.png");

        let replaced = field_value_after_upload(
            "https://cdn/u1/old.png".to_string(),
            Ok("https://cdn/u1/new.png".to_string()),
        );
        assert_eq!(replaced, "https://cdn/u1/new.png");
    }

    #[test]
    fn declined_delete_confirmation_yields_no_request_id() {
        assert_eq!(confirmed_delete_id(false, "l1"), None);
        assert_eq!(confirmed_delete_id(true, "l1"), Some("l1".to_string()));
    }

    #[test]
    fn seeded_name_comes_from_the_email_local_part() {
        assert_eq!(seeded_profile_name("ada@example.com"), "ada");
        assert_eq!(seeded_profile_name(""), "New profile");
        assert_eq!(seeded_profile_name("@example.com"), "New profile");
    }
}
