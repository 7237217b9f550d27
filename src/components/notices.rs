use crate::notify::Severity;
use crate::state::AppContext;
use leptos::prelude::*;

/// Stacked transient notices, newest at the bottom. Click dismisses early;
/// otherwise each notice drops off when its own timer fires.
#[component]
pub fn NoticeStack() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let notifier = app.notifier;

    view! {
        <div class="fixed bottom-4 right-4 z-50 flex flex-col gap-2 max-w-sm">
            {move || {
                notifier
                    .items
                    .get()
                    .into_iter()
                    .map(|n| {
                        let tone = match n.severity {
                            Severity::Success => "bg-emerald-600 text-white",
                            Severity::Error => "bg-rose-600 text-white",
                            Severity::Info => "bg-zinc-800 text-white",
                        };
                        let id = n.id;
                        view! {
                            <button
                                class=format!(
                                    "rounded-lg px-4 py-2 text-sm shadow-lg text-left cursor-pointer {tone}"
                                )
                                on:click=move |_| notifier.dismiss(id)
                            >
                                {n.message}
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
