use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-white text-zinc-900 flex flex-col gap-4 rounded-2xl border border-zinc-200 py-6 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1.5 px-6"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardContent, div, "px-6"}
    clx! {CardDescription, p, "text-zinc-500 text-sm"}
    clx! {CardFooter, footer, "flex items-center px-6", "gap-2"}
    clx! {CardList, ul, "flex flex-col gap-3"}
    clx! {CardItem, li, "flex items-center gap-3 [&_svg:not([class*='size-'])]:size-4 [&_svg]:shrink-0"}
}

#[allow(unused_imports)]
pub use components::*;
