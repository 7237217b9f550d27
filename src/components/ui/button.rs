use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-lg text-sm font-medium transition-all disabled:pointer-events-none disabled:opacity-50 [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 shrink-0 [&_svg]:shrink-0 outline-none focus-visible:ring-2 focus-visible:ring-indigo-400/60 w-fit hover:cursor-pointer active:scale-[0.98] touch-manipulation select-none",
        variants: {
            variant: {
                Default: "bg-indigo-600 text-white shadow-sm hover:bg-indigo-500",
                Destructive: "bg-rose-600 text-white shadow-sm hover:bg-rose-500",
                Outline: "border border-zinc-300 bg-white text-zinc-700 shadow-sm hover:bg-zinc-50",
                Ghost: "text-zinc-600 hover:bg-zinc-100 hover:text-zinc-900",
                Link: "text-indigo-600 underline-offset-4 hover:underline",
            },
            size: {
                Default: "h-9 px-4 py-2",
                Sm: "h-8 rounded-md gap-1.5 px-3 text-xs",
                Lg: "h-11 rounded-xl px-6",
                Icon: "size-9",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}
