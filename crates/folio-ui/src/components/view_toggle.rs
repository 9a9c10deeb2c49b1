//! View Toggle Component
//!
//! Grid/list layout switch.

use dioxus::prelude::*;
use folio_core::ViewMode;

#[derive(Clone, PartialEq, Props)]
pub struct ViewToggleProps {
    pub value: ViewMode,
    pub on_change: EventHandler<ViewMode>,
}

#[component]
pub fn ViewToggle(props: ViewToggleProps) -> Element {
    rsx! {
        div {
            class: "view-toggle",
            role: "group",
            "aria-label": "Layout",
            for (mode, icon) in [(ViewMode::Grid, "\u{25A6}"), (ViewMode::List, "\u{2630}")] {
                button {
                    key: "{mode}",
                    class: toggle_class(mode, props.value),
                    "aria-pressed": if mode == props.value { "true" } else { "false" },
                    title: "{mode}",
                    onclick: move |_| props.on_change.call(mode),
                    "{icon}"
                }
            }
        }
    }
}

/// Class of the toggle button for `mode` given the active layout
pub fn toggle_class(mode: ViewMode, active: ViewMode) -> &'static str {
    if mode == active {
        "view-toggle__btn active"
    } else {
        "view-toggle__btn"
    }
}
