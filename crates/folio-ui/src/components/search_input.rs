//! Search Input Component

use dioxus::prelude::*;

/// Properties for the SearchInput component
#[derive(Clone, PartialEq, Props)]
pub struct SearchInputProps {
    /// Current (raw, undebounced) search text
    pub value: String,
    /// Handler called on every keystroke
    pub oninput: EventHandler<String>,
    /// Handler called when the clear button is pressed
    #[props(default)]
    pub on_clear: Option<EventHandler<()>>,
    /// Placeholder text
    #[props(default = "Search projects...".to_string())]
    pub placeholder: String,
}

/// Search field with icon and clear button
///
/// Keystrokes go out immediately; debouncing is the gallery's job.
#[component]
pub fn SearchInput(props: SearchInputProps) -> Element {
    let show_clear = props.on_clear.is_some() && !props.value.is_empty();

    rsx! {
        div { class: "search-input-wrapper",
            span { class: "search-icon", "\u{1F50D}" }
            input {
                class: "input-field search-input",
                r#type: "search",
                "aria-label": "Search projects",
                placeholder: "{props.placeholder}",
                value: "{props.value}",
                oninput: move |e| props.oninput.call(e.value()),
            }
            if show_clear {
                button {
                    class: "search-clear",
                    "aria-label": "Clear search",
                    onclick: move |_| {
                        if let Some(handler) = &props.on_clear {
                            handler.call(());
                        }
                    },
                    "\u{00D7}"
                }
            }
        }
    }
}
