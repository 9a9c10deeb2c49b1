//! Sort Select Component

use dioxus::prelude::*;
use folio_core::SortOrder;

/// Properties for the SortSelect component
#[derive(Clone, PartialEq, Props)]
pub struct SortSelectProps {
    /// Current sort order
    pub value: SortOrder,
    /// Handler called with the newly chosen order
    pub on_change: EventHandler<SortOrder>,
}

/// Drop-down of the available sort orders
///
/// # Example
///
/// ```rust,ignore
/// rsx! {
///     SortSelect {
///         value: sort(),
///         on_change: move |order| gallery.set_sort_order(order)
///     }
/// }
/// ```
#[component]
pub fn SortSelect(props: SortSelectProps) -> Element {
    let current = props.value.as_key();

    rsx! {
        label { class: "sort-select",
            span { class: "sort-select__label", "Sort by" }
            select {
                class: "sort-select__input",
                value: "{current}",
                onchange: move |e| props.on_change.call(SortOrder::parse(&e.value())),
                for (key, label) in sort_options() {
                    option {
                        key: "{key}",
                        value: "{key}",
                        selected: key == current,
                        "{label}"
                    }
                }
            }
        }
    }
}

/// `(key, label)` pairs for every selectable order
pub fn sort_options() -> Vec<(&'static str, &'static str)> {
    SortOrder::ALL
        .iter()
        .map(|order| (order.as_key(), order.label()))
        .collect()
}
