//! Category Pills Component
//!
//! Horizontal row of category filter pills, "All" first.

use dioxus::prelude::*;
use folio_core::CategoryFilter;

/// Properties for the CategoryPills component
#[derive(Clone, PartialEq, Props)]
pub struct CategoryPillsProps {
    /// Pill labels, usually `CategorySet::pills()`
    pub categories: Vec<String>,
    /// Active filter
    pub selected: CategoryFilter,
    /// Handler called with the filter of the clicked pill
    pub on_select: EventHandler<CategoryFilter>,
}

/// Displays a horizontal row of selectable category pills
///
/// # Example
///
/// ```rust,ignore
/// let mut active = use_signal(|| CategoryFilter::All);
///
/// rsx! {
///     CategoryPills {
///         categories: gallery.categories().pills(),
///         selected: active(),
///         on_select: move |filter| active.set(filter)
///     }
/// }
/// ```
#[component]
pub fn CategoryPills(props: CategoryPillsProps) -> Element {
    rsx! {
        div {
            class: "category-pills",
            role: "radiogroup",
            "aria-label": "Filter by category",
            for cat in props.categories.iter() {
                {
                    let filter = CategoryFilter::from_label(cat);
                    let is_selected = pill_selected(cat, &props.selected);
                    let on_select = props.on_select;
                    rsx! {
                        button {
                            key: "{cat}",
                            class: if is_selected { "pill selected" } else { "pill" },
                            role: "radio",
                            "aria-checked": if is_selected { "true" } else { "false" },
                            onclick: move |_| on_select.call(filter.clone()),
                            "{cat}"
                        }
                    }
                }
            }
        }
    }
}

/// Whether the pill labelled `pill` represents the active filter
pub fn pill_selected(pill: &str, active: &CategoryFilter) -> bool {
    match (CategoryFilter::from_label(pill), active) {
        (CategoryFilter::All, CategoryFilter::All) => true,
        (CategoryFilter::Label(label), CategoryFilter::Label(_)) => active.matches(&[label]),
        _ => false,
    }
}
