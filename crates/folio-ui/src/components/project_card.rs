//! Project Card Component
//!
//! One gallery entry: image, title, summary excerpt and tag preview.
//! Cards start hidden and transition in once revealed, staggered by their
//! position in the grid.

use std::time::Duration;

use dioxus::prelude::*;
use folio_core::config::{DEFAULT_EXCERPT_CHARS, DEFAULT_PREVIEW_TAGS};
use folio_core::reveal::DEFAULT_STAGGER;
use folio_core::{reveal_delay, ProjectRecord, ViewMode, PLACEHOLDER_IMAGE};
use tracing::debug;

/// Properties for the ProjectCard component
#[derive(Clone, PartialEq, Props)]
pub struct ProjectCardProps {
    pub project: ProjectRecord,
    /// Position in the rendered list, drives the entrance delay
    pub index: usize,
    /// Reveal flag from the tracker
    pub revealed: bool,
    #[props(default)]
    pub view: ViewMode,
    #[props(default = PLACEHOLDER_IMAGE.to_string())]
    pub placeholder: String,
    #[props(default = DEFAULT_EXCERPT_CHARS)]
    pub excerpt_chars: usize,
    #[props(default = DEFAULT_PREVIEW_TAGS)]
    pub preview_tags: usize,
    #[props(default = DEFAULT_STAGGER)]
    pub stagger: Duration,
    /// Handler called with the detail route when the card is activated
    pub on_open: EventHandler<String>,
}

/// Displays a single project in the gallery
///
/// # Example
///
/// ```rust,ignore
/// rsx! {
///     ProjectCard {
///         project: record.clone(),
///         index: i,
///         revealed: gallery.is_revealed(&record.id),
///         view: ViewMode::Grid,
///         on_open: move |route| navigator.push(route)
///     }
/// }
/// ```
#[component]
pub fn ProjectCard(props: ProjectCardProps) -> Element {
    let mut image_failed = use_signal(|| false);

    let project = &props.project;
    let route = project.detail_route();
    let image = if image_failed() {
        props.placeholder.clone()
    } else {
        project.display_image(&props.placeholder).to_string()
    };
    let title = project.display_title().to_string();
    let excerpt = project.excerpt(props.excerpt_chars);
    let tags = project.preview_tags(props.preview_tags).to_vec();
    let class = card_class(props.view, props.revealed);
    let style = transition_style(props.index, props.stagger);
    let on_open = props.on_open;
    let id = project.id.clone();

    rsx! {
        article {
            class: "{class}",
            style: "{style}",
            role: "link",
            tabindex: "0",
            onclick: {
                let route = route.clone();
                move |_| on_open.call(route.clone())
            },
            onkeydown: move |e: KeyboardEvent| {
                if e.key() == Key::Enter {
                    on_open.call(route.clone());
                }
            },
            div { class: "project-card__media",
                img {
                    class: "project-card__img",
                    src: "{image}",
                    alt: "{title}",
                    loading: "lazy",
                    onerror: move |_| {
                        debug!(%id, "Project image failed, using placeholder");
                        image_failed.set(true);
                    },
                }
            }
            div { class: "project-card__body",
                h3 { class: "project-card__title", "{title}" }
                if let Some(category) = project.categories.first() {
                    span { class: "project-card__category", "{category}" }
                }
                p { class: "project-card__excerpt", "{excerpt}" }
                if !tags.is_empty() {
                    ul { class: "project-card__tags",
                        for tag in tags {
                            li { key: "{tag}", class: "tag", "{tag}" }
                        }
                    }
                }
            }
        }
    }
}

/// Loading placeholder with the card's shape
#[component]
pub fn ProjectCardSkeleton(#[props(default)] view: ViewMode) -> Element {
    let class = card_class(view, true);

    rsx! {
        div {
            class: "{class} project-card--skeleton",
            "aria-hidden": "true",
            div { class: "project-card__media skeleton" }
            div { class: "project-card__body",
                div { class: "skeleton skeleton--title" }
                div { class: "skeleton skeleton--text" }
                div { class: "skeleton skeleton--text short" }
            }
        }
    }
}

/// Class list for a card in `view`, with the reveal state applied
pub fn card_class(view: ViewMode, revealed: bool) -> String {
    let mut class = format!("project-card project-card--{}", view.as_str());
    if revealed {
        class.push_str(" is-revealed");
    }
    class
}

/// Inline style carrying the staggered entrance delay
pub fn transition_style(index: usize, stagger: Duration) -> String {
    format!("transition-delay: {}ms;", reveal_delay(index, stagger).as_millis())
}
