//! Project Grid Component
//!
//! Renders the visible list in grid or list layout, skeleton cards while
//! loading, and an empty state with a way back to the full list.

use dioxus::prelude::*;
use folio_core::{ProjectId, ProjectRecord, ViewMode};

use super::{ProjectCard, ProjectCardSkeleton};

/// Skeleton cards shown while the first snapshot loads
pub const SKELETON_CARDS: usize = 6;

/// Properties for the ProjectGrid component
#[derive(Clone, PartialEq, Props)]
pub struct ProjectGridProps {
    /// Output of the filter-sort pipeline
    pub projects: Vec<ProjectRecord>,
    /// Ids whose reveal flag is set
    #[props(default)]
    pub revealed: Vec<ProjectId>,
    #[props(default)]
    pub view: ViewMode,
    #[props(default = false)]
    pub loading: bool,
    /// Load error to show instead of the empty state
    #[props(default)]
    pub error: Option<String>,
    /// Handler called with a detail route
    pub on_open: EventHandler<String>,
    /// Handler for the empty state's "Clear Filters" button
    pub on_clear_filters: EventHandler<()>,
}

#[component]
pub fn ProjectGrid(props: ProjectGridProps) -> Element {
    let class = grid_class(props.view);

    if props.loading && props.projects.is_empty() {
        return rsx! {
            div { class: "{class}", "aria-busy": "true",
                for i in 0..SKELETON_CARDS {
                    ProjectCardSkeleton { key: "{i}", view: props.view }
                }
            }
        };
    }

    if let Some(error) = &props.error {
        return rsx! {
            div { class: "gallery-empty gallery-empty--error", role: "alert",
                h3 { "Could not load projects" }
                p { "{error}" }
            }
        };
    }

    if props.projects.is_empty() {
        let on_clear = props.on_clear_filters;
        return rsx! {
            div { class: "gallery-empty",
                h3 { "No projects found" }
                p { "Try adjusting your search or category filters." }
                button {
                    class: "btn-primary",
                    onclick: move |_| on_clear.call(()),
                    "Clear Filters"
                }
            }
        };
    }

    rsx! {
        div { class: "{class}",
            for (index, project) in props.projects.iter().enumerate() {
                ProjectCard {
                    key: "{project.id}",
                    project: project.clone(),
                    index,
                    revealed: props.revealed.contains(&project.id),
                    view: props.view,
                    on_open: props.on_open,
                }
            }
        }
    }
}

/// Container class for `view`
pub fn grid_class(view: ViewMode) -> String {
    match view {
        ViewMode::Grid => "project-grid".to_string(),
        ViewMode::List => "project-grid project-grid--list".to_string(),
    }
}
