//! Folio UI Components
//!
//! Dioxus components rendering the output of the folio-core gallery
//! pipeline: controls bar (search, category pills, sort, view toggle),
//! project cards with reveal-on-scroll styling, and the gallery grid.
//!
//! Components hold no pipeline state of their own. They take plain data
//! (`ProjectRecord`, `SortOrder`, `ViewMode`, reveal flags) and report user
//! intent through event handlers, so a host wires them to a
//! [`folio_core::Gallery`].
//!
//! ## Class Names
//!
//! - `project-card`, `project-card--grid` / `project-card--list`
//! - `is-revealed` once a card has scrolled into view
//! - `project-grid`, `project-grid--list`

pub mod components;

pub use components::*;
