//! Layered-text reader core: references, commentary normalization and
//! ordering, sidebar filtering, and the scroll map that keeps the
//! commentary panel in step with the base text.

pub mod app;
pub mod authoring;
pub mod cache;
pub mod cancellation;
pub mod commentary;
pub mod config;
pub mod debounce;
pub mod document;
pub mod reference;
pub mod scroll_map;
pub mod selection;
pub mod service;
pub mod text_utils;
