//! Published controller state.

use serde::Serialize;

use crate::config::ControllerOptions;
use crate::controller::QueryParams;
use crate::window::{compute_visible_range, VisibleRange};

/// Lifecycle of the main collection's requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

// == Data State ==
/// Snapshot of everything a view renders from.
#[derive(Debug, Clone, Serialize)]
pub struct DataState<T> {
    /// Main collection
    pub data: Vec<T>,
    /// True while any request is in flight
    pub loading: bool,
    pub phase: LoadPhase,
    /// Message of the latest failure, cleared when a new request starts
    pub error: Option<String>,
    pub total_count: usize,
    /// Last page applied to `data`, starting at 1
    pub current_page: u32,
    pub has_more: bool,
    pub search_query: String,
    pub search_results: Vec<T>,
    pub is_searching: bool,
    pub is_filtering: bool,
    /// Accumulated filter parameters
    pub filter_params: QueryParams,
    pub scroll_top: f64,
    pub container_height: f64,
    pub item_height: f64,
}

impl<T> DataState<T> {
    pub(crate) fn new(options: &ControllerOptions) -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            phase: LoadPhase::Idle,
            error: None,
            total_count: 0,
            current_page: 1,
            has_more: true,
            search_query: String::new(),
            search_results: Vec::new(),
            is_searching: false,
            is_filtering: false,
            filter_params: QueryParams::new(),
            scroll_top: 0.0,
            container_height: 0.0,
            item_height: options.item_height,
        }
    }

    /// Rows of `data` inside the viewport, or all rows when `windowed` is false.
    pub fn visible_range(&self, windowed: bool) -> VisibleRange {
        if !windowed {
            return VisibleRange {
                start: 0,
                end: self.data.len(),
            };
        }
        compute_visible_range(
            self.scroll_top,
            self.container_height,
            self.item_height,
            self.data.len(),
        )
    }

    pub fn visible_items(&self, windowed: bool) -> &[T] {
        &self.data[self.visible_range(windowed).as_range()]
    }
}
