//! Home screen grid items and the grid-rendering collaborator
//!
//! The core never commits placements itself. It hit-tests through
//! [`GridHost`] and reports drag start/move/stop, the host owns the rest.

use serde::{Deserialize, Serialize};

use super::primitives::Rect;

/// Number of rows on the home screen grid
pub const ROW_COUNT: u32 = 6;
/// Number of columns on the home screen grid
pub const COLUMN_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridItemKind {
    Icon,
    Widget,
}

/// Cell placement, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    pub column: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl GridPlacement {
    /// A single-cell placement
    pub fn cell(column: u32, row: u32) -> Self {
        Self { column, row, width: 1, height: 1 }
    }
}

/// An icon or widget placed on the home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    /// Assigned by storage, `None` until first persisted
    pub id: Option<u64>,
    pub placement: GridPlacement,
    pub kind: GridItemKind,
    pub package: String,
    pub title: String,
}

impl GridItem {
    pub fn icon(column: u32, row: u32, package: &str, title: &str) -> Self {
        Self {
            id: None,
            placement: GridPlacement::cell(column, row),
            kind: GridItemKind::Icon,
            package: package.to_string(),
            title: title.to_string(),
        }
    }

    pub fn widget(placement: GridPlacement, package: &str, title: &str) -> Self {
        Self {
            id: None,
            placement,
            kind: GridItemKind::Widget,
            package: package.to_string(),
            title: title.to_string(),
        }
    }
}

/// The grid-rendering collaborator
pub trait GridHost {
    /// Which item, if any, is under the given point
    fn hit_test(&self, x: f64, y: f64) -> Option<GridItem>;

    fn item_dragging_started(&mut self, item: &GridItem);

    fn dragged_item_moved(&mut self, x: f64, y: f64);

    fn item_dragging_stopped(&mut self);

    fn remove_item(&mut self, id: u64);

    /// Re-read placements from storage
    fn reload_grid(&mut self);
}

/// Layout configuration for the home grid
#[derive(Debug, Clone)]
pub struct AppGridLayout {
    /// Width of one cell
    cell_width: f64,
    /// Height of one cell
    cell_height: f64,
    /// Top offset (for status bar)
    top_offset: f64,
    /// Side margin
    side_margin: f64,
}

impl AppGridLayout {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        let side_margin = 16.0;
        let top_offset = 72.0; // Status bar + some padding
        let bottom_offset = 48.0; // Navigation bar

        Self {
            cell_width: (screen_width - side_margin * 2.0) / COLUMN_COUNT as f64,
            cell_height: (screen_height - top_offset - bottom_offset) / ROW_COUNT as f64,
            top_offset,
            side_margin,
        }
    }

    /// Screen rectangle covered by a placement
    pub fn placement_rect(&self, placement: &GridPlacement) -> Rect {
        Rect::new(
            self.side_margin + placement.column as f64 * self.cell_width,
            self.top_offset + placement.row as f64 * self.cell_height,
            placement.width as f64 * self.cell_width,
            placement.height as f64 * self.cell_height,
        )
    }

    /// Topmost item under a point (later items draw on top)
    pub fn item_at<'a>(&self, items: &'a [GridItem], x: f64, y: f64) -> Option<&'a GridItem> {
        items
            .iter()
            .rev()
            .find(|item| self.placement_rect(&item.placement).contains(x, y))
    }
}
