//! Masonry column partitioning

use crate::config::LayoutConfig;
use feed_api::ImageItem;

/// Items split into display columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Vec<ImageItem>>,
}

impl ColumnLayout {
    /// `column_count` empty columns
    pub fn empty(column_count: usize) -> Self {
        Self {
            columns: vec![Vec::new(); column_count.max(1)],
        }
    }

    pub fn columns(&self) -> &[Vec<ImageItem>] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn item_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Position in the laid out slice of the item at `row` of `column`
    pub fn slice_index(&self, column: usize, row: usize) -> Option<usize> {
        self.columns.get(column)?.get(row)?;
        Some(row * self.columns.len() + column)
    }
}

/// Split `items` round-robin: position `i` goes to column `i % column_count`.
///
/// Column heights are not balanced; image aspect ratios are ignored.
pub fn assign(items: &[ImageItem], column_count: usize) -> ColumnLayout {
    let mut layout = ColumnLayout::empty(column_count);
    let n = layout.columns.len();
    for (i, item) in items.iter().enumerate() {
        layout.columns[i % n].push(item.clone());
    }
    layout
}

/// Viewport width classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Phones
    Compact,
    /// Tablets
    Medium,
    Wide,
}

impl DeviceClass {
    pub fn from_width(width: u32, layout: &LayoutConfig) -> Self {
        if width <= layout.compact_max_width {
            DeviceClass::Compact
        } else if width <= layout.medium_max_width {
            DeviceClass::Medium
        } else {
            DeviceClass::Wide
        }
    }

    pub fn column_count(self) -> usize {
        match self {
            DeviceClass::Compact => 1,
            DeviceClass::Medium => 2,
            DeviceClass::Wide => 3,
        }
    }
}

/// Column count for a viewport `width`
pub fn column_count_for_width(width: u32, layout: &LayoutConfig) -> usize {
    DeviceClass::from_width(width, layout).column_count()
}
