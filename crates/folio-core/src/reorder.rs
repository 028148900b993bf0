//! Drag-to-reorder collision resolution against a pure slot layout

use crate::error::{Error, Result};
use crate::models::Document;

/// Pointer distance below which a slot center captures the dragged item
pub const DEFAULT_COLLISION_THRESHOLD_PX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned bounding box in container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Rendered positions of an ordered list.
///
/// `items[i]` is the box of the data item at render index `i`. Action cells
/// (such as the "new project" tile) are laid out alongside but are never
/// drop targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotLayout {
    pub items: Vec<Rect>,
    pub actions: Vec<Rect>,
}

impl SlotLayout {
    #[must_use]
    pub const fn new(items: Vec<Rect>, actions: Vec<Rect>) -> Self {
        Self { items, actions }
    }

    /// Uniform row-major grid of `count` item cells, followed by one action
    /// cell when `with_action` is set.
    #[must_use]
    pub fn grid(count: usize, columns: usize, cell: (f64, f64), gap: f64, with_action: bool) -> Self {
        let columns = columns.max(1);
        let (width, height) = cell;
        let place = |index: usize| {
            let col = u32::try_from(index % columns).unwrap_or(u32::MAX);
            let row = u32::try_from(index / columns).unwrap_or(u32::MAX);
            Rect::new(
                f64::from(col) * (width + gap),
                f64::from(row) * (height + gap),
                width,
                height,
            )
        };

        Self {
            items: (0..count).map(place).collect(),
            actions: if with_action {
                vec![place(count)]
            } else {
                Vec::new()
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A live permutation applied during a drag frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMove {
    pub id: String,
    pub from: usize,
    pub to: usize,
}

/// First item slot in render order, other than `from`, whose center is
/// strictly closer to `pointer` than `threshold`. Falls back to `from`.
#[must_use]
pub fn resolve_target(layout: &SlotLayout, from: usize, pointer: Point, threshold: f64) -> usize {
    layout
        .items
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != from)
        .find(|(_, rect)| pointer.distance_to(rect.center()) < threshold)
        .map_or(from, |(index, _)| index)
}

/// Remove the element at `from` and reinsert it at `to`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Tracks one drag gesture and turns pointer frames into index moves.
#[derive(Debug, Clone)]
pub struct ReorderEngine {
    threshold: f64,
    dragging: Option<String>,
}

impl Default for ReorderEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_THRESHOLD_PX)
    }
}

impl ReorderEngine {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            dragging: None,
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Start dragging `id`, returning its current index.
    pub fn begin_drag<R: Document>(&mut self, items: &[R], id: &str) -> Result<usize> {
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.dragging = Some(id.to_string());
        tracing::debug!("Drag started on {id} at index {index}");
        Ok(index)
    }

    /// Resolve one pointer frame, permuting `items` in place when the pointer
    /// captures another slot.
    pub fn drag_move<R: Document>(
        &self,
        items: &mut Vec<R>,
        layout: &SlotLayout,
        pointer: Point,
    ) -> Option<IndexMove> {
        let id = self.dragging.as_deref()?;
        let from = items.iter().position(|item| item.id() == id)?;
        let to = resolve_target(layout, from, pointer, self.threshold);
        if to == from || to >= items.len() {
            return None;
        }

        move_item(items, from, to);
        tracing::debug!("Moved {id} from {from} to {to}");
        Some(IndexMove {
            id: id.to_string(),
            from,
            to,
        })
    }

    /// Finish the gesture, returning the id that was being dragged.
    pub fn end_drag(&mut self) -> Option<String> {
        self.dragging.take()
    }
}
