//! Rendered layout of a text view.
//!
//! A text view renders into a fixed-shape subtree:
//!
//! ```text
//! ViewContainer
//! └─ Scroller            (offset_top = header_height, carries line-height style)
//!    └─ Sizer            (offset_top = 0, height = scrollable extent)
//!       └─ Content       (offset_top = padding_top, height >= viewport)
//!          └─ Line × N   (offset_top = i * line_height, height = line_height)
//! ```
//!
//! Content is stretched to at least the viewport height so clicks in the
//! empty area below the last line land on the content element, the way an
//! editor surface with `min-height: 100%` behaves. [`relayout_lines`] runs
//! after every buffer mutation and reuses line elements by index, so element
//! slots grow with the number of lines added, not with the number of edits.
//!
//! Invariants:
//! * Line `i` occupies `[i * line_height, (i + 1) * line_height)` in content space.
//! * `content.offset_height >= line_count * line_height`.
//! * `sizer.offset_height == padding_top + content.offset_height`.

use crate::element::{Element, ElementRole, ElementTree};
use core_events::ElementId;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub line_height: f64,
    /// Line-height string reported as computed style. `None` reports
    /// `"{line_height}px"`; hosts without a pixel value report e.g. `"normal"`.
    pub line_height_style: Option<String>,
    pub padding_top: f64,
    pub header_height: f64,
    pub viewport_height: f64,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            line_height_style: None,
            padding_top: 16.0,
            header_height: 40.0,
            viewport_height: 600.0,
        }
    }
}

impl TextLayout {
    pub fn style_value(&self) -> String {
        self.line_height_style
            .clone()
            .unwrap_or_else(|| format!("{}px", self.line_height))
    }
}

/// Element ids of a text view's rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedSurface {
    pub root: ElementId,
    pub scroller: ElementId,
    pub sizer: ElementId,
    pub content: ElementId,
}

/// Build the element subtree for a text view with `line_count` lines.
pub fn build_text_surface(
    tree: &mut ElementTree,
    layout: &TextLayout,
    line_count: usize,
) -> Option<RenderedSurface> {
    let root = tree.insert_root(
        Element::new(ElementRole::ViewContainer)
            .with_box(0.0, layout.header_height + layout.viewport_height),
    );
    let scroller = tree.append_child(
        root,
        Element::new(ElementRole::Scroller)
            .with_box(layout.header_height, layout.viewport_height)
            .with_line_height(layout.style_value()),
    )?;
    let sizer = tree.append_child(scroller, Element::new(ElementRole::Sizer))?;
    let content = tree.append_child(
        sizer,
        Element::new(ElementRole::Content).with_box(layout.padding_top, 0.0),
    )?;
    let surface = RenderedSurface {
        root,
        scroller,
        sizer,
        content,
    };
    relayout_lines(tree, &surface, layout, line_count);
    Some(surface)
}

/// Resize the line elements and content + sizer for `line_count` lines.
///
/// Existing line elements keep their ids and are only re-measured; surplus
/// ones are removed from the end and missing ones appended, so the tree only
/// allocates for lines that were actually added.
pub fn relayout_lines(
    tree: &mut ElementTree,
    surface: &RenderedSurface,
    layout: &TextLayout,
    line_count: usize,
) {
    let existing: Vec<ElementId> = match tree.get(surface.content) {
        Some(content) => content.children().to_vec(),
        None => return,
    };
    for surplus in existing.iter().skip(line_count) {
        tree.remove_subtree(*surplus);
    }
    for i in 0..line_count {
        let top = i as f64 * layout.line_height;
        match existing.get(i).and_then(|id| tree.get_mut(*id)) {
            Some(line) => {
                line.offset_top = top;
                line.offset_height = layout.line_height;
            }
            None => {
                let line = Element::new(ElementRole::Line).with_box(top, layout.line_height);
                if tree.append_child(surface.content, line).is_none() {
                    return;
                }
            }
        }
    }
    let lines_height = line_count as f64 * layout.line_height;
    let content_height = lines_height.max(layout.viewport_height - layout.padding_top);
    if let Some(content) = tree.get_mut(surface.content) {
        content.offset_height = content_height;
    }
    if let Some(sizer) = tree.get_mut(surface.sizer) {
        sizer.offset_height = layout.padding_top + content_height;
    }
}
