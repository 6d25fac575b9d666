//! Distance of a click below the rendered content.
//!
//! Pointer offsets are local to the event target. The click is lifted into the
//! scroller's frame along the target's offset-parent chain; the bottom of the
//! content root's last element is lifted along its own chain. Both chains stop
//! at the scroller, so the difference is a plain vertical distance.

use core_events::ElementId;
use core_model::GeometryProvider;
use thiserror::Error;

/// Host integration faults. Any of these aborts the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum IntegrationFault {
    #[error("cannot locate the scroll container")]
    MissingScroller,
    #[error("cannot locate the content root")]
    MissingContentRoot,
    #[error("content root has no rendered elements")]
    EmptyContent,
    #[error("click target is not inside the scroll container")]
    DetachedTarget,
    #[error("content is not inside the scroll container")]
    DetachedContent,
}

/// Signed distance in pixels between the click and the content bottom,
/// both in `scroller`'s frame. Positive means the click is below the content.
pub fn distance_below_content(
    geometry: &dyn GeometryProvider,
    scroller: ElementId,
    content: ElementId,
    target: ElementId,
    offset_y: f64,
) -> Result<f64, IntegrationFault> {
    let click_y = geometry
        .offset_relative_to(target, offset_y, scroller)
        .ok_or(IntegrationFault::DetachedTarget)?;
    let last = geometry
        .last_child(content)
        .ok_or(IntegrationFault::EmptyContent)?;
    let content_bottom = geometry
        .bounding_bottom(last, scroller)
        .ok_or(IntegrationFault::DetachedContent)?;
    Ok(click_y - content_bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{ElementTree, TextLayout, build_text_surface};

    fn surface(lines: usize) -> (ElementTree, core_model::RenderedSurface) {
        let mut tree = ElementTree::new();
        let layout = TextLayout {
            line_height: 24.0,
            padding_top: 16.0,
            ..TextLayout::default()
        };
        let s = build_text_surface(&mut tree, &layout, lines).unwrap();
        (tree, s)
    }

    #[test]
    fn click_on_content_below_last_line() {
        let (tree, s) = surface(1);
        // last line bottom in content frame is 24; click 40px below it
        let d = distance_below_content(&tree, s.scroller, s.content, s.content, 64.0).unwrap();
        assert_eq!(d, 40.0);
    }

    #[test]
    fn click_inside_a_line_is_negative() {
        let (tree, s) = surface(3);
        let first = tree.get(s.content).unwrap().children()[0];
        let d = distance_below_content(&tree, s.scroller, s.content, first, 5.0).unwrap();
        assert!(d < 0.0);
    }

    #[test]
    fn click_on_scroller_uses_offset_directly() {
        let (tree, s) = surface(1);
        // content bottom in scroller frame: 16 padding + 24
        let d = distance_below_content(&tree, s.scroller, s.content, s.scroller, 50.0).unwrap();
        assert_eq!(d, 10.0);
    }

    #[test]
    fn empty_content_is_a_fault() {
        let (mut tree, s) = surface(1);
        tree.clear_children(s.content);
        assert_eq!(
            distance_below_content(&tree, s.scroller, s.content, s.content, 0.0),
            Err(IntegrationFault::EmptyContent)
        );
    }

    #[test]
    fn target_outside_scroller_is_a_fault() {
        let (tree, s) = surface(1);
        assert_eq!(
            distance_below_content(&tree, s.scroller, s.content, s.root, 0.0),
            Err(IntegrationFault::DetachedTarget)
        );
    }
}
