use machigai_core::{
    viewport_to_background, BoardGeometry, PlacementError, Point, RandomSource, Rect,
};
use web_sys::{Element, MouseEvent};
use yew::NodeRef;

/// Placement randomness from `Math.random`; puzzles themselves use the
/// seeded generator.
pub(crate) struct MathRandom;

impl RandomSource for MathRandom {
    fn next_unit(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// On-screen rect of a rendered element.
pub(crate) fn element_rect(node: &NodeRef) -> Option<Rect> {
    let element = node.cast::<Element>()?;
    let rect = element.get_bounding_client_rect();
    Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
}

pub(crate) fn read_geometry(
    background: &NodeRef,
    container: &NodeRef,
) -> Result<BoardGeometry, PlacementError> {
    BoardGeometry::from_rects(element_rect(background), element_rect(container))
}

pub(crate) fn client_point(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f64, event.client_y() as f64)
}

/// Pointer position relative to the background image, read at event time.
pub(crate) fn background_point(background: &NodeRef, event: &MouseEvent) -> Option<Point> {
    let rect = element_rect(background)?;
    Some(viewport_to_background(client_point(event), &rect))
}

pub(crate) fn px_style(rect: &Rect) -> String {
    format!(
        "left:{:.1}px;top:{:.1}px;width:{:.1}px;height:{:.1}px;",
        rect.x, rect.y, rect.width, rect.height
    )
}
