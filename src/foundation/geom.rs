//! Rect helpers with the empty-rect semantics damage tracking needs.
//!
//! `kurbo::Rect::union` grows to include degenerate rects, which would turn "no damage" into damage
//! at the origin. Everything here treats a zero-area rect as the empty set.

use crate::foundation::core::Rect;

/// `true` when the rect covers no area (including inverted rects).
pub fn is_empty_rect(r: Rect) -> bool {
    !(r.width() > 0.0 && r.height() > 0.0)
}

/// Union that ignores empty operands.
pub fn union_non_empty(a: Rect, b: Rect) -> Rect {
    match (is_empty_rect(a), is_empty_rect(b)) {
        (true, true) => Rect::ZERO,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}

/// Intersection that collapses to [`Rect::ZERO`] when the operands are disjoint.
pub fn intersect_rects(a: Rect, b: Rect) -> Rect {
    let r = a.intersect(b);
    if is_empty_rect(r) { Rect::ZERO } else { r }
}

/// `true` when `inner` lies entirely within `outer`. Empty rects are contained by anything.
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    if is_empty_rect(inner) {
        return true;
    }
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Subtract `b` from `a`, keeping the result rectangular.
///
/// The result only shrinks when `b` covers `a` entirely or spans a full edge band of `a`;
/// any other overlap leaves `a` unchanged.
pub fn subtract_rect(a: Rect, b: Rect) -> Rect {
    if is_empty_rect(a) || contains_rect(b, a) {
        return Rect::ZERO;
    }
    if is_empty_rect(intersect_rects(a, b)) {
        return a;
    }

    let mut out = a;
    if b.x0 <= a.x0 && b.x1 >= a.x1 {
        if b.y0 <= a.y0 {
            out.y0 = b.y1;
        } else if b.y1 >= a.y1 {
            out.y1 = b.y0;
        }
    } else if b.y0 <= a.y0 && b.y1 >= a.y1 {
        if b.x0 <= a.x0 {
            out.x0 = b.x1;
        } else if b.x1 >= a.x1 {
            out.x1 = b.x0;
        }
    }
    out
}

/// Smallest integer-aligned rect containing `r`.
pub fn enclosing_rect(r: Rect) -> Rect {
    if is_empty_rect(r) {
        return Rect::ZERO;
    }
    Rect::new(r.x0.floor(), r.y0.floor(), r.x1.ceil(), r.y1.ceil())
}
