use glam::DVec2;

use crate::footprint::Footprint;
use crate::line::Process;

/// World-frame endpoints of the connector between two adjacent processes,
/// plus the heading for the arrowhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowArrow {
    pub start: DVec2,
    pub end: DVec2,
    pub direction: f64,
}

/// The arrow leaves `from` at the midpoint of its footprint's right edge and
/// enters `to` at the midpoint of its left edge, each taken in the owning
/// process's local frame, so the endpoints stay on the cell boundary under
/// any rotation.
pub fn flow_arrow(
    from: &Process,
    from_footprint: &Footprint,
    to: &Process,
    to_footprint: &Footprint,
) -> FlowArrow {
    let start = from.to_world(from_footprint.exit_point());
    let end = to.to_world(to_footprint.entry_point());
    let direction = (end.y - start.y).atan2(end.x - start.x);
    FlowArrow {
        start,
        end,
        direction,
    }
}
