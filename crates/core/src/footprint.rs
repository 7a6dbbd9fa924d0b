use glam::DVec2;
use tracing::warn;

use crate::catalog::SizeCatalog;
use crate::frame;
use crate::layout;
use crate::line::{Placement, Process, ResourcePlacement};

/// Axis-aligned bounding rectangle of a process's resources, in the
/// process-local frame. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f64,
    pub depth: f64,
    pub center_x: f64,
    pub center_z: f64,
}

/// Footprint of a process with no usable resources.
pub const EMPTY_FOOTPRINT: Footprint = Footprint {
    width: 0.5,
    depth: 0.5,
    center_x: 0.0,
    center_z: 0.0,
};

impl Footprint {
    pub fn min_x(&self) -> f64 {
        self.center_x - self.width * 0.5
    }

    pub fn max_x(&self) -> f64 {
        self.center_x + self.width * 0.5
    }

    pub fn min_z(&self) -> f64 {
        self.center_z - self.depth * 0.5
    }

    pub fn max_z(&self) -> f64 {
        self.center_z + self.depth * 0.5
    }

    /// Midpoint of the right edge, where outgoing flow leaves the cell.
    pub fn exit_point(&self) -> DVec2 {
        DVec2::new(self.max_x(), self.center_z)
    }

    /// Midpoint of the left edge, where incoming flow enters the cell.
    pub fn entry_point(&self) -> DVec2 {
        DVec2::new(self.min_x(), self.center_z)
    }
}

/// Local position of a resource: explicit placements as stored, auto
/// placements from the grid layout over the owning list.
pub fn resolved_local(resource: &ResourcePlacement, index: usize, total: usize) -> DVec2 {
    match resource.placement {
        Placement::Explicit { x, z } => DVec2::new(x, z),
        Placement::Auto => layout::auto_slot(index, total),
    }
}

pub fn process_footprint(process: &Process, catalog: &SizeCatalog) -> Footprint {
    resources_footprint(&process.resources, catalog)
}

pub fn resources_footprint(resources: &[ResourcePlacement], catalog: &SizeCatalog) -> Footprint {
    if resources.is_empty() {
        return EMPTY_FOOTPRINT;
    }
    let total = resources.len();
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    let mut any = false;
    for (index, resource) in resources.iter().enumerate() {
        let local = resolved_local(resource, index, total);
        let size = catalog.size(resource.kind, resource.subtype.as_deref());
        let half_width = size.width * resource.scale[0] * 0.5;
        let half_depth = size.depth * resource.scale[2] * 0.5;
        if !local.is_finite() || !half_width.is_finite() || !half_depth.is_finite() {
            warn!(
                "skipping resource {} with non-finite geometry",
                resource.resource_id
            );
            continue;
        }
        let corners = [
            DVec2::new(-half_width, -half_depth),
            DVec2::new(half_width, -half_depth),
            DVec2::new(half_width, half_depth),
            DVec2::new(-half_width, half_depth),
        ];
        for corner in corners {
            let point = local + frame::rotate(resource.yaw, corner);
            min = min.min(point);
            max = max.max(point);
        }
        any = true;
    }
    if !any {
        return EMPTY_FOOTPRINT;
    }
    Footprint {
        width: max.x - min.x,
        depth: max.y - min.y,
        center_x: (min.x + max.x) * 0.5,
        center_z: (min.y + max.y) * 0.5,
    }
}
