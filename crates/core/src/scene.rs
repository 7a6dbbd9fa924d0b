use std::collections::BTreeMap;

use glam::DVec2;
use linecell_scene::{SceneFlow, ScenePlate, SceneResource, SceneResourceKind, SceneSnapshot};

use crate::catalog::SizeCatalog;
use crate::flow;
use crate::footprint::{self, Footprint};
use crate::frame;
use crate::line::{Line, ProcessId, ResourceKind};

fn scene_kind(kind: ResourceKind) -> SceneResourceKind {
    match kind {
        ResourceKind::Equipment => SceneResourceKind::Equipment,
        ResourceKind::Worker => SceneResourceKind::Worker,
        ResourceKind::Material => SceneResourceKind::Material,
    }
}

/// Resolves the whole line into world-frame drawables: one footprint plate
/// per process, every resource posed in world coordinates, and one flow
/// arrow per (process, successor) pair. Dangling successors are skipped.
pub fn scene_snapshot(line: &Line, catalog: &SizeCatalog) -> SceneSnapshot {
    let footprints: BTreeMap<ProcessId, Footprint> = line
        .processes()
        .map(|process| (process.id, footprint::process_footprint(process, catalog)))
        .collect();

    let mut snapshot = SceneSnapshot::default();
    for process in line.processes() {
        let Some(fp) = footprints.get(&process.id) else {
            continue;
        };
        let center = process.to_world(DVec2::new(fp.center_x, fp.center_z));
        snapshot.plates.push(ScenePlate {
            process: process.id.raw(),
            name: process.name.clone(),
            center: [center.x, 0.0, center.y],
            width: fp.width,
            depth: fp.depth,
            yaw: process.yaw,
        });

        let total = process.resources.len();
        for (index, resource) in process.resources.iter().enumerate() {
            let local = footprint::resolved_local(resource, index, total);
            let world = process.to_world(local);
            let size = catalog.size(resource.kind, resource.subtype.as_deref());
            snapshot.resources.push(SceneResource {
                process: process.id.raw(),
                resource_id: resource.resource_id.clone(),
                kind: scene_kind(resource.kind),
                position: [world.x, 0.0, world.y],
                yaw: frame::world_yaw(process.yaw, resource.yaw),
                scale: resource.scale,
                size: [size.width, size.height, size.depth],
            });
        }

        for successor in &process.successors {
            let (Some(next), Some(next_fp)) =
                (line.process(*successor), footprints.get(successor))
            else {
                continue;
            };
            let arrow = flow::flow_arrow(process, fp, next, next_fp);
            snapshot.flows.push(SceneFlow {
                start: [arrow.start.x, 0.0, arrow.start.y],
                end: [arrow.end.x, 0.0, arrow.end.y],
                direction: arrow.direction,
            });
        }
    }
    snapshot
}
