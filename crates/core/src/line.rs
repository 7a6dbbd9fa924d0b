use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::catalog::SizeCatalog;
use crate::footprint;
use crate::frame;
use crate::layout;
use crate::session::PoseUpdate;

/// World z spacing between expanded parallel lines of one process.
pub const PARALLEL_LINE_SPACING: f64 = 5.0;

const CENTER_EPSILON: f64 = 1.0e-3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(u64);

impl ProcessId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Equipment,
    Worker,
    Material,
}

/// Where a resource sits in its process's local frame. `Auto` defers to the
/// grid layout; `Explicit` is honored as stored, including at the origin.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Placement {
    #[default]
    Auto,
    Explicit {
        x: f64,
        z: f64,
    },
}

impl Placement {
    /// Maps sentinel-era data where a relative location of exactly (0, 0)
    /// meant "not placed". Only this constructor collapses the origin.
    pub fn from_legacy(x: f64, z: f64) -> Self {
        if x == 0.0 && z == 0.0 {
            Placement::Auto
        } else {
            Placement::Explicit { x, z }
        }
    }

    pub fn explicit(self) -> Option<DVec2> {
        match self {
            Placement::Auto => None,
            Placement::Explicit { x, z } => Some(DVec2::new(x, z)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePlacement {
    pub kind: ResourceKind,
    pub resource_id: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub parallel_line_index: Option<usize>,
    #[serde(default)]
    pub role: String,
}

fn default_quantity() -> f64 {
    1.0
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl ResourcePlacement {
    pub fn new(kind: ResourceKind, resource_id: impl Into<String>) -> Self {
        Self {
            kind,
            resource_id: resource_id.into(),
            subtype: None,
            quantity: 1.0,
            placement: Placement::Auto,
            yaw: 0.0,
            scale: [1.0, 1.0, 1.0],
            parallel_line_index: None,
            role: String::new(),
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn at(mut self, x: f64, z: f64) -> Self {
        self.placement = Placement::Explicit { x, z };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    #[serde(default)]
    pub cycle_time_sec: f64,
    /// World (x, z); the layout plane is y = 0.
    #[serde(default)]
    pub position: [f64; 2],
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub successors: Vec<ProcessId>,
    #[serde(default)]
    pub parallel_index: Option<usize>,
    #[serde(default)]
    pub resources: Vec<ResourcePlacement>,
}

impl Process {
    pub fn position_vec(&self) -> DVec2 {
        DVec2::from(self.position)
    }

    pub fn to_world(&self, local: DVec2) -> DVec2 {
        frame::to_world(self.position_vec(), self.yaw, local)
    }

    pub fn to_local(&self, world: DVec2) -> DVec2 {
        frame::to_local(self.position_vec(), self.yaw, world)
    }

    pub fn resource(&self, kind: ResourceKind, resource_id: &str) -> Option<&ResourcePlacement> {
        self.resources
            .iter()
            .find(|resource| resource.kind == kind && resource.resource_id == resource_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessDefinition {
    pub name: String,
    pub cycle_time_sec: f64,
    pub position: [f64; 2],
    pub yaw: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    MissingProcess(ProcessId),
    MissingResource {
        process: ProcessId,
        kind: ResourceKind,
        resource_id: String,
    },
    DuplicateResource {
        process: ProcessId,
        kind: ResourceKind,
        resource_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    processes: BTreeMap<ProcessId, Process>,
    next_process_id: u64,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            processes: BTreeMap::new(),
            next_process_id: 1,
        }
    }
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.get(&id)
    }

    pub fn add_process(&mut self, def: ProcessDefinition) -> ProcessId {
        let id = self.alloc_process_id();
        self.processes.insert(
            id,
            Process {
                id,
                name: def.name,
                cycle_time_sec: def.cycle_time_sec,
                position: def.position,
                yaw: def.yaw,
                successors: Vec::new(),
                parallel_index: None,
                resources: Vec::new(),
            },
        );
        id
    }

    pub fn remove_process(&mut self, id: ProcessId) -> Result<(), LineError> {
        if self.processes.remove(&id).is_none() {
            return Err(LineError::MissingProcess(id));
        }
        for process in self.processes.values_mut() {
            process.successors.retain(|successor| *successor != id);
        }
        Ok(())
    }

    pub fn connect(&mut self, from: ProcessId, to: ProcessId) -> Result<(), LineError> {
        if !self.processes.contains_key(&to) {
            return Err(LineError::MissingProcess(to));
        }
        let process = self
            .processes
            .get_mut(&from)
            .ok_or(LineError::MissingProcess(from))?;
        if !process.successors.contains(&to) {
            process.successors.push(to);
        }
        Ok(())
    }

    pub fn add_resource(
        &mut self,
        id: ProcessId,
        resource: ResourcePlacement,
    ) -> Result<(), LineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(LineError::MissingProcess(id))?;
        if process
            .resource(resource.kind, &resource.resource_id)
            .is_some()
        {
            return Err(LineError::DuplicateResource {
                process: id,
                kind: resource.kind,
                resource_id: resource.resource_id,
            });
        }
        process.resources.push(resource);
        Ok(())
    }

    pub fn remove_resource(
        &mut self,
        id: ProcessId,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<(), LineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(LineError::MissingProcess(id))?;
        let before = process.resources.len();
        process
            .resources
            .retain(|resource| !(resource.kind == kind && resource.resource_id == resource_id));
        if process.resources.len() == before {
            return Err(LineError::MissingResource {
                process: id,
                kind,
                resource_id: resource_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn resource(
        &self,
        id: ProcessId,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Option<&ResourcePlacement> {
        self.processes.get(&id)?.resource(kind, resource_id)
    }

    pub fn update_process_pose(
        &mut self,
        id: ProcessId,
        position: Option<[f64; 2]>,
        yaw: Option<f64>,
    ) -> Result<(), LineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(LineError::MissingProcess(id))?;
        if let Some(position) = position {
            process.position = position;
        }
        if let Some(yaw) = yaw {
            process.yaw = yaw;
        }
        Ok(())
    }

    pub fn update_resource_pose(
        &mut self,
        process: ProcessId,
        kind: ResourceKind,
        resource_id: &str,
        placement: Option<Placement>,
        yaw: Option<f64>,
        scale: Option<[f64; 3]>,
    ) -> Result<(), LineError> {
        let owner = self
            .processes
            .get_mut(&process)
            .ok_or(LineError::MissingProcess(process))?;
        let resource = owner
            .resources
            .iter_mut()
            .find(|resource| resource.kind == kind && resource.resource_id == resource_id)
            .ok_or_else(|| LineError::MissingResource {
                process,
                kind,
                resource_id: resource_id.to_string(),
            })?;
        if let Some(placement) = placement {
            resource.placement = placement;
        }
        if let Some(yaw) = yaw {
            resource.yaw = yaw;
        }
        if let Some(scale) = scale {
            resource.scale = scale;
        }
        Ok(())
    }

    pub fn apply(&mut self, update: PoseUpdate) -> Result<(), LineError> {
        match update {
            PoseUpdate::Process { id, position, yaw } => {
                self.update_process_pose(id, position, yaw)
            }
            PoseUpdate::Resource {
                process,
                kind,
                resource_id,
                placement,
                yaw,
                scale,
            } => self.update_resource_pose(process, kind, &resource_id, placement, yaw, scale),
        }
    }

    /// Re-centers a process on its footprint: shifts the world position by
    /// the footprint-center offset (rotated into world frame) and subtracts
    /// the offset from every resource, so the local bounding center returns
    /// to the origin. Auto slots are materialized first so the shift applies
    /// uniformly. Returns `false` when the process was already centered.
    pub fn normalize_center(
        &mut self,
        id: ProcessId,
        catalog: &SizeCatalog,
    ) -> Result<bool, LineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(LineError::MissingProcess(id))?;
        let fp = footprint::process_footprint(process, catalog);
        let center = DVec2::new(fp.center_x, fp.center_z);
        if center.x.abs() < CENTER_EPSILON && center.y.abs() < CENTER_EPSILON {
            return Ok(false);
        }
        let total = process.resources.len();
        for (index, resource) in process.resources.iter_mut().enumerate() {
            if resource.placement == Placement::Auto {
                let slot = layout::auto_slot(index, total);
                resource.placement = Placement::Explicit {
                    x: slot.x,
                    z: slot.y,
                };
            }
        }
        let shifted = frame::to_world(process.position_vec(), process.yaw, center);
        process.position = [shifted.x, shifted.y];
        for resource in &mut process.resources {
            if let Placement::Explicit { x, z } = resource.placement {
                resource.placement = Placement::Explicit {
                    x: x - center.x,
                    z: z - center.y,
                };
            }
        }
        Ok(true)
    }

    /// Expands a process into `count` parallel sibling lines, offset 5 m
    /// apart in world z. Sibling `i` keeps the resources whose
    /// `parallel_line_index` is unset or equal to `i`. Returns every sibling
    /// id, the original process (now line 0) first.
    pub fn expand_parallel(
        &mut self,
        id: ProcessId,
        count: usize,
    ) -> Result<Vec<ProcessId>, LineError> {
        let template = self
            .processes
            .get(&id)
            .ok_or(LineError::MissingProcess(id))?
            .clone();
        if count <= 1 {
            return Ok(vec![id]);
        }
        let mut siblings = vec![id];
        for index in 1..count {
            let sibling_id = self.alloc_process_id();
            let mut sibling = template.clone();
            sibling.id = sibling_id;
            sibling.position[1] += index as f64 * PARALLEL_LINE_SPACING;
            sibling.parallel_index = Some(index);
            sibling.resources = parallel_line_resources(&template.resources, index);
            self.processes.insert(sibling_id, sibling);
            siblings.push(sibling_id);
        }
        if let Some(first) = self.processes.get_mut(&id) {
            first.parallel_index = Some(0);
            first.resources = parallel_line_resources(&template.resources, 0);
        }
        Ok(siblings)
    }

    fn alloc_process_id(&mut self) -> ProcessId {
        let id = ProcessId(self.next_process_id);
        self.next_process_id += 1;
        id
    }
}

fn parallel_line_resources(
    resources: &[ResourcePlacement],
    index: usize,
) -> Vec<ResourcePlacement> {
    resources
        .iter()
        .filter(|resource| {
            resource.parallel_line_index.is_none() || resource.parallel_line_index == Some(index)
        })
        .map(|resource| {
            let mut resource = resource.clone();
            resource.parallel_line_index = None;
            resource
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_line() -> (Line, ProcessId) {
        let mut line = Line::new();
        let id = line.add_process(ProcessDefinition {
            name: "welding".to_string(),
            cycle_time_sec: 180.0,
            position: [0.0, 0.0],
            yaw: 0.0,
        });
        (line, id)
    }

    #[test]
    fn add_and_remove_resources() {
        let (mut line, id) = demo_line();
        let robot = ResourcePlacement::new(ResourceKind::Equipment, "EQ-ROBOT-01")
            .with_subtype("robot");
        line.add_resource(id, robot.clone()).unwrap();
        assert!(line
            .resource(id, ResourceKind::Equipment, "EQ-ROBOT-01")
            .is_some());
        assert_eq!(
            line.add_resource(id, robot),
            Err(LineError::DuplicateResource {
                process: id,
                kind: ResourceKind::Equipment,
                resource_id: "EQ-ROBOT-01".to_string(),
            })
        );
        line.remove_resource(id, ResourceKind::Equipment, "EQ-ROBOT-01")
            .unwrap();
        assert!(line
            .resource(id, ResourceKind::Equipment, "EQ-ROBOT-01")
            .is_none());
    }

    #[test]
    fn removing_a_process_unlinks_successors() {
        let (mut line, first) = demo_line();
        let second = line.add_process(ProcessDefinition {
            name: "painting".to_string(),
            position: [5.0, 0.0],
            ..ProcessDefinition::default()
        });
        line.connect(first, second).unwrap();
        line.remove_process(second).unwrap();
        assert!(line.process(first).unwrap().successors.is_empty());
    }

    #[test]
    fn pose_updates_write_through() {
        let (mut line, id) = demo_line();
        line.update_process_pose(id, Some([3.0, -2.0]), None).unwrap();
        line.update_process_pose(id, None, Some(0.5)).unwrap();
        let process = line.process(id).unwrap();
        assert_eq!(process.position, [3.0, -2.0]);
        assert_eq!(process.yaw, 0.5);

        let missing = ProcessId(999);
        assert_eq!(
            line.update_process_pose(missing, None, Some(1.0)),
            Err(LineError::MissingProcess(missing))
        );
    }

    #[test]
    fn legacy_origin_becomes_auto() {
        assert_eq!(Placement::from_legacy(0.0, 0.0), Placement::Auto);
        assert_eq!(
            Placement::from_legacy(1.0, 0.0),
            Placement::Explicit { x: 1.0, z: 0.0 }
        );
    }

    #[test]
    fn expand_parallel_splits_lines_by_index() {
        let (mut line, id) = demo_line();
        let mut shared = ResourcePlacement::new(ResourceKind::Material, "M-STEEL-001");
        shared.placement = Placement::Explicit { x: -1.2, z: 0.0 };
        line.add_resource(id, shared).unwrap();
        let mut first_only = ResourcePlacement::new(ResourceKind::Worker, "W001");
        first_only.parallel_line_index = Some(0);
        line.add_resource(id, first_only).unwrap();
        let mut second_only = ResourcePlacement::new(ResourceKind::Worker, "W002");
        second_only.parallel_line_index = Some(1);
        line.add_resource(id, second_only).unwrap();

        let siblings = line.expand_parallel(id, 2).unwrap();
        assert_eq!(siblings.len(), 2);
        assert_eq!(siblings[0], id);

        let first = line.process(siblings[0]).unwrap();
        assert_eq!(first.parallel_index, Some(0));
        assert_eq!(first.resources.len(), 2);
        assert!(first.resource(ResourceKind::Worker, "W001").is_some());

        let second = line.process(siblings[1]).unwrap();
        assert_eq!(second.parallel_index, Some(1));
        assert_eq!(second.position, [0.0, PARALLEL_LINE_SPACING]);
        assert!(second.resource(ResourceKind::Worker, "W002").is_some());
        assert!(second.resource(ResourceKind::Worker, "W001").is_none());
        assert!(second
            .resources
            .iter()
            .all(|resource| resource.parallel_line_index.is_none()));
    }

    #[test]
    fn normalize_recenters_the_footprint() {
        let catalog = SizeCatalog::new();
        let (mut line, id) = demo_line();
        line.update_process_pose(id, Some([2.0, 1.0]), None).unwrap();
        line.add_resource(
            id,
            ResourcePlacement::new(ResourceKind::Equipment, "EQ-ROBOT-01")
                .with_subtype("robot")
                .at(1.0, 0.5),
        )
        .unwrap();
        assert!(line.normalize_center(id, &catalog).unwrap());
        let process = line.process(id).unwrap();
        assert_eq!(process.position, [3.0, 1.5]);
        let fp = footprint::process_footprint(process, &catalog);
        assert!(fp.center_x.abs() < 1.0e-9);
        assert!(fp.center_z.abs() < 1.0e-9);
        // a second pass finds nothing to do
        assert!(!line.normalize_center(id, &catalog).unwrap());
    }

    #[test]
    fn normalize_preserves_world_positions() {
        let catalog = SizeCatalog::new();
        let (mut line, id) = demo_line();
        line.update_process_pose(id, Some([4.0, -2.0]), Some(0.7))
            .unwrap();
        line.add_resource(
            id,
            ResourcePlacement::new(ResourceKind::Worker, "W001").at(1.5, 0.25),
        )
        .unwrap();
        line.add_resource(id, ResourcePlacement::new(ResourceKind::Material, "M001"))
            .unwrap();

        let before: Vec<DVec2> = {
            let process = line.process(id).unwrap();
            process
                .resources
                .iter()
                .enumerate()
                .map(|(index, resource)| {
                    process.to_world(footprint::resolved_local(resource, index, 2))
                })
                .collect()
        };
        assert!(line.normalize_center(id, &catalog).unwrap());
        let process = line.process(id).unwrap();
        for (index, resource) in process.resources.iter().enumerate() {
            assert!(
                matches!(resource.placement, Placement::Explicit { .. }),
                "auto slots should be materialized"
            );
            let after = process.to_world(footprint::resolved_local(resource, index, 2));
            assert!(
                (after - before[index]).abs().max_element() < 1.0e-9,
                "resource {index} moved in world frame: {:?} -> {after:?}",
                before[index]
            );
        }
    }

    #[test]
    fn line_survives_a_json_round_trip() {
        let (mut line, id) = demo_line();
        line.add_resource(
            id,
            ResourcePlacement::new(ResourceKind::Equipment, "EQ-ROBOT-01")
                .with_subtype("robot")
                .at(1.0, 0.5),
        )
        .unwrap();
        let json = serde_json::to_string(&line).unwrap();
        let back: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(back.process(id), line.process(id));
    }
}
