use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::footprint;
use crate::frame;
use crate::line::{Line, Placement, ProcessId, ResourceKind};

/// Smallest scale component a gesture can produce.
pub const MIN_SCALE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformTarget {
    Process(ProcessId),
    Resource {
        process: ProcessId,
        kind: ResourceKind,
        resource_id: String,
    },
}

/// Raw world-frame pose delivered by the input layer on every gesture tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivePose {
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl LivePose {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    MissingProcess(ProcessId),
    MissingResource {
        process: ProcessId,
        kind: ResourceKind,
        resource_id: String,
    },
    /// Processes only translate and rotate.
    ProcessScale(ProcessId),
    GestureActive,
}

/// Pose fields a committed gesture writes back to the data store. `None`
/// fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoseUpdate {
    Process {
        id: ProcessId,
        position: Option<[f64; 2]>,
        yaw: Option<f64>,
    },
    Resource {
        process: ProcessId,
        kind: ResourceKind,
        resource_id: String,
        placement: Option<Placement>,
        yaw: Option<f64>,
        scale: Option<[f64; 3]>,
    },
}

/// One in-progress edit gesture. Created on pointer-down, fed raw poses every
/// tick, and consumed exactly once by `commit` or dropped on cancel.
#[derive(Debug, Clone)]
pub struct TransformSession {
    target: TransformTarget,
    mode: TransformMode,
    axis: Option<TransformAxis>,
    start: LivePose,
    pose: LivePose,
    plane_y: f64,
}

impl TransformSession {
    pub fn begin(
        line: &Line,
        target: TransformTarget,
        mode: TransformMode,
    ) -> Result<Self, SessionError> {
        let start = match &target {
            TransformTarget::Process(id) => {
                if mode == TransformMode::Scale {
                    return Err(SessionError::ProcessScale(*id));
                }
                let process = line
                    .process(*id)
                    .ok_or(SessionError::MissingProcess(*id))?;
                LivePose {
                    position: DVec3::new(process.position[0], 0.0, process.position[1]),
                    rotation: DVec3::new(0.0, process.yaw, 0.0),
                    scale: DVec3::ONE,
                }
            }
            TransformTarget::Resource {
                process,
                kind,
                resource_id,
            } => {
                let owner = line
                    .process(*process)
                    .ok_or(SessionError::MissingProcess(*process))?;
                let (index, resource) = owner
                    .resources
                    .iter()
                    .enumerate()
                    .find(|(_, resource)| {
                        resource.kind == *kind && resource.resource_id == *resource_id
                    })
                    .ok_or_else(|| SessionError::MissingResource {
                        process: *process,
                        kind: *kind,
                        resource_id: resource_id.clone(),
                    })?;
                let local = footprint::resolved_local(resource, index, owner.resources.len());
                let world = owner.to_world(local);
                LivePose {
                    position: DVec3::new(world.x, 0.0, world.y),
                    rotation: DVec3::new(0.0, frame::world_yaw(owner.yaw, resource.yaw), 0.0),
                    scale: DVec3::from(resource.scale),
                }
            }
        };
        Ok(Self {
            plane_y: start.position.y,
            target,
            mode,
            axis: None,
            start,
            pose: start,
        })
    }

    pub fn target(&self) -> &TransformTarget {
        &self.target
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn axis(&self) -> Option<TransformAxis> {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Option<TransformAxis>) {
        self.axis = axis;
    }

    pub fn live_pose(&self) -> LivePose {
        self.pose
    }

    /// Applies the per-mode constraints to a raw input pose. Idempotent; a
    /// non-finite pose is ignored and the last valid pose kept.
    pub fn update(&mut self, raw: LivePose) {
        if !raw.is_finite() {
            warn!("ignoring non-finite gesture pose for {:?}", self.target);
            return;
        }
        self.pose = match self.mode {
            TransformMode::Translate => LivePose {
                position: DVec3::new(raw.position.x, self.plane_y, raw.position.z),
                rotation: self.start.rotation,
                scale: self.start.scale,
            },
            TransformMode::Rotate => LivePose {
                position: self.start.position,
                rotation: DVec3::new(0.0, raw.rotation.y, 0.0),
                scale: self.start.scale,
            },
            TransformMode::Scale => LivePose {
                position: self.start.position,
                rotation: self.start.rotation,
                scale: raw.scale.max(DVec3::splat(MIN_SCALE)),
            },
        };
    }

    /// Converts the final live world-frame pose into the persisted
    /// representation. Returns `None` when the target vanished mid-gesture;
    /// nothing is written either way.
    pub fn commit(self, line: &Line) -> Option<PoseUpdate> {
        match self.target {
            TransformTarget::Process(id) => {
                if line.process(id).is_none() {
                    debug!("dropping commit: process {id:?} no longer exists");
                    return None;
                }
                match self.mode {
                    TransformMode::Translate => Some(PoseUpdate::Process {
                        id,
                        position: Some([self.pose.position.x, self.pose.position.z]),
                        yaw: None,
                    }),
                    TransformMode::Rotate => Some(PoseUpdate::Process {
                        id,
                        position: None,
                        yaw: Some(self.pose.rotation.y),
                    }),
                    // begin() refuses process scale sessions
                    TransformMode::Scale => None,
                }
            }
            TransformTarget::Resource {
                process,
                kind,
                resource_id,
            } => {
                let owner = match line.process(process) {
                    Some(owner) => owner,
                    None => {
                        debug!("dropping commit: process {process:?} no longer exists");
                        return None;
                    }
                };
                if owner.resource(kind, &resource_id).is_none() {
                    debug!("dropping commit: resource {resource_id} no longer exists");
                    return None;
                }
                match self.mode {
                    TransformMode::Translate => {
                        let world = DVec2::new(self.pose.position.x, self.pose.position.z);
                        let local = owner.to_local(world);
                        Some(PoseUpdate::Resource {
                            process,
                            kind,
                            resource_id,
                            placement: Some(Placement::Explicit {
                                x: local.x,
                                z: local.y,
                            }),
                            yaw: None,
                            scale: None,
                        })
                    }
                    TransformMode::Rotate => Some(PoseUpdate::Resource {
                        process,
                        kind,
                        resource_id,
                        placement: None,
                        yaw: Some(self.pose.rotation.y - owner.yaw),
                        scale: None,
                    }),
                    TransformMode::Scale => Some(PoseUpdate::Resource {
                        process,
                        kind,
                        resource_id,
                        placement: None,
                        yaw: None,
                        scale: Some(self.pose.scale.to_array()),
                    }),
                }
            }
        }
    }
}

/// Owns the single allowed in-progress gesture, replacing ad-hoc per-widget
/// drag state. A second `begin` while a gesture is live is rejected.
#[derive(Debug, Default)]
pub struct TransformController {
    session: Option<TransformSession>,
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&TransformSession> {
        self.session.as_ref()
    }

    pub fn begin(
        &mut self,
        line: &Line,
        target: TransformTarget,
        mode: TransformMode,
    ) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::GestureActive);
        }
        self.session = Some(TransformSession::begin(line, target, mode)?);
        Ok(())
    }

    pub fn set_axis(&mut self, axis: Option<TransformAxis>) {
        if let Some(session) = self.session.as_mut() {
            session.set_axis(axis);
        }
    }

    pub fn update(&mut self, raw: LivePose) {
        if let Some(session) = self.session.as_mut() {
            session.update(raw);
        }
    }

    pub fn commit(&mut self, line: &Line) -> Option<PoseUpdate> {
        self.session.take().and_then(|session| session.commit(line))
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }
}
