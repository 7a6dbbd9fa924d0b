mod catalog;
mod flow;
mod footprint;
mod frame;
mod layout;
mod line;
mod scene;
mod session;

pub use catalog::{ResourceSize, SizeCatalog, FALLBACK_SIZE};
pub use flow::{flow_arrow, FlowArrow};
pub use footprint::{
    process_footprint, resolved_local, resources_footprint, Footprint, EMPTY_FOOTPRINT,
};
pub use frame::{rotate, to_local, to_world, world_yaw};
pub use layout::{auto_slot, grid_dims, LAYOUT_BOX_DEPTH, LAYOUT_BOX_WIDTH};
pub use line::{
    Line, LineError, Placement, Process, ProcessDefinition, ProcessId, ResourceKind,
    ResourcePlacement, PARALLEL_LINE_SPACING,
};
pub use scene::scene_snapshot;
pub use session::{
    LivePose, PoseUpdate, SessionError, TransformAxis, TransformController, TransformMode,
    TransformSession, MIN_SCALE,
};
