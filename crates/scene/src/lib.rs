use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneResourceKind {
    Equipment,
    Worker,
    Material,
}

#[derive(Debug, Clone)]
pub struct SceneResource {
    pub process: u64,
    pub resource_id: String,
    pub kind: SceneResourceKind,
    pub position: [f64; 3],
    pub yaw: f64,
    pub scale: [f64; 3],
    pub size: [f64; 3],
}

#[derive(Debug, Clone)]
pub struct ScenePlate {
    pub process: u64,
    pub name: String,
    pub center: [f64; 3],
    pub width: f64,
    pub depth: f64,
    pub yaw: f64,
}

impl ScenePlate {
    pub fn corners(&self) -> [[f64; 3]; 4] {
        let (sin, cos) = self.yaw.sin_cos();
        let half = DVec2::new(self.width * 0.5, self.depth * 0.5);
        let local = [
            DVec2::new(-half.x, -half.y),
            DVec2::new(half.x, -half.y),
            DVec2::new(half.x, half.y),
            DVec2::new(-half.x, half.y),
        ];
        let mut out = [[0.0; 3]; 4];
        for (slot, corner) in out.iter_mut().zip(local) {
            let x = corner.x * cos + corner.y * sin;
            let z = -corner.x * sin + corner.y * cos;
            *slot = [self.center[0] + x, self.center[1], self.center[2] + z];
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SceneFlow {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub direction: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub resources: Vec<SceneResource>,
    pub plates: Vec<ScenePlate>,
    pub flows: Vec<SceneFlow>,
}

impl SceneSnapshot {
    pub fn plate_for(&self, process: u64) -> Option<&ScenePlate> {
        self.plates.iter().find(|plate| plate.process == process)
    }

    pub fn resources_of(&self, process: u64) -> Vec<&SceneResource> {
        self.resources
            .iter()
            .filter(|resource| resource.process == process)
            .collect()
    }
}
