use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::line::ResourceKind;

/// Nominal unscaled bounding box of a resource, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSize {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl ResourceSize {
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

/// Box used when neither an override nor a built-in entry matches.
pub const FALLBACK_SIZE: ResourceSize = ResourceSize::new(0.4, 0.4, 0.4);

/// Total lookup from (kind, subtype) to a nominal size. Unknown subtypes fall
/// back to per-kind defaults so one malformed resource never fails a layout.
#[derive(Debug, Clone, Default)]
pub struct SizeCatalog {
    overrides: BTreeMap<(ResourceKind, String), ResourceSize>,
}

impl SizeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: ResourceKind, subtype: impl Into<String>, size: ResourceSize) {
        self.overrides.insert((kind, subtype.into()), size);
    }

    pub fn size(&self, kind: ResourceKind, subtype: Option<&str>) -> ResourceSize {
        if let Some(subtype) = subtype {
            if let Some(size) = self.overrides.get(&(kind, subtype.to_string())) {
                return *size;
            }
        }
        builtin_size(kind, subtype)
    }
}

fn builtin_size(kind: ResourceKind, subtype: Option<&str>) -> ResourceSize {
    match kind {
        ResourceKind::Equipment => match subtype {
            Some("robot") => ResourceSize::new(0.6, 1.8, 0.6),
            Some("machine") => ResourceSize::new(0.8, 1.2, 0.8),
            Some("manual_station") => ResourceSize::new(0.6, 1.0, 0.6),
            _ => FALLBACK_SIZE,
        },
        ResourceKind::Worker => ResourceSize::new(0.5, 1.6, 0.5),
        ResourceKind::Material => ResourceSize::new(0.4, 0.25, 0.4),
    }
}
