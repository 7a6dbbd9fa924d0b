use glam::DVec2;

/// Rotates a local-frame offset into the world frame. The vector's `y`
/// component holds the planar z coordinate.
pub fn rotate(yaw: f64, offset: DVec2) -> DVec2 {
    let (sin, cos) = yaw.sin_cos();
    DVec2::new(
        offset.x * cos + offset.y * sin,
        -offset.x * sin + offset.y * cos,
    )
}

pub fn to_world(position: DVec2, yaw: f64, local: DVec2) -> DVec2 {
    position + rotate(yaw, local)
}

pub fn to_local(position: DVec2, yaw: f64, world: DVec2) -> DVec2 {
    let (sin, cos) = yaw.sin_cos();
    let offset = world - position;
    DVec2::new(
        offset.x * cos - offset.y * sin,
        offset.x * sin + offset.y * cos,
    )
}

pub fn world_yaw(process_yaw: f64, own_yaw: f64) -> f64 {
    process_yaw + own_yaw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1.0e-9;

    #[test]
    fn round_trip_recovers_local_point() {
        let positions = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, -3.0),
            DVec2::new(-4.5, 7.25),
        ];
        let yaws = [0.0, 0.3, FRAC_PI_2, 2.1, -1.2];
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.5),
            DVec2::new(-2.0, 3.3),
        ];
        for position in positions {
            for yaw in yaws {
                for point in points {
                    let back = to_local(position, yaw, to_world(position, yaw, point));
                    assert!(
                        (back - point).abs().max_element() < EPS,
                        "round trip drifted at pos {position:?} yaw {yaw}: {point:?} -> {back:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn quarter_turn_follows_the_formula() {
        // cos 90 = 0, sin 90 = 1: x = 10 + 0 + 0, z = 0 - 1 + 0.
        let world = to_world(DVec2::new(10.0, 0.0), FRAC_PI_2, DVec2::new(1.0, 0.0));
        assert!((world.x - 10.0).abs() < EPS);
        assert!((world.y - -1.0).abs() < EPS);
    }

    #[test]
    fn zero_yaw_is_translation() {
        let world = to_world(DVec2::new(2.0, 3.0), 0.0, DVec2::new(1.0, -1.0));
        assert_eq!(world, DVec2::new(3.0, 2.0));
    }

    #[test]
    fn yaws_compose_additively() {
        assert_eq!(world_yaw(0.5, 0.25), 0.75);
    }
}
