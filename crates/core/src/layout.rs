use glam::DVec2;

/// Nominal box resources without an explicit position are packed into.
pub const LAYOUT_BOX_WIDTH: f64 = 2.0;
pub const LAYOUT_BOX_DEPTH: f64 = 1.5;

pub fn grid_dims(total: usize) -> (usize, usize) {
    let total = total.max(1);
    let cols = (total as f64).sqrt().ceil() as usize;
    let rows = total.div_ceil(cols);
    (cols, rows)
}

/// Deterministic grid slot for the `index`-th of `total` unpositioned
/// resources. Order-dependent: reordering the resource list reassigns slots.
pub fn auto_slot(index: usize, total: usize) -> DVec2 {
    let (cols, rows) = grid_dims(total);
    let col = index % cols;
    let row = index / cols;
    let x_spacing = LAYOUT_BOX_WIDTH / (cols + 1) as f64;
    let z_spacing = LAYOUT_BOX_DEPTH / (rows + 1) as f64;
    DVec2::new(
        (col + 1) as f64 * x_spacing - LAYOUT_BOX_WIDTH * 0.5,
        (row + 1) as f64 * z_spacing - LAYOUT_BOX_DEPTH * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_resources_share_the_middle_row() {
        let first = auto_slot(0, 2);
        let second = auto_slot(1, 2);
        assert!((first.x - (2.0 / 3.0 - 1.0)).abs() < 1.0e-12);
        assert!((second.x - (2.0 * (2.0 / 3.0) - 1.0)).abs() < 1.0e-12);
        assert!(first.y.abs() < 1.0e-12);
        assert!(second.y.abs() < 1.0e-12);
    }

    #[test]
    fn single_resource_sits_at_the_origin() {
        let slot = auto_slot(0, 1);
        assert!(slot.x.abs() < 1.0e-12);
        assert!(slot.y.abs() < 1.0e-12);
    }

    #[test]
    fn slots_stay_inside_the_box_and_never_collide() {
        for total in 1..=50 {
            let mut slots: Vec<DVec2> = Vec::with_capacity(total);
            for index in 0..total {
                let slot = auto_slot(index, total);
                assert!(
                    slot.x.abs() < LAYOUT_BOX_WIDTH * 0.5 && slot.y.abs() < LAYOUT_BOX_DEPTH * 0.5,
                    "slot {index}/{total} escaped the box: {slot:?}"
                );
                assert!(
                    slots.iter().all(|other| (*other - slot).length() > 1.0e-9),
                    "slot {index}/{total} collided"
                );
                slots.push(slot);
            }
        }
    }

    #[test]
    fn slots_are_deterministic() {
        for index in 0..7 {
            assert_eq!(auto_slot(index, 7), auto_slot(index, 7));
        }
    }
}
