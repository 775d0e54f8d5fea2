use super::{NeighborSearch, Positions, radius_squared};

/// Exhaustive O(n) scan per query.
///
/// Holds no state, so it is always consistent with the positions it is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForce;

impl NeighborSearch for BruteForce {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn for_each_within(
        &self,
        positions: Positions<'_>,
        center: usize,
        radius: f64,
        f: &mut dyn FnMut(usize),
    ) {
        let Some(r2) = radius_squared(radius) else {
            return;
        };
        let c = positions.get(center);
        for j in 0..positions.len() {
            if j != center && c.distance_squared(&positions.get(j)) <= r2 {
                f(j);
            }
        }
    }
}
