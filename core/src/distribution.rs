use crate::collision::COLLISION_BUFFER_DEFAULT;
use crate::geometry::Size;

pub const SPRITE_FOOTPRINT_DEFAULT: f64 = 80.0;

/// Square area one sprite occupies when estimating how many fit in a region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub sprite_size: f64,
    pub buffer: f64,
}

impl Footprint {
    pub fn effective_size(&self) -> f64 {
        (self.sprite_size + self.buffer).max(1.0)
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            sprite_size: SPRITE_FOOTPRINT_DEFAULT,
            buffer: COLLISION_BUFFER_DEFAULT,
        }
    }
}

pub fn region_capacity(region: Size, footprint: &Footprint) -> u64 {
    let effective = footprint.effective_size();
    let cols = (region.width / effective).floor().max(1.0) as u64;
    let rows = (region.height / effective).floor().max(1.0) as u64;
    cols * rows
}

/// Splits `total` sprites across regions in proportion to each region's
/// packing capacity. The result has one entry per region and always sums to
/// `total`; an empty region list yields an empty plan.
pub fn plan_distribution(regions: &[Size], total: usize, footprint: &Footprint) -> Vec<usize> {
    if regions.is_empty() {
        return Vec::new();
    }
    let capacities: Vec<u64> = regions
        .iter()
        .map(|region| region_capacity(*region, footprint))
        .collect();
    let total_capacity: u64 = capacities.iter().sum();
    let total_u = total as u128;
    let mut plan: Vec<usize> = capacities
        .iter()
        .map(|capacity| ((total_u * *capacity as u128) / total_capacity as u128) as usize)
        .collect();

    let assigned: usize = plan.iter().sum();
    let remainder = total - assigned;
    if remainder > 0 {
        let mut by_capacity: Vec<usize> = (0..regions.len()).collect();
        by_capacity.sort_by(|a, b| capacities[*b].cmp(&capacities[*a]));
        for slot in 0..remainder {
            let region = by_capacity[slot % by_capacity.len()];
            plan[region] += 1;
        }
    }
    debug_assert_eq!(plan.iter().sum::<usize>(), total);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_never_drops_below_one() {
        let footprint = Footprint::default();
        assert_eq!(region_capacity(Size::new(10.0, 10.0), &footprint), 1);
        assert_eq!(region_capacity(Size::new(170.0, 255.0), &footprint), 6);
    }

    #[test]
    fn remainder_goes_to_largest_first() {
        let footprint = Footprint::default();
        let regions = [
            Size::new(85.0, 85.0),
            Size::new(255.0, 85.0),
            Size::new(170.0, 85.0),
        ];
        // Capacities 1, 3, 2 out of 6; floors give 0, 1, 1 for total 3.
        let plan = plan_distribution(&regions, 3, &footprint);
        assert_eq!(plan, vec![0, 2, 1]);
    }

    #[test]
    fn remainder_cycles_when_larger_than_region_count() {
        let footprint = Footprint::default();
        let regions = [Size::new(85.0, 85.0), Size::new(85.0, 85.0)];
        let plan = plan_distribution(&regions, 5, &footprint);
        assert_eq!(plan.iter().sum::<usize>(), 5);
        assert_eq!(plan, vec![3, 2]);
    }
}
