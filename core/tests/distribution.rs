use machigai_core::{plan_distribution, region_capacity, Footprint, RandomSource, SeededRng, Size};

#[test]
fn one_to_three_capacity_split_is_exact() {
    let footprint = Footprint::default();
    let small = Size::new(425.0, 170.0);
    let large = Size::new(425.0, 510.0);
    assert_eq!(region_capacity(small, &footprint), 10);
    assert_eq!(region_capacity(large, &footprint), 30);
    assert_eq!(plan_distribution(&[small, large], 40, &footprint), vec![10, 30]);
}

#[test]
fn totals_are_conserved_for_arbitrary_regions() {
    let footprint = Footprint::default();
    let mut rng = SeededRng::new(2024);
    for _ in 0..500 {
        let region_count = rng.next_int(1, 8) as usize;
        let regions: Vec<Size> = (0..region_count)
            .map(|_| Size::new(rng.next_int(0, 1200) as f64, rng.next_int(0, 900) as f64))
            .collect();
        let total = rng.next_int(0, 250) as usize;
        let plan = plan_distribution(&regions, total, &footprint);
        assert_eq!(plan.len(), regions.len());
        assert_eq!(plan.iter().sum::<usize>(), total);
    }
}

#[test]
fn zero_sprites_gives_all_zero_plan() {
    let footprint = Footprint::default();
    let plan = plan_distribution(&[Size::new(300.0, 300.0), Size::new(10.0, 10.0)], 0, &footprint);
    assert_eq!(plan, vec![0, 0]);
}

#[test]
fn no_regions_gives_empty_plan() {
    assert!(plan_distribution(&[], 12, &Footprint::default()).is_empty());
}
