use machigai_core::{RandomSource, SeededRng};

#[test]
fn same_seed_same_sequence() {
    let mut a = SeededRng::new(42);
    let mut b = SeededRng::new(42);
    for _ in 0..3 {
        assert_eq!(a.next().to_bits(), b.next().to_bits());
    }
    for _ in 0..100 {
        assert_eq!(a.next_int(-5, 17), b.next_int(-5, 17));
    }
    let mut left: Vec<u32> = (0..50).collect();
    let mut right = left.clone();
    a.shuffle(&mut left);
    b.shuffle(&mut right);
    assert_eq!(left, right);
    assert_eq!(a.state(), b.state());
}

#[test]
fn seed_forty_two_first_values_are_fixed() {
    let mut rng = SeededRng::new(42);
    let mut state: u64 = 42;
    for _ in 0..3 {
        state = (state * 1_664_525 + 1_013_904_223) % (1 << 32);
        assert_eq!(rng.next(), state as f64 / 4_294_967_296.0);
    }
}

#[test]
fn different_seeds_diverge() {
    let mut a = SeededRng::new(1);
    let mut b = SeededRng::new(2);
    let seq_a: Vec<u64> = (0..8).map(|_| a.next().to_bits()).collect();
    let seq_b: Vec<u64> = (0..8).map(|_| b.next().to_bits()).collect();
    assert_ne!(seq_a, seq_b);
}
