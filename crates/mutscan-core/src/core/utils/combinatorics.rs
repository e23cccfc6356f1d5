/// Binomial coefficient C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: the running product is C(n, i + 1).
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}

/// Size of the space of variants with `num_subs` substitutions drawn from
/// `num_positions` positions and an alphabet of `alphabet_size` residues, assuming
/// every reference residue belongs to the alphabet.
pub fn max_possible_variants(num_positions: usize, num_subs: usize, alphabet_size: usize) -> u64 {
    let choices = alphabet_size.saturating_sub(1) as u64;
    let mut total = binomial(num_positions, num_subs);
    for _ in 0..num_subs {
        total = total.saturating_mul(choices);
    }
    total
}
