use super::error::EngineError;
use tracing::trace;

/// Splits `total` items as evenly as possible across buckets without exceeding any
/// bucket's capacity.
///
/// Water-filling: every round offers an equal share of the remainder to all buckets
/// that still have room. When the first such bucket (by index) cannot absorb the
/// share, it is filled to capacity and withdrawn, and the round is retried. Units
/// left over once the share drops to zero go one at a time, in index order, to
/// buckets below capacity, so lower indices absorb the remainder first.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] when `total` exceeds the combined capacity.
pub fn allocate(total: u64, capacities: &[u64]) -> Result<Vec<u64>, EngineError> {
    let capacity: u128 = capacities.iter().map(|&c| c as u128).sum();
    if total as u128 > capacity {
        return Err(EngineError::Configuration(format!(
            "cannot place {} items into buckets with a combined capacity of {}",
            total, capacity
        )));
    }

    let mut assigned = vec![0u64; capacities.len()];
    let mut remaining = total;
    let mut free: Vec<usize> = (0..capacities.len()).collect();

    while !free.is_empty() {
        let share = remaining / free.len() as u64;
        if share == 0 {
            break;
        }
        match free
            .iter()
            .position(|&i| assigned[i].saturating_add(share) > capacities[i])
        {
            None => {
                for &i in &free {
                    assigned[i] += share;
                }
                remaining -= share * free.len() as u64;
            }
            Some(slot) => {
                let i = free.remove(slot);
                remaining -= capacities[i] - assigned[i];
                assigned[i] = capacities[i];
                trace!(bucket = i, capacity = capacities[i], "bucket filled to capacity");
            }
        }
    }

    while remaining > 0 {
        for (i, slot) in assigned.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if *slot < capacities[i] {
                *slot += 1;
                remaining -= 1;
            }
        }
    }

    debug_assert!(assigned.iter().zip(capacities).all(|(a, c)| a <= c));
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_postconditions(total: u64, capacities: &[u64], assigned: &[u64]) {
        assert_eq!(assigned.len(), capacities.len());
        assert_eq!(assigned.iter().sum::<u64>(), total);
        for (a, c) in assigned.iter().zip(capacities) {
            assert!(a <= c, "{:?} exceeds {:?}", assigned, capacities);
        }
    }

    #[test]
    fn remainder_goes_to_lowest_indices_first() {
        assert_eq!(allocate(10, &[5, 5, 5]).unwrap(), vec![4, 3, 3]);
        assert_eq!(allocate(11, &[5, 5, 5]).unwrap(), vec![4, 4, 3]);
    }

    #[test]
    fn demand_above_capacity_is_a_configuration_error() {
        assert!(matches!(
            allocate(10, &[3, 3, 3]),
            Err(EngineError::Configuration(_))
        ));
        assert!(matches!(allocate(1, &[]), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn exact_capacity_fills_every_bucket() {
        assert_eq!(allocate(9, &[3, 3, 3]).unwrap(), vec![3, 3, 3]);
    }

    #[test]
    fn small_buckets_are_pinned_and_the_rest_share() {
        let assigned = allocate(100, &[1064, 555_940]).unwrap();
        assert_eq!(assigned, vec![50, 50]);

        let assigned = allocate(100, &[5, 555_940]).unwrap();
        assert_eq!(assigned, vec![5, 95]);

        let assigned = allocate(20, &[2, 100, 3]).unwrap();
        assert_eq!(assigned, vec![2, 15, 3]);
    }

    #[test]
    fn zero_total_assigns_nothing() {
        assert_eq!(allocate(0, &[3, 0, 7]).unwrap(), vec![0, 0, 0]);
        assert_eq!(allocate(0, &[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn leftover_units_do_not_strand_when_a_free_bucket_is_exactly_full() {
        let capacities = [3, 3, 100];
        let assigned = allocate(11, &capacities).unwrap();
        assert_postconditions(11, &capacities, &assigned);
        assert_eq!(assigned, vec![3, 3, 5]);
    }

    #[test]
    fn postconditions_hold_across_many_shapes() {
        let shapes: [&[u64]; 5] = [
            &[1],
            &[0, 4, 9],
            &[7, 7, 7, 7],
            &[1, 2, 3, 4, 5],
            &[10, 0, 0, 1],
        ];
        for capacities in shapes {
            let max: u64 = capacities.iter().sum();
            for total in 0..=max {
                let assigned = allocate(total, capacities).unwrap();
                assert_postconditions(total, capacities, &assigned);
            }
        }
    }

    #[test]
    fn saturated_capacities_do_not_overflow() {
        let assigned = allocate(10, &[u64::MAX, u64::MAX]).unwrap();
        assert_eq!(assigned, vec![5, 5]);
    }
}
