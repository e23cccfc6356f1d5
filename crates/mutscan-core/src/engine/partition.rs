use super::config::{PartitionConfig, PartitionConfigBuilder};
use super::error::EngineError;
use super::runtime::RuntimeEstimator;
use crate::core::io::traits::SequenceSource;
use crate::core::models::batch::JobBatch;
use crate::core::models::descriptor::VariantDescriptor;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSummary {
    pub job_count: usize,
    pub descriptor_count: usize,
    /// Smallest and largest estimated job cost in seconds; only set for cost-balanced
    /// partitions.
    pub cost_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub batches: Vec<JobBatch>,
    pub summary: PartitionSummary,
}

/// Splits a master list of descriptors into per-job batches.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPartitioner {
    config: PartitionConfig,
}

impl JobPartitioner {
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    pub fn fixed_size(variants_per_job: usize) -> Result<Self, EngineError> {
        let config = PartitionConfigBuilder::new()
            .variants_per_job(variants_per_job)
            .build()?;
        Ok(Self::new(config))
    }

    pub fn cost_balanced(
        estimator: RuntimeEstimator,
        seconds_per_job: f64,
    ) -> Result<Self, EngineError> {
        let config = PartitionConfigBuilder::new()
            .estimator(estimator)
            .seconds_per_job(seconds_per_job)
            .build()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Partitions `descriptors`, preserving master-list order in fixed-size mode.
    ///
    /// Cost-balanced mode needs `sequences` to look up each structure's length.
    #[instrument(level = "info", skip_all, fields(descriptors = descriptors.len()))]
    pub fn partition(
        &self,
        descriptors: Vec<VariantDescriptor>,
        sequences: Option<&dyn SequenceSource>,
    ) -> Result<Partition, EngineError> {
        if descriptors.is_empty() {
            return Err(EngineError::Configuration(
                "the master variant list is empty".to_string(),
            ));
        }

        let partition = match &self.config {
            PartitionConfig::FixedSize { variants_per_job } => {
                partition_fixed(descriptors, *variants_per_job)
            }
            PartitionConfig::CostBalanced {
                estimator,
                seconds_per_job,
            } => {
                let sequences = sequences.ok_or_else(|| {
                    EngineError::Configuration(
                        "cost-balanced partitioning requires a sequence source".to_string(),
                    )
                })?;
                partition_by_cost(descriptors, estimator, *seconds_per_job, sequences)?
            }
        };

        info!(
            jobs = partition.summary.job_count,
            descriptors = partition.summary.descriptor_count,
            "Partitioned master list"
        );
        Ok(partition)
    }
}

fn partition_fixed(descriptors: Vec<VariantDescriptor>, variants_per_job: usize) -> Partition {
    let descriptor_count = descriptors.len();
    let mut batches = Vec::with_capacity(descriptor_count.div_ceil(variants_per_job));
    let mut iter = descriptors.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<_> = iter.by_ref().take(variants_per_job).collect();
        batches.push(JobBatch::new(batches.len(), chunk));
    }
    Partition {
        summary: PartitionSummary {
            job_count: batches.len(),
            descriptor_count,
            cost_range: None,
        },
        batches,
    }
}

fn partition_by_cost(
    descriptors: Vec<VariantDescriptor>,
    estimator: &RuntimeEstimator,
    seconds_per_job: f64,
    sequences: &dyn SequenceSource,
) -> Result<Partition, EngineError> {
    let descriptor_count = descriptors.len();

    let mut cost_by_structure: HashMap<String, f64> = HashMap::new();
    let mut costed = Vec::with_capacity(descriptor_count);
    for descriptor in descriptors {
        let cost = match cost_by_structure.get(&descriptor.structure_id) {
            Some(&cost) => cost,
            None => {
                let length = sequences.sequence(&descriptor.structure_id)?.len();
                let cost = estimator.estimate(length);
                debug!(
                    structure = %descriptor.structure_id,
                    length,
                    cost,
                    "Estimated per-variant cost"
                );
                cost_by_structure.insert(descriptor.structure_id.clone(), cost);
                cost
            }
        };
        costed.push((cost, descriptor));
    }

    let total_cost: f64 = costed.iter().map(|(cost, _)| cost).sum();
    let job_count = ((total_cost / seconds_per_job).ceil() as usize).clamp(1, descriptor_count);
    debug!(total_cost, job_count, "Derived job count from cost budget");

    // Stable: equal costs keep master-list order.
    costed.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut slots: Vec<Vec<VariantDescriptor>> = vec![Vec::new(); job_count];
    let mut slot_costs = vec![0.0f64; job_count];
    for (i, (cost, descriptor)) in costed.into_iter().enumerate() {
        let slot = i % job_count;
        slot_costs[slot] += cost;
        slots[slot].push(descriptor);
    }

    let min = slot_costs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = slot_costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(Partition {
        batches: slots
            .into_iter()
            .enumerate()
            .map(|(index, descriptors)| JobBatch::new(index, descriptors))
            .collect(),
        summary: PartitionSummary {
            job_count,
            descriptor_count,
            cost_range: Some((min, max)),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::SequenceSourceError;
    use crate::core::models::sequence::Sequence;
    use crate::core::models::variant::Variant;

    fn descriptors(structure_id: &str, count: usize) -> Vec<VariantDescriptor> {
        (0..count)
            .map(|i| {
                let variant: Variant = format!("A{}C", i + 1).parse().unwrap();
                VariantDescriptor::new(structure_id, variant)
            })
            .collect()
    }

    fn sequences(entries: &[(&str, usize)]) -> HashMap<String, Sequence> {
        entries
            .iter()
            .map(|&(id, len)| (id.to_string(), Sequence::new(&"A".repeat(len)).unwrap()))
            .collect()
    }

    #[test]
    fn fixed_size_produces_full_chunks_in_order() {
        let master = descriptors("s.pdb", 1000);
        let partition = JobPartitioner::fixed_size(50)
            .unwrap()
            .partition(master.clone(), None)
            .unwrap();
        assert_eq!(partition.batches.len(), 20);
        assert!(partition.batches.iter().all(|b| b.len() == 50));
        let flattened: Vec<_> = partition
            .batches
            .into_iter()
            .flat_map(|b| b.descriptors)
            .collect();
        assert_eq!(flattened, master);
        assert_eq!(partition.summary.cost_range, None);
    }

    #[test]
    fn fixed_size_last_chunk_may_be_short() {
        let partition = JobPartitioner::fixed_size(4)
            .unwrap()
            .partition(descriptors("s.pdb", 10), None)
            .unwrap();
        let sizes: Vec<usize> = partition.batches.iter().map(JobBatch::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        let indices: Vec<usize> = partition.batches.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn cost_balanced_fills_every_derived_job() {
        // Each variant costs 1 * 10 + 0 = 10 seconds; 100 variants over a 250 s
        // budget gives ceil(1000 / 250) = 4 jobs.
        let seqs = sequences(&[("s.pdb", 10)]);
        let partitioner = JobPartitioner::cost_balanced(RuntimeEstimator::new(1.0, 0.0), 250.0)
            .unwrap();
        let partition = partitioner
            .partition(descriptors("s.pdb", 100), Some(&seqs))
            .unwrap();
        assert_eq!(partition.summary.job_count, 4);
        assert_eq!(partition.batches.len(), 4);
        assert!(partition.batches.iter().all(|b| !b.is_empty()));
        let total: usize = partition.batches.iter().map(JobBatch::len).sum();
        assert_eq!(total, 100);
        assert_eq!(partition.summary.cost_range, Some((250.0, 250.0)));
    }

    #[test]
    fn cost_balanced_places_expensive_structures_first() {
        let seqs = sequences(&[("small.pdb", 10), ("large.pdb", 100)]);
        let mut master = descriptors("small.pdb", 3);
        master.extend(descriptors("large.pdb", 3));
        let partition = JobPartitioner::cost_balanced(RuntimeEstimator::new(1.0, 0.0), 200.0)
            .unwrap()
            .partition(master, Some(&seqs))
            .unwrap();
        // total 330 s over 200 s per job -> 2 jobs; round-robin over descending cost.
        assert_eq!(partition.batches.len(), 2);
        let first: Vec<&str> = partition.batches[0]
            .descriptors
            .iter()
            .map(|d| d.structure_id.as_str())
            .collect();
        assert_eq!(first, vec!["large.pdb", "large.pdb", "small.pdb"]);
        assert_eq!(partition.summary.cost_range, Some((120.0, 210.0)));
    }

    #[test]
    fn job_count_never_exceeds_descriptor_count() {
        let seqs = sequences(&[("s.pdb", 1000)]);
        let partition = JobPartitioner::cost_balanced(RuntimeEstimator::new(1.0, 0.0), 1.0)
            .unwrap()
            .partition(descriptors("s.pdb", 3), Some(&seqs))
            .unwrap();
        assert_eq!(partition.batches.len(), 3);
        assert!(partition.batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn empty_master_list_and_bad_budget_are_rejected() {
        assert!(matches!(
            JobPartitioner::fixed_size(10).unwrap().partition(Vec::new(), None),
            Err(EngineError::Configuration(_))
        ));
        assert!(matches!(
            JobPartitioner::cost_balanced(RuntimeEstimator::default(), 0.0),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            JobPartitioner::cost_balanced(RuntimeEstimator::default(), 10.0)
                .unwrap()
                .partition(descriptors("s.pdb", 1), None),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_structure_surfaces_the_source_error() {
        let seqs = sequences(&[("s.pdb", 10)]);
        let result = JobPartitioner::cost_balanced(RuntimeEstimator::default(), 100.0)
            .unwrap()
            .partition(descriptors("other.pdb", 2), Some(&seqs));
        assert!(matches!(
            result,
            Err(EngineError::SequenceSource(SequenceSourceError::UnknownStructure(_)))
        ));
    }
}
