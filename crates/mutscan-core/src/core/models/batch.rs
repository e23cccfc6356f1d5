use super::descriptor::VariantDescriptor;

/// The descriptors assigned to one compute job. `index` is the job number and also
/// names the batch file (`{index}.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobBatch {
    pub index: usize,
    pub descriptors: Vec<VariantDescriptor>,
}

impl JobBatch {
    pub fn new(index: usize, descriptors: Vec<VariantDescriptor>) -> Self {
        Self { index, descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.index)
    }
}
