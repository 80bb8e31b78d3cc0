//! Batching with deterministic per-epoch shuffling

use super::{Example, Label};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A mini-batch of examples
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Example ids, one per row
    pub ids: Vec<String>,
    /// `[batch, input_width]` features
    pub features: Array2<f32>,
    /// Gold labels when every example in the batch is labeled
    pub labels: Option<Vec<Label>>,
}

impl Batch {
    pub fn new(ids: Vec<String>, features: Array2<f32>, labels: Option<Vec<Label>>) -> Self {
        Self { ids, features, labels }
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of batches for one phase of a run
///
/// `batches(epoch)` must be a deterministic function of `epoch`, so that
/// a resumed run sees the same order the interrupted run did.
pub trait DataSource {
    fn batches(&self, epoch: usize) -> Vec<Batch>;

    fn num_examples(&self) -> usize;

    fn num_batches(&self) -> usize;

    /// Ids in presentation order (unshuffled)
    fn example_ids(&self) -> Vec<String>;
}

/// Pre-built batches, replayed identically every epoch
impl DataSource for Vec<Batch> {
    fn batches(&self, _epoch: usize) -> Vec<Batch> {
        self.clone()
    }

    fn num_examples(&self) -> usize {
        self.iter().map(Batch::len).sum()
    }

    fn num_batches(&self) -> usize {
        self.len()
    }

    fn example_ids(&self) -> Vec<String> {
        self.iter().flat_map(|b| b.ids.iter().cloned()).collect()
    }
}

/// Batches examples into fixed-width feature matrices
pub struct DataLoader {
    examples: Vec<Example>,
    input_fields: Vec<String>,
    max_seq_len: usize,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
}

impl DataLoader {
    pub fn new(
        examples: Vec<Example>,
        input_fields: Vec<String>,
        max_seq_len: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            examples,
            input_fields,
            max_seq_len,
            batch_size: batch_size.max(1),
            shuffle: false,
            seed: 0,
        }
    }

    /// Shuffle each epoch with a generator seeded from `(seed, epoch)`
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    /// Width of one feature row
    pub fn input_width(&self) -> usize {
        self.input_fields.len() * self.max_seq_len
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    fn order(&self, epoch: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.examples.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed ^ (epoch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            order.shuffle(&mut rng);
        }
        order
    }

    fn build_batch(&self, indices: &[usize]) -> Batch {
        let width = self.input_width();
        let mut data = Vec::with_capacity(indices.len() * width);
        let mut ids = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for &i in indices {
            let ex = &self.examples[i];
            data.extend(ex.features(&self.input_fields, self.max_seq_len));
            ids.push(ex.id.clone());
            labels.push(ex.label);
        }
        let features = Array2::from_shape_vec((indices.len(), width), data)
            .unwrap_or_else(|_| Array2::zeros((indices.len(), width)));
        let labels = labels.into_iter().collect::<Option<Vec<Label>>>();
        Batch::new(ids, features, labels)
    }
}

impl DataSource for DataLoader {
    fn batches(&self, epoch: usize) -> Vec<Batch> {
        self.order(epoch)
            .chunks(self.batch_size)
            .map(|chunk| self.build_batch(chunk))
            .collect()
    }

    fn num_examples(&self) -> usize {
        self.examples.len()
    }

    fn num_batches(&self) -> usize {
        self.examples.len().div_ceil(self.batch_size)
    }

    fn example_ids(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.id.clone()).collect()
    }
}
