//! Per-stream row generator.

use crate::column::Column;
use crate::context::GenerationContext;
use culvert_core::{Field, Record};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Derive a stream's RNG seed from the run seed and the stream name.
///
/// Uses FNV-1a over the name so the result is stable across builds and
/// platforms, then mixes it into the base seed.
pub fn seed_for_stream(base_seed: u64, stream_name: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = stream_name.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    });
    base_seed.wrapping_add(hash.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Produces records for one stream.
///
/// Each generator owns its random source, so streams never contend on it and
/// a single stream's random columns are reproducible from its seed.
pub struct RowGenerator {
    columns: Arc<[Column]>,
    context: Arc<GenerationContext>,
    rng: StdRng,
    index: u64,
}

impl RowGenerator {
    /// Create a generator over `columns` seeded with `seed`.
    pub fn new(columns: Arc<[Column]>, context: Arc<GenerationContext>, seed: u64) -> Self {
        Self {
            columns,
            context,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        }
    }

    /// Create a generator seeded from the run seed and the stream name.
    pub fn for_stream(
        columns: Arc<[Column]>,
        context: Arc<GenerationContext>,
        base_seed: u64,
        stream_name: &str,
    ) -> Self {
        Self::new(columns, context, seed_for_stream(base_seed, stream_name))
    }

    /// Index of the next record.
    pub fn current_index(&self) -> u64 {
        self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Evaluate every column, in order, for the next row index.
    pub fn next_record(&mut self) -> Record {
        let index = self.index;
        let fields = self
            .columns
            .iter()
            .map(|column| {
                let value = column.value_at(index, &self.context, &mut self.rng);
                Field::new(column.name().clone(), value)
            })
            .collect();

        self.index += 1;

        Record::new(index, fields)
    }
}
