//! Shared, immutable generation context.
//!
//! The context owns fixed-size lookup tables of pre-generated UUIDs,
//! timestamps, IPv4 addresses, years and months. It is built once before any
//! stream starts and is only ever read afterwards, so it can be shared by
//! `Arc` across worker threads without locking. A row index maps to a table
//! slot by `row % table_size`, so lookups repeat cyclically.

use crate::error::GeneratorError;
use crate::generators::bounded::{generate_month, generate_year};
use crate::generators::ip::generate_ipv4;
use crate::generators::strings::{FakerStrings, StringSource};
use crate::generators::timestamp::{format_timestamp, generate_birthday};
use crate::generators::uuid::generate_uuid_v4;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Lookup tables and string source shared by every stream in a run.
pub struct GenerationContext {
    table_size: usize,
    uuids: Vec<Arc<str>>,
    timestamps: Vec<Arc<str>>,
    ip_addresses: Vec<Arc<str>>,
    years: Vec<i32>,
    months: Vec<i32>,
    strings: Arc<dyn StringSource>,
}

impl GenerationContext {
    /// Generate every lookup table with `table_size` entries from `seed`.
    ///
    /// The same seed and size always produce the same tables.
    pub fn build(table_size: usize, seed: u64) -> Result<Self, GeneratorError> {
        if table_size == 0 {
            return Err(GeneratorError::EmptyLookupTable);
        }

        let start = Instant::now();
        info!("Generating {} lookup entries per table (seed={})", table_size, seed);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut uuids = Vec::with_capacity(table_size);
        let mut timestamps = Vec::with_capacity(table_size);
        let mut ip_addresses = Vec::with_capacity(table_size);
        let mut years = Vec::with_capacity(table_size);
        let mut months = Vec::with_capacity(table_size);

        for _ in 0..table_size {
            uuids.push(Arc::from(generate_uuid_v4(&mut rng).to_string()));
            timestamps.push(Arc::from(format_timestamp(&generate_birthday(&mut rng))));
            ip_addresses.push(Arc::from(generate_ipv4(&mut rng).to_string()));
            years.push(generate_year(&mut rng));
            months.push(generate_month(&mut rng));
        }

        info!(
            "Lookup tables ready: {} entries x 5 tables in {:?}",
            table_size,
            start.elapsed()
        );

        Ok(Self {
            table_size,
            uuids,
            timestamps,
            ip_addresses,
            years,
            months,
            strings: Arc::new(FakerStrings),
        })
    }

    /// Replace the realistic string source.
    pub fn with_string_source(mut self, strings: Arc<dyn StringSource>) -> Self {
        self.strings = strings;
        self
    }

    /// Number of entries in each lookup table.
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    fn slot(&self, row: u64) -> usize {
        (row % self.table_size as u64) as usize
    }

    pub fn uuid(&self, row: u64) -> &Arc<str> {
        &self.uuids[self.slot(row)]
    }

    pub fn timestamp(&self, row: u64) -> &Arc<str> {
        &self.timestamps[self.slot(row)]
    }

    pub fn ip_address(&self, row: u64) -> &Arc<str> {
        &self.ip_addresses[self.slot(row)]
    }

    pub fn year(&self, row: u64) -> i32 {
        self.years[self.slot(row)]
    }

    pub fn month(&self, row: u64) -> i32 {
        self.months[self.slot(row)]
    }

    pub fn strings(&self) -> &dyn StringSource {
        self.strings.as_ref()
    }
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("table_size", &self.table_size)
            .finish_non_exhaustive()
    }
}
