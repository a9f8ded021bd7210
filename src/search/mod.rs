//! The parallel search engine.
//!
//! The engine owns one preprocessed [`RelativeMatcher`] and drives it over
//! the target file: the file is cut into overlapping blocks, a rayon pool
//! of bounded size consumes them, and every worker opens its own read-only
//! handle, sweeps each code-unit alignment within its block, fixes up
//! endianness, and maps the matcher's code-unit offsets back to file byte
//! offsets. Progress is a synchronous callback serialized through a mutex
//! so observed percentages never decrease; cancellation is a cooperative
//! atomic flag checked before each block is dispatched.

mod block;
mod preview;

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use rayon::prelude::*;

use crate::code_unit::{adjust_endianness, decode_units, CodeUnit};
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::matcher::RelativeMatcher;
use crate::{EquivalencyMap, SearchStep};

use self::block::{plan_blocks, SearchBlock};

/// One match, translated to file coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<T> {
    /// Byte offset of the match in the file.
    pub offset: u64,
    /// Recovered character values for this match. Empty for value scans.
    pub values_map: EquivalencyMap<T>,
    /// Rendered context around the match; empty unless previews were
    /// requested.
    pub preview: String,
}

/// Executes searches described by a [`SearchConfig`] with bounded
/// parallelism. `T` selects the code-unit width: `u8` or `u16`.
pub struct SearchEngine<T: CodeUnit> {
    config: SearchConfig,
    _unit: PhantomData<T>,
}

impl<T: CodeUnit> SearchEngine<T> {
    /// Wraps a configuration. Validation happens in [`run`](Self::run).
    pub fn new(config: SearchConfig) -> Self {
        SearchEngine {
            config,
            _unit: PhantomData,
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the search to completion.
    ///
    /// `on_progress` receives `(percent, step)` pairs, serialized so the
    /// percentages are non-decreasing. Setting `abort` stops block
    /// dispatch; in-flight workers drain, partial results are discarded and
    /// an empty list is returned. With `want_previews`, each result's
    /// `preview` is rendered after the scan.
    pub fn run<F>(&self, on_progress: F, abort: &AtomicBool, want_previews: bool) -> Result<Vec<SearchResult<T>>>
    where
        F: FnMut(u8, SearchStep) + Send,
    {
        let config = &self.config;
        debug!(
            "search: file={:?} relative={} unit_width={} endianness={:?} threads={} block_size={} preview_width={}",
            config.file_path,
            config.is_relative_search,
            T::WIDTH,
            config.endianness,
            config.preferred_num_threads,
            config.preferred_search_block_size,
            config.preferred_preview_width,
        );

        if !config.file_path.exists() {
            return Err(Error::NotFound(config.file_path.clone()));
        }
        config.validate()?;

        let matcher = if config.is_relative_search {
            RelativeMatcher::<T>::relative(&config.keyword, config.wildcard, &config.custom_char_seq)?
        } else {
            RelativeMatcher::<T>::value_scan(&config.reference_values)?
        };

        let file_size = fs::metadata(&config.file_path)?.len();
        let blocks = plan_blocks(
            file_size,
            config.pattern_len(),
            T::WIDTH,
            config.preferred_search_block_size,
        );
        debug!("planned {} blocks over {} bytes", blocks.len(), file_size);

        let progress = Mutex::new(ProgressReporter::new(on_progress, blocks.len()));
        lock(&progress).report(SearchStep::Initializing);
        lock(&progress).report(SearchStep::Searching);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.preferred_num_threads)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build worker pool: {e}")))?;

        let harvested: Result<Vec<Vec<SearchResult<T>>>> = pool.install(|| {
            blocks
                .par_iter()
                .take_any_while(|_| !abort.load(Ordering::Relaxed))
                .map(|block| {
                    let local = search_block(config, &matcher, block)?;
                    lock(&progress).block_done();
                    Ok(local)
                })
                .collect()
        });

        let mut results: Vec<SearchResult<T>> = harvested?.into_iter().flatten().collect();

        if abort.load(Ordering::Relaxed) {
            debug!("abort observed, discarding {} partial results", results.len());
            lock(&progress).report(SearchStep::Aborting);
            return Ok(Vec::new());
        }

        results.sort_by_key(|result| result.offset);
        debug!("search finished with {} results", results.len());

        if want_previews && !results.is_empty() {
            lock(&progress).finish(SearchStep::GeneratingPreviews);

            let mut file = File::open(&config.file_path)?;
            for result in &mut results {
                result.preview =
                    preview::render_preview(&mut file, file_size, result.offset, &result.values_map, config)?;
            }
        }

        Ok(results)
    }
}

/// Scans one block: reads its bytes, sweeps every code-unit alignment, and
/// translates matcher offsets back into file byte offsets.
fn search_block<T: CodeUnit>(
    config: &SearchConfig,
    matcher: &RelativeMatcher<T>,
    block: &SearchBlock,
) -> Result<Vec<SearchResult<T>>> {
    trace!("worker scanning block at offset {} ({} bytes)", block.offset, block.len);

    let mut file = File::open(&config.file_path)?;
    file.seek(SeekFrom::Start(block.offset))?;
    let mut raw = vec![0u8; block.len as usize];
    file.read_exact(&mut raw)?;

    let mut local = Vec::new();
    for alignment in 0..T::WIDTH {
        let mut units: Vec<T> = decode_units(&raw, alignment);
        adjust_endianness(&mut units, config.endianness);

        for hit in matcher.search(&units) {
            let offset = block.offset + hit.offset * T::WIDTH as u64 + alignment as u64;
            trace!("match at file offset {offset:#x}");
            local.push(SearchResult {
                offset,
                values_map: hit.values_map,
                preview: String::new(),
            });
        }
    }

    Ok(local)
}

//------------------------------------------------------------------------------
// Progress

struct ProgressReporter<F> {
    callback: F,
    percent: f32,
    increment: f32,
}

impl<F: FnMut(u8, SearchStep)> ProgressReporter<F> {
    fn new(callback: F, num_blocks: usize) -> Self {
        let increment = if num_blocks == 0 {
            0.0
        } else {
            100.0 / num_blocks as f32
        };
        ProgressReporter {
            callback,
            percent: 0.0,
            increment,
        }
    }

    fn report(&mut self, step: SearchStep) {
        (self.callback)(self.percent as u8, step);
    }

    fn block_done(&mut self) {
        self.percent += self.increment;
        self.report(SearchStep::Searching);
    }

    fn finish(&mut self, step: SearchStep) {
        self.percent = 100.0;
        self.report(step);
    }
}

fn lock<F>(progress: &Mutex<ProgressReporter<F>>) -> MutexGuard<'_, ProgressReporter<F>> {
    // A poisoning panic in a progress callback should not mute the rest of
    // the reports.
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
