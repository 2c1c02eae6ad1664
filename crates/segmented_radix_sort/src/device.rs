//! Host stand-in for an accelerator execution stream.
//!
//! Every dispatch runs its worker groups in parallel on a rayon pool and
//! returns once all of them finished, so dispatches issued on one stream
//! execute in program order. Groups inside a dispatch have no ordering.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct Stream {
    pool: Option<Arc<ThreadPool>>,
}

impl Stream {
    /// Stream backed by rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream backed by a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("segmented-sort-{i}"))
            .build()?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    pub(crate) fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Runs one worker group per item of `work`.
    ///
    /// `init` builds per-worker local state (histograms, staging buffers) that
    /// is reused across the groups a worker executes. The first group to fail
    /// stops the dispatch and its error is returned. With `debug_synchronous`
    /// the stream is synchronized and the elapsed time logged.
    pub fn launch<W, S, I, F>(
        &self,
        kernel: &'static str,
        work: Vec<W>,
        debug_synchronous: bool,
        init: I,
        body: F,
    ) -> Result<()>
    where
        W: Send,
        I: Fn() -> S + Sync + Send,
        F: Fn(&mut S, W) -> Result<()> + Sync + Send,
    {
        let grid = work.len();
        let start = debug_synchronous.then(Instant::now);
        self.install(|| work.into_par_iter().try_for_each_init(init, &body))?;
        if let Some(start) = start {
            self.synchronize()?;
            log::info!(
                "{kernel}({grid}) {:.3} ms",
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(())
    }

    /// Blocks until all previously issued work finished.
    ///
    /// Dispatches complete before [`Stream::launch`] returns, so there is
    /// never outstanding work to wait for.
    pub fn synchronize(&self) -> Result<()> {
        Ok(())
    }

    /// Copies a device value back to the host; a synchronization point.
    pub fn read_back<T: Copy>(&self, value: &T) -> Result<T> {
        self.synchronize()?;
        Ok(*value)
    }
}
