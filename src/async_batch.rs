//! Async batch decoding module
//!
//! This module decodes many zip entries concurrently. Each entry is decoded
//! on tokio's blocking thread pool, since the decoders themselves never
//! yield; all tasks share one [`Decompressor`](crate::Decompressor) and
//! therefore one set of buffer pools.

#[cfg(feature = "async")]
/// Concurrent entry decoding with a configurable concurrency limit
pub mod processor {
    use crate::{DecodeError, Decompressor, EntryInfo, Result};
    use futures::stream::{self, StreamExt, TryStreamExt};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Concurrent decoder for batches of zip entries
    #[derive(Debug, Clone)]
    pub struct AsyncBatchDecoder {
        decompressor: Arc<Decompressor>,
        concurrency_limit: usize,
    }

    impl AsyncBatchDecoder {
        /// Create a batch decoder running one task per CPU
        pub fn new() -> Self {
            Self {
                decompressor: Arc::new(Decompressor::new()),
                concurrency_limit: num_cpus::get(),
            }
        }

        /// Set the number of entries decoded at the same time
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Share an existing decompressor and its pools
        pub fn with_decompressor(mut self, decompressor: Arc<Decompressor>) -> Self {
            self.decompressor = decompressor;
            self
        }

        /// Number of entries decoded at the same time
        pub fn concurrency(&self) -> usize {
            self.concurrency_limit
        }

        /// Decode one entry on the blocking thread pool
        pub async fn decode_entry(&self, entry: EntryInfo, data: Vec<u8>) -> Result<Vec<u8>> {
            let decompressor = Arc::clone(&self.decompressor);
            tokio::task::spawn_blocking(move || decompressor.decompress_to_vec(&entry, &data))
                .await
                .map_err(|e| DecodeError::TaskFailed(e.to_string()))?
        }

        /// Decode every entry; results are in input order, one per entry
        pub async fn decode_all(&self, entries: Vec<(EntryInfo, Vec<u8>)>) -> Vec<Result<Vec<u8>>> {
            stream::iter(entries.into_iter().map(|(entry, data)| {
                let decoder = self.clone();
                async move { decoder.decode_entry(entry, data).await }
            }))
            .buffered(self.concurrency_limit)
            .collect()
            .await
        }

        /// Decode every entry, stopping at the first failure
        pub async fn try_decode_all(
            &self,
            entries: Vec<(EntryInfo, Vec<u8>)>,
        ) -> Result<Vec<Vec<u8>>> {
            stream::iter(entries.into_iter().map(|(entry, data)| {
                let decoder = self.clone();
                async move { decoder.decode_entry(entry, data).await }
            }))
            .buffered(self.concurrency_limit)
            .try_collect()
            .await
        }

        /// Read raw compressed streams from disk and decode them
        pub async fn decode_files<P: AsRef<Path>>(
            &self,
            files: Vec<(P, EntryInfo)>,
        ) -> Result<Vec<(PathBuf, Vec<u8>)>> {
            stream::iter(files.into_iter().map(|(path, entry)| {
                let decoder = self.clone();
                let path = path.as_ref().to_path_buf();
                async move {
                    let data = tokio::fs::read(&path).await?;
                    let decoded = decoder.decode_entry(entry, data).await?;
                    Ok::<_, DecodeError>((path, decoded))
                }
            }))
            .buffered(self.concurrency_limit)
            .try_collect()
            .await
        }
    }

    impl Default for AsyncBatchDecoder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(feature = "async")]
pub use processor::AsyncBatchDecoder;
