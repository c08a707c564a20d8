/// Pending staged-transfer mailbox
///
/// Every write into device-local memory leaves behind a record (staging
/// buffer, fence, one-shot command buffer) that must live until its fence
/// signals. Records are pushed here and drained in one batch at a
/// synchronization point instead of being waited on one by one.

use crate::error::Result;

/// Mailbox of in-flight transfer records
#[derive(Debug)]
pub struct PendingTransfers<R> {
    records: Vec<R>,
}

impl<R> Default for PendingTransfers<R> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<R> PendingTransfers<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a submitted transfer
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wait for every pending record then reclaim all of them
    ///
    /// `wait_all` receives the whole batch and must only return `Ok` once
    /// every record's fence has signaled. On error nothing is reclaimed and
    /// the records stay queued.
    ///
    /// # Arguments
    ///
    /// * `wait_all` - Batch wait over all pending records
    /// * `reclaim` - Destroys one record (staging buffer, fence, command buffer)
    ///
    /// # Returns
    ///
    /// Number of records reclaimed
    pub fn drain<W, F>(&mut self, wait_all: W, mut reclaim: F) -> Result<usize>
    where
        W: FnOnce(&[R]) -> Result<()>,
        F: FnMut(R),
    {
        if self.records.is_empty() {
            return Ok(0);
        }

        wait_all(&self.records)?;

        let count = self.records.len();
        for record in self.records.drain(..) {
            reclaim(record);
        }
        Ok(count)
    }
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
