#[cfg(test)] use mockall::automock;
use tracing::trace;

/// This is the abstraction of the ordered transport's read side as seen by a channel while the
///  multiplexer feeds it a DATA segment's payload. Reads are non-blocking: if no data is available
///  right now, `read` returns 0, and the caller retries when the transport becomes readable again.
#[cfg_attr(test, automock)]
pub trait TransportReader {
    /// Copies as many bytes as are available into the start of `target`, returning the number of
    ///  bytes copied (at most `target.len()`)
    fn read(&mut self, target: &mut [u8]) -> anyhow::Result<usize>;
}

/// Reading from a slice consumes from its front
impl TransportReader for &[u8] {
    fn read(&mut self, target: &mut [u8]) -> anyhow::Result<usize> {
        let n = self.len().min(target.len());
        trace!("reading {} bytes from slice", n);

        target[..n].copy_from_slice(&self[..n]);
        *self = &self[n..];
        Ok(n)
    }
}
