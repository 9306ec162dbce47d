/// Accumulates one output stream of a worker, keeping at most `limit` bytes.
///
/// Bytes past the limit are counted and dropped so a chatty worker cannot grow a job
/// record without bound.
#[derive(Debug)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
    limit: usize,
    dropped: usize,
}

impl CapturedOutput {
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        let kept = room.min(chunk.len());
        self.bytes.extend_from_slice(&chunk[..kept]);
        self.dropped += chunk.len() - kept;
    }

    /// Lossy UTF-8 text of what was kept, with a marker if anything was dropped.
    pub fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.dropped > 0 {
            text.push_str(&format!("\n[{} more bytes truncated]", self.dropped));
        }
        text
    }
}
