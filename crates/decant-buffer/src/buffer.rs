use tracing::trace;

/// Process exit code for OS resource exhaustion (`EX_OSERR` from sysexits).
const EX_OSERR: i32 = 71;

/// A growable byte buffer with a logical window into a larger allocation.
///
/// The buffer holds the bytes a decoder has seen but not yet fully
/// consumed. The meaningful content is the window `[offset, offset+length)`
/// inside `capacity` bytes of owned storage:
///
/// ```text
///   ┌──────────────┬─────────────────────┬──────────────┐
///   │ consumed     │ meaningful window   │ free tail    │
///   │ prefix       │ (length bytes)      │              │
///   └──────────────┴─────────────────────┴──────────────┘
///   0              offset                offset+length   capacity
/// ```
///
/// [`advance`](Self::advance) moves the window start to the right as the
/// decoder retires bytes; [`append`](Self::append) extends the window to
/// the right as new chunks arrive, reclaiming the consumed prefix by
/// left-compaction before it ever reallocates. The result is an amortized
/// sliding window without true wraparound.
///
/// The buffer knows nothing about decoding. It only tracks two diagnostic
/// counters the decode driver needs:
///
/// - `reallocation_count` — how often storage was reallocated;
/// - `bytes_shifted_total` — bytes discarded from the front of storage by
///   compaction, which anchors absolute stream positions in error reports.
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    /// Owned storage. Always fully initialized; `data.len()` is the
    /// capacity in the window invariant.
    data: Vec<u8>,
    /// Index of the first meaningful (unconsumed) byte.
    offset: usize,
    /// Number of meaningful bytes starting at `offset`.
    length: usize,
    /// Number of times storage was reallocated since the last reset.
    reallocation_count: u32,
    /// Cumulative bytes dropped from the front of storage by compaction.
    bytes_shifted_total: u64,
}

impl GrowableBuffer {
    /// Create an empty buffer. No storage is allocated until the first
    /// [`append`](Self::append) that does not fit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the window and both counters for reuse on a new input source.
    ///
    /// Storage is retained, so a buffer that grew while decoding one
    /// source decodes the next without reallocating.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.length = 0;
        self.reallocation_count = 0;
        self.bytes_shifted_total = 0;
    }

    /// Append bytes logically after the current meaningful content,
    /// growing storage if necessary.
    ///
    /// Growth policy, in priority order:
    ///
    /// 1. **No-op** — the free tail already fits the new bytes.
    /// 2. **Compaction** — the consumed prefix is at least as large as the
    ///    new data (`size <= offset`): shift the window to the start of
    ///    storage, adding the old `offset` to `bytes_shifted_total`.
    /// 3. **Reallocation** — allocate `capacity * 4 + size`, copy the
    ///    window to the front of the new storage.
    ///
    /// Allocation failure is the one fatal condition in this component:
    /// the cause is reported on stderr and the process exits with the OS
    /// resource error code. Continuing with insufficient memory is unsafe.
    pub fn append(&mut self, bytes: &[u8]) {
        let size = bytes.len();
        trace!(
            size,
            offset = self.offset,
            length = self.length,
            capacity = self.data.len(),
            "append",
        );

        if self.data.len() >= self.offset + self.length + size {
            // The free tail fits; no structural change.
        } else if size <= self.offset {
            trace!(shifted = self.offset, "window compacted to front");
            self.data.copy_within(self.offset..self.offset + self.length, 0);
            self.bytes_shifted_total += self.offset as u64;
            self.offset = 0;
        } else {
            let new_capacity = self.data.len() * 4 + size;
            let mut next: Vec<u8> = Vec::new();
            if next.try_reserve_exact(new_capacity).is_err() {
                allocation_failed(new_capacity);
            }
            next.resize(new_capacity, 0);
            next[..self.length]
                .copy_from_slice(&self.data[self.offset..self.offset + self.length]);
            self.data = next;
            // The consumed prefix is discarded here too; fold it into the
            // shift counter so absolute positions survive reallocation.
            self.bytes_shifted_total += self.offset as u64;
            self.offset = 0;
            self.reallocation_count += 1;
            trace!(
                capacity = new_capacity,
                count = self.reallocation_count,
                "storage reallocated",
            );
        }

        let tail = self.offset + self.length;
        self.data[tail..tail + size].copy_from_slice(bytes);
        self.length += size;
    }

    /// Discard `consumed` bytes from the front of the window.
    ///
    /// Called after a decode attempt that requested more input: the
    /// decoder has fully processed those bytes and never needs to see
    /// them again. The caller guarantees `consumed <= len()`.
    pub fn advance(&mut self, consumed: usize) {
        debug_assert!(consumed <= self.length);
        self.offset += consumed;
        self.length -= consumed;
    }

    /// The meaningful window: every byte not yet retired by the decoder.
    #[must_use]
    pub fn window(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.length]
    }

    /// Absolute stream position of the byte `consumed` bytes past the
    /// window start. This is the position reported when a decode fails:
    /// everything dropped from the front of storage, plus the consumed
    /// prefix inside storage, plus the progress of the failing attempt.
    #[must_use]
    pub fn stream_position(&self, consumed: usize) -> u64 {
        self.bytes_shifted_total + (self.offset + consumed) as u64
    }

    /// Number of meaningful bytes in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Index of the first meaningful byte within storage.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total allocated storage in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of reallocations since the last reset.
    #[must_use]
    pub fn reallocation_count(&self) -> u32 {
        self.reallocation_count
    }

    /// Bytes dropped from the front of storage by compaction since the
    /// last reset.
    #[must_use]
    pub fn bytes_shifted_total(&self) -> u64 {
        self.bytes_shifted_total
    }
}

/// Report an allocation failure and terminate the process.
///
/// Buffer growth is the sole unrecoverable error class in this component.
fn allocation_failed(requested: usize) -> ! {
    eprintln!("decant: cannot allocate {requested} bytes for the input buffer");
    std::process::exit(EX_OSERR);
}
