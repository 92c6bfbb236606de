use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use libbpf_rs::{MapCore, RingBufferBuilder};
use log::debug;
use thiserror::Error;

/// How long a single ring-buffer poll may block before the poll thread
/// rechecks the closed flag. Bounds the wake-up latency of
/// [`StreamCloser::close`].
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Why a [`EventStream::read`] call did not produce a record.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The stream was closed; no further records will be delivered.
    #[error("event stream is closed")]
    Closed,
    /// A poll fault that does not end the stream. Retry `read`.
    #[error("ring buffer poll failed: {0}")]
    Poll(#[source] libbpf_rs::Error),
}

/// EventStream turns a BPF ring-buffer map into a blocking record
/// source.
///
/// A background thread polls the ring buffer and forwards each record
/// through a channel; [`read`](Self::read) blocks on that channel.
/// Closing the stream (from any thread, via [`StreamCloser`]) stops the
/// poll thread and wakes a blocked reader.
pub struct EventStream {
    records: Receiver<Result<Vec<u8>, libbpf_rs::Error>>,
    closed: Arc<AtomicBool>,
    poll_thread: Option<JoinHandle<()>>,
}

/// Cloneable handle that closes its [`EventStream`] from another
/// thread.
#[derive(Clone)]
pub struct StreamCloser {
    closed: Arc<AtomicBool>,
}

impl StreamCloser {
    /// Close the stream. Idempotent; safe to call while another thread
    /// is blocked in [`EventStream::read`], which then returns
    /// [`ReadError::Closed`] within one poll timeout.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl EventStream {
    /// Create a new EventStream over the given ring-buffer map and
    /// start its poll thread.
    pub fn new<M: MapCore>(rb_map: &M) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let record_tx = tx.clone();

        let mut builder = RingBufferBuilder::new();
        builder.add(rb_map, move |data: &[u8]| {
            let _ = record_tx.send(Ok(data.to_vec()));
            0
        })?;
        let ringbuf = builder.build()?;

        let closed = Arc::new(AtomicBool::new(false));
        let closed_clone = closed.clone();

        let poll_thread = std::thread::spawn(move || {
            while !closed_clone.load(Ordering::Acquire) {
                if let Err(err) = ringbuf.poll(POLL_TIMEOUT) {
                    match err.kind() {
                        // EINTR is the expected wake-up when a signal
                        // lands; not a fault.
                        libbpf_rs::ErrorKind::Interrupted => (),
                        _ => {
                            if tx.send(Err(err)).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            debug!("Ring buffer poll thread exiting");
        });

        Ok(Self {
            records: rx,
            closed,
            poll_thread: Some(poll_thread),
        })
    }

    /// Block until a record arrives, a poll fault is reported, or the
    /// stream is closed.
    ///
    /// Records still in flight when the stream is closed are dropped:
    /// once `close` happened, every `read` returns
    /// [`ReadError::Closed`].
    pub fn read(&self) -> Result<Vec<u8>, ReadError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ReadError::Closed);
        }
        match self.records.recv() {
            Ok(Ok(record)) => {
                // A close that raced the blocking recv wins.
                if self.closed.load(Ordering::Acquire) {
                    return Err(ReadError::Closed);
                }
                Ok(record)
            }
            Ok(Err(err)) => Err(ReadError::Poll(err)),
            // The poll thread is gone and all its senders with it.
            Err(_) => Err(ReadError::Closed),
        }
    }

    /// Handle for closing the stream from another thread.
    pub fn closer(&self) -> StreamCloser {
        StreamCloser {
            closed: self.closed.clone(),
        }
    }

    /// Close the stream and wait for the poll thread to finish.
    pub fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
        if let Some(thread) = self.poll_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}
