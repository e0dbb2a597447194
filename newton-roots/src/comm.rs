//! Collective operations between a fixed group of workers.
//!
//! Every worker calls the same collectives in the same order. The only
//! communication patterns used by the pipeline are a broadcast from the
//! coordinator, a gather to it, and the offset exchange built from the two.

use std::any::Any;
use std::io::Result;
use std::sync::mpsc::{channel, Receiver, Sender};

fn error(message: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn is_root(&self, root: usize) -> bool {
        self.rank() == root
    }

    /// `value` must be `Some` on `root`; every rank receives a copy.
    fn broadcast<T: Clone + Send + 'static>(&mut self, root: usize, value: Option<T>) -> Result<T>;

    /// Values of all ranks in rank order on `root`, `None` elsewhere.
    fn gather<T: Send + 'static>(&mut self, root: usize, value: T) -> Result<Option<Vec<T>>>;

    /// `values` must hold exactly one entry per rank on `root`; rank `i`
    /// receives entry `i`.
    fn scatter<T: Send + 'static>(&mut self, root: usize, values: Option<Vec<T>>) -> Result<T>;

    /// Gathers every rank's `len` on `root`, turns them into an exclusive
    /// prefix sum starting at `base` and hands each rank its own offset
    /// together with the end of the last span.
    fn exclusive_scan_scatter(&mut self, root: usize, base: u64, len: u64) -> Result<Span> {
        let lens = self.gather(root, len)?;
        let spans = lens.map(|lens| {
            let total = base + lens.iter().sum::<u64>();
            exclusive_prefix_sum(base, &lens)
                .into_iter()
                .map(|offset| Span { offset, total })
                .collect()
        });
        self.scatter(root, spans)
    }
}

/// Where one rank writes, and where all writes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: u64,
    pub total: u64,
}

/// `[base, base + l0, base + l0 + l1, ...]`, one entry per length.
pub fn exclusive_prefix_sum(base: u64, lens: &[u64]) -> Vec<u64> {
    lens.iter()
        .scan(base, |acc, &len| {
            let offset = *acc;
            *acc += len;
            Some(offset)
        })
        .collect()
}

/// A group of one is its own coordinator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleCommunicator;

impl Communicator for SingleCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast<T: Clone + Send + 'static>(&mut self, _root: usize, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| error("Broadcast without a value on the root"))
    }

    fn gather<T: Send + 'static>(&mut self, _root: usize, value: T) -> Result<Option<Vec<T>>> {
        Ok(Some(vec![value]))
    }

    fn scatter<T: Send + 'static>(&mut self, _root: usize, values: Option<Vec<T>>) -> Result<T> {
        values
            .and_then(|values| values.into_iter().next())
            .ok_or_else(|| error("Scatter without values on the root"))
    }
}

struct Envelope {
    seq: u64,
    source: usize,
    payload: Box<dyn Any + Send>,
}

/// In-process communicator, one per worker thread, connected by channels.
pub struct LocalCommunicator {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    pending: Vec<Envelope>,
    seq: u64,
}

impl LocalCommunicator {
    pub fn group(size: usize) -> Vec<Self> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self {
                rank,
                peers: senders.clone(),
                inbox,
                pending: vec![],
                seq: 0,
            })
            .collect()
    }

    fn check_root(&self, root: usize) -> Result<()> {
        if root < self.peers.len() {
            Ok(())
        } else {
            Err(error(&format!("Invalid root {root}")))
        }
    }

    fn send<T: Send + 'static>(&self, dest: usize, value: T) -> Result<()> {
        let envelope = Envelope {
            seq: self.seq,
            source: self.rank,
            payload: Box::new(value),
        };
        self.peers[dest]
            .send(envelope)
            .map_err(|_| error(&format!("Worker {dest} is gone")))
    }

    /// Receives the message `source` sent during the current collective.
    /// Messages belonging to other collectives or sources are kept for later.
    fn recv<T: 'static>(&mut self, source: usize) -> Result<T> {
        let seq = self.seq;
        let envelope = match self
            .pending
            .iter()
            .position(|e| e.seq == seq && e.source == source)
        {
            Some(i) => self.pending.swap_remove(i),
            None => loop {
                let envelope = self
                    .inbox
                    .recv()
                    .map_err(|_| error("All workers are gone"))?;
                if envelope.seq == seq && envelope.source == source {
                    break envelope;
                }
                self.pending.push(envelope);
            },
        };
        envelope
            .payload
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| error(&format!("Unexpected message from worker {source}")))
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn broadcast<T: Clone + Send + 'static>(&mut self, root: usize, value: Option<T>) -> Result<T> {
        self.check_root(root)?;
        self.seq += 1;
        if self.rank == root {
            let value = value.ok_or_else(|| error("Broadcast without a value on the root"))?;
            for dest in (0..self.size()).filter(|&dest| dest != root) {
                self.send(dest, value.clone())?;
            }
            Ok(value)
        } else {
            self.recv(root)
        }
    }

    fn gather<T: Send + 'static>(&mut self, root: usize, value: T) -> Result<Option<Vec<T>>> {
        self.check_root(root)?;
        self.seq += 1;
        if self.rank == root {
            let mut own = Some(value);
            let mut values = Vec::with_capacity(self.size());
            for source in 0..self.size() {
                if source == root {
                    values.extend(own.take());
                } else {
                    values.push(self.recv(source)?);
                }
            }
            Ok(Some(values))
        } else {
            self.send(root, value)?;
            Ok(None)
        }
    }

    fn scatter<T: Send + 'static>(&mut self, root: usize, values: Option<Vec<T>>) -> Result<T> {
        self.check_root(root)?;
        self.seq += 1;
        if self.rank == root {
            let values = values.ok_or_else(|| error("Scatter without values on the root"))?;
            if values.len() != self.size() {
                return Err(error(&format!(
                    "Scatter of {} values over {} workers",
                    values.len(),
                    self.size()
                )));
            }
            let mut own = None;
            for (dest, value) in values.into_iter().enumerate() {
                if dest == root {
                    own = Some(value);
                } else {
                    self.send(dest, value)?;
                }
            }
            own.ok_or_else(|| error("Scatter lost the root's value"))
        } else {
            self.recv(root)
        }
    }
}
