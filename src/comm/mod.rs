//! Point-to-point and collective communication between participants
//!
//! Distributed operations never read ambient global state: the rank, the
//! participant count, and the transport all travel inside an explicit
//! [`Communicator`] value passed into every call. Collectives are built on
//! `send`/`recv` and assume a buffering transport, so a root may push to
//! every peer before any of them has posted a receive.
//!
//! A failed send or receive is fatal to the whole group. Once one leg of a
//! collective breaks, the shared state is undefined for every participant,
//! so nothing here retries.

pub mod local;

use std::ops::Range;

use crate::error::Error;

pub use local::{LocalComm, LocalGroup};

/// A fixed, externally established group of cooperating participants.
///
/// Every collective must be invoked by all participants together with
/// matching arguments; a lone caller blocks forever (no cancellation
/// exists).
pub trait Communicator {
    /// This participant's rank, in `0..size`.
    fn rank(&self) -> usize;

    /// Number of participants in the group.
    fn size(&self) -> usize;

    /// Sends a buffer to one peer.
    fn send(&self, to: usize, buf: &[i32]) -> Result<(), Error>;

    /// Receives one buffer from the given peer, blocking until it arrives.
    fn recv(&self, from: usize) -> Result<Vec<i32>, Error>;

    /// Replicates the root's buffer to every participant.
    fn broadcast(&self, root: usize, buf: &mut Vec<i32>) -> Result<(), Error> {
        if self.rank() == root {
            for r in 0..self.size() {
                if r != root {
                    self.send(r, buf)?;
                }
            }
        } else {
            *buf = self.recv(root)?;
        }
        Ok(())
    }

    /// Splits the root's flat buffer by the per-rank element counts and
    /// delivers each rank its slice. Non-root participants pass `None`.
    fn scatterv(&self, root: usize, data: Option<&[i32]>, counts: &[usize]) -> Result<Vec<i32>, Error> {
        if self.rank() != root {
            return self.recv(root);
        }

        let data = data.ok_or_else(|| Error::Communication("scatter root supplied no data".into()))?;
        let total: usize = counts.iter().sum();
        if counts.len() != self.size() || total != data.len() {
            return Err(Error::Communication(format!(
                "scatter shape mismatch: {} elements split {:?} ways",
                data.len(),
                counts
            )));
        }

        let mut offset = 0;
        let mut own = Vec::new();
        for (r, &count) in counts.iter().enumerate() {
            let slice = &data[offset..offset + count];
            if r == root {
                own = slice.to_vec();
            } else {
                self.send(r, slice)?;
            }
            offset += count;
        }
        Ok(own)
    }

    /// Collects every rank's buffer at the root, ordered by ascending
    /// rank. Non-root participants get `None` back.
    fn gatherv(&self, root: usize, local: &[i32]) -> Result<Option<Vec<Vec<i32>>>, Error> {
        if self.rank() != root {
            self.send(root, local)?;
            return Ok(None);
        }

        let mut blocks = Vec::with_capacity(self.size());
        for r in 0..self.size() {
            if r == root {
                blocks.push(local.to_vec());
            } else {
                blocks.push(self.recv(r)?);
            }
        }
        Ok(Some(blocks))
    }

    /// Elementwise sum across all participants, result replicated to
    /// every rank (reduce at `root`, then broadcast).
    fn allreduce_sum(&self, root: usize, buf: &mut Vec<i32>) -> Result<(), Error> {
        if self.rank() == root {
            for r in 0..self.size() {
                if r == root {
                    continue;
                }
                let other = self.recv(r)?;
                if other.len() != buf.len() {
                    return Err(Error::Communication(format!(
                        "reduce length mismatch: rank {} sent {} elements, expected {}",
                        r,
                        other.len(),
                        buf.len()
                    )));
                }
                for (dst, src) in buf.iter_mut().zip(&other) {
                    *dst += src;
                }
            }
        } else {
            self.send(root, buf)?;
        }
        self.broadcast(root, buf)
    }
}

/// Contiguous block partition of `total` rows over `parts` owners.
///
/// Each owner gets `total / parts` rows; the first `total % parts` owners
/// get one extra row each, in ascending rank order.
///
/// # Panics
///
/// Panics if `parts` is zero.
pub fn block_partition(total: usize, parts: usize) -> Vec<Range<usize>> {
    assert!(parts > 0, "partition needs at least one owner");

    let base = total / parts;
    let extra = total % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for r in 0..parts {
        let len = base + usize::from(r < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}
