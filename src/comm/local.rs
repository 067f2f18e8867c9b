//! In-process participant group wired with channels
//!
//! Each participant owns one [`LocalComm`] and typically runs on its own
//! thread. Every ordered pair of ranks gets a dedicated unbounded channel,
//! so sends never block and `recv(from)` addresses one specific peer. A
//! disconnected channel (a peer dropped its end) surfaces as
//! [`Error::Communication`].

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::comm::Communicator;
use crate::error::Error;

/// One participant's endpoint in an in-process group.
pub struct LocalComm {
    rank: usize,
    size: usize,
    senders: Vec<Sender<Vec<i32>>>,
    receivers: Vec<Receiver<Vec<i32>>>,
}

/// Factory for in-process participant groups.
pub struct LocalGroup;

impl LocalGroup {
    /// Wires up a group of `size` participants and returns their
    /// endpoints in rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Vec<LocalComm> {
        assert!(size > 0, "a group needs at least one participant");

        let mut txs: Vec<Vec<Option<Sender<Vec<i32>>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        let mut rxs: Vec<Vec<Option<Receiver<Vec<i32>>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();

        for from in 0..size {
            for to in 0..size {
                let (tx, rx) = channel();
                txs[from][to] = Some(tx);
                rxs[from][to] = Some(rx);
            }
        }

        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                senders: (0..size)
                    .map(|to| txs[rank][to].take().expect("each channel is wired exactly once"))
                    .collect(),
                receivers: (0..size)
                    .map(|from| rxs[from][rank].take().expect("each channel is wired exactly once"))
                    .collect(),
            })
            .collect()
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, to: usize, buf: &[i32]) -> Result<(), Error> {
        assert!(to < self.size, "rank {} outside group of {}", to, self.size);
        self.senders[to]
            .send(buf.to_vec())
            .map_err(|_| Error::Communication(format!("send from rank {} to rank {} failed: peer disconnected", self.rank, to)))
    }

    fn recv(&self, from: usize) -> Result<Vec<i32>, Error> {
        assert!(from < self.size, "rank {} outside group of {}", from, self.size);
        self.receivers[from]
            .recv()
            .map_err(|_| Error::Communication(format!("receive at rank {} from rank {} failed: peer disconnected", self.rank, from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_point_to_point() {
        let mut group = LocalGroup::new(2);
        let c1 = group.pop().unwrap();
        let c0 = group.pop().unwrap();

        let handle = thread::spawn(move || {
            c1.send(0, &[1, 2, 3]).unwrap();
            c1.recv(0).unwrap()
        });

        assert_eq!(c0.recv(1).unwrap(), vec![1, 2, 3]);
        c0.send(1, &[9]).unwrap();
        assert_eq!(handle.join().unwrap(), vec![9]);
    }

    #[test]
    fn test_broadcast() {
        let group = LocalGroup::new(3);
        let handles: Vec<_> = group
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let mut buf = if comm.rank() == 1 { vec![5, 6] } else { Vec::new() };
                    comm.broadcast(1, &mut buf).unwrap();
                    buf
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![5, 6]);
        }
    }

    #[test]
    fn test_scatterv_and_gatherv() {
        let group = LocalGroup::new(3);
        let handles: Vec<_> = group
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let data = if comm.rank() == 0 {
                        Some(vec![10, 11, 12, 20, 30])
                    } else {
                        None
                    };
                    let local = comm
                        .scatterv(0, data.as_deref(), &[3, 1, 1])
                        .unwrap();
                    let gathered = comm.gatherv(0, &local).unwrap();
                    (comm.rank(), local, gathered)
                })
            })
            .collect();

        for handle in handles {
            let (rank, local, gathered) = handle.join().unwrap();
            match rank {
                0 => {
                    assert_eq!(local, vec![10, 11, 12]);
                    assert_eq!(
                        gathered.unwrap(),
                        vec![vec![10, 11, 12], vec![20], vec![30]]
                    );
                }
                1 => assert_eq!(local, vec![20]),
                2 => assert_eq!(local, vec![30]),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_allreduce_sum() {
        let group = LocalGroup::new(4);
        let handles: Vec<_> = group
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let mut buf = vec![comm.rank() as i32, 1];
                    comm.allreduce_sum(0, &mut buf).unwrap();
                    buf
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![6, 4]);
        }
    }

    #[test]
    fn test_disconnected_peer_is_fatal() {
        let mut group = LocalGroup::new(2);
        let c1 = group.pop().unwrap();
        let c0 = group.pop().unwrap();
        drop(c1);

        let err = c0.recv(1).unwrap_err();
        assert!(matches!(err, Error::Communication(_)));
    }
}
