//! Policy that decides how the line buffer should grow
//!
//! The line source keeps its data in a fixed size buffer (64 KiB by default).
//! A physical line must fit into the buffer as a whole. If a longer line is
//! encountered, the policy takes the current buffer size in bytes and returns
//! the new size the buffer should grow to. Returning `None` instead will
//! indicate that the buffer has grown too big. In this case, the reader will
//! return `Error::BufferLimit`.
//!
//! Flat file lines are short by convention, so growth normally never
//! happens; limiting it protects against input that is not a flat file at all
//! (e.g. a binary file without any newline).
//!
//! # Example
//!
//! ```no_run
//! use embl_io::policy::BufPolicy;
//! use embl_io::embl::Reader;
//! use std::io::stdin;
//!
//! struct Max1M;
//!
//! // This policy lets the buffer double each time, but
//! // limits the buffer size to 1 MiB. Note that this is similar to how
//! // `DoubleUntilLimited` works.
//! impl BufPolicy for Max1M {
//!     fn grow_to(&mut self, current_size: usize) -> Option<usize> {
//!         if current_size >= 1 << 20 {
//!             return None
//!         }
//!         Some(current_size * 2)
//!     }
//! }
//!
//! let mut reader = Reader::new(stdin()).set_policy(Max1M);
//!
//! while let Some(result) = reader.next() {
//!     println!("{:?}", result.unwrap().entry.primary_accession);
//! }
//! ```

pub trait BufPolicy {
    fn grow_to(&mut self, current_size: usize) -> Option<usize>;
}

// doubles up to `step`, then grows by `step`
#[inline]
fn next_size(current_size: usize, step: usize) -> usize {
    if current_size < step {
        current_size * 2
    } else {
        current_size + step
    }
}

/// Standard buffer policy: the buffer size doubles until it reaches 8 MiB,
/// then grows in steps of 8 MiB without limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdPolicy;

impl BufPolicy for StdPolicy {
    fn grow_to(&mut self, current_size: usize) -> Option<usize> {
        Some(next_size(current_size, 1 << 23))
    }
}

/// Like [`StdPolicy`], but doubling stops at `double_until` bytes and the
/// buffer never grows beyond `limit` bytes. Readers return
/// `Error::BufferLimit` for lines that do not fit.
#[derive(Debug, Clone, Copy)]
pub struct DoubleUntilLimited {
    double_until: usize,
    limit: usize,
}

impl DoubleUntilLimited {
    pub fn new(double_until: usize, limit: usize) -> Self {
        DoubleUntilLimited {
            double_until,
            limit,
        }
    }
}

impl BufPolicy for DoubleUntilLimited {
    fn grow_to(&mut self, current_size: usize) -> Option<usize> {
        Some(next_size(current_size, self.double_until)).filter(|&n| n <= self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_policy_stops() {
        let mut p = DoubleUntilLimited::new(4, 10);
        assert_eq!(p.grow_to(2), Some(4));
        assert_eq!(p.grow_to(4), Some(8));
        assert_eq!(p.grow_to(8), None);
    }

    #[test]
    fn std_policy_grows_linearly_above_8m() {
        let mut p = StdPolicy;
        assert_eq!(p.grow_to(1024), Some(2048));
        assert_eq!(p.grow_to(1 << 23), Some(1 << 24));
    }
}
