//! Common utilities for tests

use std::cell::Cell;
use std::rc::Rc;

use jumbo::{Block, BlockNum, BlockStore, Error, FileSystem, RamDisk, Result, Volume};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

/// A freshly formatted file system on a RamDisk.
pub fn new_fs(num_blocks: usize) -> FileSystem<Volume<RamDisk>> {
    FileSystem::format(RamDisk::new(num_blocks)).unwrap()
}

/// Bytes 0, 1, 2, ... wrapping, offset by `seed` so that neighbouring
/// writes are told apart.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_add(seed)).collect()
}

/// Wraps a store and lets only `quota` more allocations through. Once the
/// quota is used up `allocate` reports an exhausted pool.
pub struct QuotaStore<S> {
    inner: S,
    quota: Rc<Cell<usize>>,
}

impl<S: BlockStore> QuotaStore<S> {
    /// Returns the store and a handle to adjust its quota later.
    pub fn new(inner: S, quota: usize) -> (Self, Rc<Cell<usize>>) {
        let quota = Rc::new(Cell::new(quota));
        (
            Self {
                inner,
                quota: Rc::clone(&quota),
            },
            quota,
        )
    }
}

impl<S: BlockStore> BlockStore for QuotaStore<S> {
    fn read_block(&self, id: BlockNum, buf: &mut Block) -> Result<()> {
        self.inner.read_block(id, buf)
    }

    fn write_block(&mut self, id: BlockNum, buf: &Block) -> Result<()> {
        self.inner.write_block(id, buf)
    }

    fn allocate(&mut self) -> Result<Option<BlockNum>> {
        if self.quota.get() == 0 {
            return Ok(None);
        }
        let block = self.inner.allocate()?;
        if block.is_some() {
            self.quota.set(self.quota.get() - 1);
        }
        Ok(block)
    }

    fn release(&mut self, id: BlockNum) -> Result<()> {
        self.inner.release(id)
    }

    fn free_blocks(&self) -> usize {
        self.inner.free_blocks()
    }
}

/// Failures a `FaultyStore` injects. Every field is off by default and can be
/// changed while the store is in use.
#[derive(Debug, Default)]
pub struct Faults {
    /// `write_block` to this block fails.
    pub write: Cell<Option<BlockNum>>,
    /// `release` of this block fails.
    pub release: Cell<Option<BlockNum>>,
    /// Allocations still allowed before `allocate` fails with an I/O error.
    pub allocs_left: Cell<Option<usize>>,
}

impl Faults {
    pub fn clear(&self) {
        self.write.set(None);
        self.release.set(None);
        self.allocs_left.set(None);
    }
}

/// Wraps a store and turns selected calls into I/O errors.
pub struct FaultyStore<S> {
    inner: S,
    faults: Rc<Faults>,
}

impl<S: BlockStore> FaultyStore<S> {
    /// Returns the store and a handle to its fault switches.
    pub fn new(inner: S) -> (Self, Rc<Faults>) {
        let faults = Rc::new(Faults::default());
        (
            Self {
                inner,
                faults: Rc::clone(&faults),
            },
            faults,
        )
    }
}

fn injected(what: &str) -> Error {
    Error::Io(std::io::Error::other(format!("injected {} failure", what)))
}

impl<S: BlockStore> BlockStore for FaultyStore<S> {
    fn read_block(&self, id: BlockNum, buf: &mut Block) -> Result<()> {
        self.inner.read_block(id, buf)
    }

    fn write_block(&mut self, id: BlockNum, buf: &Block) -> Result<()> {
        if self.faults.write.get() == Some(id) {
            return Err(injected("write"));
        }
        self.inner.write_block(id, buf)
    }

    fn allocate(&mut self) -> Result<Option<BlockNum>> {
        match self.faults.allocs_left.get() {
            Some(0) => return Err(injected("allocate")),
            Some(n) => self.faults.allocs_left.set(Some(n - 1)),
            None => {}
        }
        self.inner.allocate()
    }

    fn release(&mut self, id: BlockNum) -> Result<()> {
        if self.faults.release.get() == Some(id) {
            return Err(injected("release"));
        }
        self.inner.release(id)
    }

    fn free_blocks(&self) -> usize {
        self.inner.free_blocks()
    }
}
