//! In-memory terminal device for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

use super::Device;

#[derive(Debug, Default)]
struct MockState {
    input: VecDeque<Vec<u8>>,
    output: Vec<u8>,
    raw: bool,
    reject_raw: bool,
    broken: bool,
    raw_toggles: usize,
    size: (u16, u16),
}

/// Scripted device. Clones share state, so a test can keep a handle after
/// moving the device into a `Terminal`.
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Rc<RefCell<MockState>>,
}

impl MockDevice {
    pub fn new(cols: u16, rows: u16) -> Self {
        let device = Self::default();
        device.state.borrow_mut().size = (cols, rows);
        device
    }

    /// Queue one chunk; each `read` returns at most one chunk.
    pub fn push_input(&self, bytes: &[u8]) {
        self.state.borrow_mut().input.push_back(bytes.to_vec());
    }

    /// Queue several single-key chunks.
    pub fn push_keys(&self, keys: &[&[u8]]) {
        for key in keys {
            self.push_input(key);
        }
    }

    pub fn output(&self) -> Vec<u8> {
        self.state.borrow().output.clone()
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.state.borrow().output).into_owned()
    }

    pub fn clear_output(&self) {
        self.state.borrow_mut().output.clear();
    }

    pub fn is_raw(&self) -> bool {
        self.state.borrow().raw
    }

    pub fn raw_toggles(&self) -> usize {
        self.state.borrow().raw_toggles
    }

    /// Make the next `enable_raw_mode` calls fail.
    pub fn reject_raw_mode(&self) {
        self.state.borrow_mut().reject_raw = true;
    }

    /// Make every later write and flush fail with `BrokenPipe`.
    pub fn break_output(&self) {
        self.state.borrow_mut().broken = true;
    }

    pub fn resize(&self, cols: u16, rows: u16) {
        self.state.borrow_mut().size = (cols, rows);
    }
}

impl Read for MockDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        let Some(chunk) = state.input.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        Ok(n)
    }
}

impl Write for MockDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.broken {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        state.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.state.borrow().broken {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        Ok(())
    }
}

impl Device for MockDevice {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.reject_raw {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "not a terminal",
            ));
        }
        state.raw = true;
        state.raw_toggles += 1;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.raw = false;
        state.raw_toggles += 1;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.state.borrow().size)
    }
}
