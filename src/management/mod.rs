//! Pieces of the OpenVPN management interface connection which are needed to
//! decide on client authentication. The connection itself (socket, line
//! framing) is owned by the caller: it feeds each received line into
//! a [`Dispatcher`] or directly into a [`LineConsumer`].

pub mod auth_middleware;


use std::fmt;
use std::io;
use crate::{authentication, log_id, log_utils};


const LINE_TERMINATOR: &[u8] = b"\r\n";


#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failure: {0}")]
    Authentication(#[from] authentication::Error),
    #[error("failed to write to management interface: {0}")]
    Write(#[source] io::Error),
    #[error("no management interface writer is attached")]
    NotStarted,
}

/// Sink for the commands sent back to the management interface
pub trait LineWriter: Send {
    /// Write a single formatted protocol line, the terminator is appended by the writer
    fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()>;
}

impl<W: io::Write + Send> LineWriter for W {
    fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_fmt(line)?;
        self.write_all(LINE_TERMINATOR)?;
        self.flush()
    }
}

/// A handler of the lines received from the management interface
pub trait LineConsumer: Send {
    /// Try to handle the line.
    /// Returns `false` if the line is not of interest for the consumer,
    /// so that the next one may take it.
    fn consume_line(&mut self, line: &str) -> Result<bool, Error>;
}

/// Offers each line to the registered consumers in the registration order.
/// The first consumer which claims the line wins.
#[derive(Default)]
pub struct Dispatcher {
    consumers: Vec<Box<dyn LineConsumer>>,
    log_id: log_utils::IdChain<u64>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consumer<C: LineConsumer + 'static>(mut self, consumer: C) -> Self {
        self.push(consumer);
        self
    }

    pub fn push<C: LineConsumer + 'static>(&mut self, consumer: C) {
        self.consumers.push(Box::new(consumer));
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub fn dispatch(&mut self, line: &str) -> Result<bool, Error> {
        for consumer in self.consumers.iter_mut() {
            if consumer.consume_line(line)? {
                return Ok(true);
            }
        }

        log_id!(trace, self.log_id, "Unclaimed line: {}", line);
        Ok(false)
    }
}
