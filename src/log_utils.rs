use std::fmt::{Debug, Display, Formatter};
use dynfmt::{Format, SimpleCurlyFormat};
use smallvec::SmallVec;


pub const CLIENT_ID_FMT: &str = "CID={}";
pub const KEY_ID_FMT: &str = "KID={}";


/// A single identifier of a log record, e.g. `CID=1`
#[derive(Clone)]
pub struct IdItem<T> {
    fmt: &'static str,
    id: T,
}

/// Chain of identifiers which is printed in front of a log record,
/// e.g. `[CID=1][KID=2]`
#[derive(Clone, Default)]
pub struct IdChain<T> {
    list: SmallVec<[IdItem<T>; 2]>,
}

#[macro_export]
macro_rules! log_id {
    ($lvl:ident, $id_chain:expr, $($arg:tt)+) => {
        log::$lvl!("{} {}", $id_chain, format_args!($($arg)+))
    };
}

impl<T> IdItem<T> {
    pub fn new(fmt: &'static str, id: T) -> Self {
        Self { fmt, id }
    }
}

impl<T: Clone> IdChain<T> {
    pub fn empty() -> Self {
        Self {
            list: SmallVec::new(),
        }
    }

    /// Make a new chain with the `item` appended to the tail
    pub fn extended(&self, item: IdItem<T>) -> Self {
        let mut x = self.clone();
        x.list.push(item);
        x
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<T> From<IdItem<T>> for IdChain<T> {
    fn from(item: IdItem<T>) -> Self {
        let mut list = SmallVec::new();
        list.push(item);
        Self { list }
    }
}

impl<T: serde::Serialize> Display for IdItem<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match SimpleCurlyFormat.format(self.fmt, &[&self.id]) {
            Ok(x) => write!(f, "{}", x),
            Err(_) => write!(f, "{}", self.fmt),
        }
    }
}

impl<T: serde::Serialize> Debug for IdItem<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T: serde::Serialize> Display for IdChain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in &self.list {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}

impl<T: serde::Serialize> Debug for IdChain<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_display() {
        let id = IdChain::from(IdItem::new(CLIENT_ID_FMT, 1_u64))
            .extended(IdItem::new(KEY_ID_FMT, 2));
        assert_eq!(id.to_string(), "[CID=1][KID=2]");
    }

    #[test]
    fn empty_chain_display() {
        let id = IdChain::<u64>::empty();
        assert!(id.is_empty());
        assert_eq!(id.to_string(), "");
    }
}
