//! Package implement an ordered-map using [left-leaning-red-black][wiki-llrb]
//! tree.
//!
//! [Llrb] keeps the tree height-balanced so that lookup, insert, delete-min
//! and delete-by-key all finish in O(log n), even when the index holds
//! millions of entries.
//!
//! Simple ordered-map for single threaded use case
//! -----------------------------------------------
//!
//! - Each entry in Llrb instance correspond to a {Key, Value} pair.
//! - Parametrised over `key-type` and `value-type`.
//! - CRUD operations, via insert(), get(), remove(), delete_min() api.
//! - Nodes are held in an arena and addressed by handle. Every walk,
//!   including rebalancing and teardown, is an explicit loop, hence
//!   stack usage is independent of the tree size.
//! - Uses ownership model and borrow semantics to ensure safety.
//! - No Durability guarantee.
//! - Not thread safe.
//!
//! Constructing a new [Llrb] instance and CRUD operations:
//!
//! ```
//! use llrbt::Llrb;
//!
//! let mut index: Llrb<String,String> = Llrb::new();
//! assert_eq!(index.len(), 0);
//! assert_eq!(index.is_empty(), true);
//!
//! index.insert("key1".to_string(), "value1".to_string());
//! index.insert("key2".to_string(), "value2".to_string());
//!
//! let n = index.len();
//! assert_eq!(n, 2);
//!
//! let value = index.get("key1").unwrap();
//! assert_eq!(value, "value1");
//! let value = index.get("key2").unwrap();
//! assert_eq!(value, "value2");
//!
//! let old_value = index.remove("key1").unwrap();
//! assert_eq!(old_value, "value1".to_string());
//!
//! index.get_or_insert_default("key3".to_string()).push_str("value3");
//! let (key, value) = index.find_max().unwrap();
//! assert_eq!((key.as_str(), value.as_str()), ("key3", "value3"));
//!
//! index.validate().unwrap();
//! ```
//!
//! [wiki-llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, msg: format!("bad argument"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, std::io::read(buf));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(Fatal, std::fs::read(file_path), format!("read failed"));
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod llrb;
mod node;

pub use llrb::{Iter, Llrb};

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    /// Tree invariants are broken, refer to [Llrb::validate].
    Fatal(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
