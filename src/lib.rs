//! Discover files under registered folders and extract metadata from their
//! path segments with regular expressions.
//!
//! ```no_run
//! use datafinder::{DataFinder, QueryOptions, RegexPositions};
//!
//! let finder = DataFinder::new(["sub"], "/data")?;
//! let positions = RegexPositions::new()
//!     .pattern(0, r"(?P<condition>\w{3})(?P<id>\d{3})_(?P<type>\w*)\.tif");
//! let table = finder.query("*.tif", &QueryOptions::new().positions(positions))?;
//! for row in table.rows() {
//!     println!("{} {:?}", row.filename(), row.get("condition"));
//! }
//! # Ok::<(), datafinder::FinderError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod finder;
pub mod logging;
pub mod positions;
pub mod table;
pub mod utils;

pub use error::{FinderError, Result};
pub use finder::{DataFinder, QueryOptions, RootCandidates};
pub use positions::{PositionRule, RegexPositions};
pub use table::{Record, ResultTable};
