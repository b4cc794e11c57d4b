//! Directory-based source and sink
//!
//! Input layout under the base path:
//!
//! ```text
//! <base>/pharmacies/*.{csv,json}
//! <base>/claims/*.{csv,json}
//! <base>/reverts/*.{csv,json}
//! ```
//!
//! Output goes to `<base>/invalid_records/` and `<base>/results/`.

pub mod sink;
pub mod source;

pub use sink::FileSink;
pub use source::{read_csv_file, read_json_file, DirectorySource};
