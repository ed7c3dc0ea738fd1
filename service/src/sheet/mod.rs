//! Content model sheet reading
//!
//! The content model lives in one sheet of a workbook. Each `Node` row
//! declares a content type and the `Field` rows beneath it declare its
//! fields:
//!
//! | A        | B     | C               | D       | E           | F        | G           | H          |
//! |----------|-------|-----------------|---------|-------------|----------|-------------|------------|
//! |          | Node  | type: article   | Article | News item   |          |             | base       |
//! | Meta     | Field | field_title     | Title   | TODO        | TRUE     | 1           | Text (255) |
//! | Content  | Field | field_image     | Image   |             | FALSE    | -1          | ref@media/image |

pub mod parser;
pub mod types;

pub use parser::ModelExtractor;
pub use types::{Column, RowKind, SheetRow};
