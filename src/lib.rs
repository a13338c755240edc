//! Converts in-memory typed records into OOXML (`.xlsx`) spreadsheet
//! packages: a type-erased column/cell model, shared-string and style
//! deduplication, a per-sheet XML emitter, a package assembler producing
//! every required OOXML part, and a hand-rolled streaming ZIP/DEFLATE
//! writer — all without a third-party ZIP or XLSX dependency.

pub mod cell;
pub mod column;
pub mod coord;
pub mod datetime;
pub mod error;
pub mod logger;
pub mod numfmt;
pub mod package;
pub mod progress;
pub mod registry;
pub mod shared_strings;
pub mod sheet;
pub mod sheet_assembler;
pub mod sheet_name;
pub mod style;
pub mod workbook;
pub mod xml_writer;
pub mod zip;

pub use cell::{BoolExpression, CaseStrategy, Cell, CellKind, NumberFormat, Uri};
pub use column::{AnyColumn, Column, ColumnCapability, ColumnOutput};
pub use error::{Result, SheetcraftError};
pub use logger::{Logger, NullLogger, StderrLogger};
pub use package::DocumentProperties;
pub use progress::{Progress, ProgressReceiver, ProgressSender};
pub use sheet::{Sheet, SheetMeta};
pub use sheet_assembler::assemble_sheet;
pub use sheet_name::{sanitize_sheet_name, SanitizeStrategy};
pub use style::{CellStyle, SheetStyle, StyleRegister};
pub use workbook::Workbook;
