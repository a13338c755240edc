//! `Sheet<Record>` (spec §3): columns, style, and the sync/async data
//! provider a build loads exactly once.

use crate::column::AnyColumn;
use crate::style::SheetStyle;
use std::future::Future;
use std::pin::Pin;

type SyncProvider<Record> = Box<dyn Fn() -> Vec<Record> + Send + Sync>;
type AsyncProvider<Record> =
    Box<dyn Fn() -> Pin<Box<dyn Future<Output = Vec<Record>> + Send>> + Send + Sync>;

/// Either a sync or async record source; setting one clears the other
/// (spec §9 "Async data provider").
enum DataProvider<Record> {
    None,
    Sync(SyncProvider<Record>),
    Async(AsyncProvider<Record>),
}

/// One worksheet definition: name, header flag, style, column list, and
/// exactly one data source. `load_data`/`load_data_async` populate
/// `loaded_data` once; after that the sheet is immutable for the
/// remainder of the build (spec §3 "single-writer").
pub struct Sheet<Record> {
    pub name: String,
    pub has_header: bool,
    pub style: SheetStyle,
    pub columns: Vec<AnyColumn<Record>>,
    provider: DataProvider<Record>,
    loaded_data: Option<Vec<Record>>,
}

impl<Record> Sheet<Record> {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            has_header: true,
            style: SheetStyle::default(),
            columns: Vec::new(),
            provider: DataProvider::None,
            loaded_data: None,
        }
    }

    pub fn with_column(mut self, column: AnyColumn<Record>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_style(mut self, style: SheetStyle) -> Self {
        self.style = style;
        self
    }

    /// Installs a synchronous provider, clearing any async provider set
    /// previously.
    pub fn set_data_provider(&mut self, provider: impl Fn() -> Vec<Record> + Send + Sync + 'static) {
        self.provider = DataProvider::Sync(Box::new(provider));
    }

    /// Installs an asynchronous provider, clearing any sync provider set
    /// previously.
    pub fn set_data_provider_async<F>(&mut self, provider: impl Fn() -> F + Send + Sync + 'static)
    where
        F: Future<Output = Vec<Record>> + Send + 'static,
    {
        self.provider = DataProvider::Async(Box::new(move || Box::pin(provider())));
    }

    /// Loads `loaded_data` once via the sync provider (or an empty vector
    /// if none was set). No-op if already loaded.
    pub fn load_data(&mut self) {
        if self.loaded_data.is_some() {
            return;
        }
        let data = match &self.provider {
            DataProvider::Sync(f) => f(),
            DataProvider::None | DataProvider::Async(_) => Vec::new(),
        };
        self.loaded_data = Some(data);
    }

    /// Loads `loaded_data` once via the async provider. Falls back to the
    /// sync provider if only that was set (spec §9), and to an empty
    /// vector if neither was set. No-op if already loaded.
    pub async fn load_data_async(&mut self) {
        if self.loaded_data.is_some() {
            return;
        }
        let data = match &self.provider {
            DataProvider::Async(f) => f().await,
            DataProvider::Sync(f) => f(),
            DataProvider::None => Vec::new(),
        };
        self.loaded_data = Some(data);
    }

    pub fn loaded_data(&self) -> &[Record] {
        self.loaded_data.as_deref().unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_data.is_some()
    }
}

/// Final, immutable descriptor handed to the package assembler once a
/// sheet's XML has been emitted (spec §3).
#[derive(Debug, Clone)]
pub struct SheetMeta {
    pub name: String,
    pub sheet_id: u32,
    pub relationship_id: String,
    pub has_header: bool,
    pub data_row_count: u32,
    pub active_column_count: u32,
    pub data_range: Option<DataRange>,
    pub tab_color_rgb: Option<String>,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl SheetMeta {
    pub fn new(name: impl Into<String>, sheet_id: u32, has_header: bool) -> Self {
        SheetMeta {
            name: name.into(),
            sheet_id,
            relationship_id: format!("rId{sheet_id}"),
            has_header,
            data_row_count: 0,
            active_column_count: 0,
            data_range: None,
            tab_color_rgb: None,
            file_path: format!("xl/worksheets/sheet{sheet_id}.xml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_data_uses_sync_provider_once() {
        let mut sheet: Sheet<i32> = Sheet::new("Nums");
        sheet.set_data_provider(|| vec![1, 2, 3]);
        sheet.load_data();
        assert_eq!(sheet.loaded_data(), &[1, 2, 3]);
        sheet.set_data_provider(|| vec![9]);
        sheet.load_data();
        assert_eq!(sheet.loaded_data(), &[1, 2, 3], "load_data is single-writer");
    }

    #[test]
    fn no_provider_yields_empty_vector() {
        let mut sheet: Sheet<i32> = Sheet::new("Empty");
        sheet.load_data();
        assert!(sheet.loaded_data().is_empty());
    }

    #[tokio::test]
    async fn async_load_falls_back_to_sync_provider() {
        let mut sheet: Sheet<i32> = Sheet::new("Nums");
        sheet.set_data_provider(|| vec![7, 8]);
        sheet.load_data_async().await;
        assert_eq!(sheet.loaded_data(), &[7, 8]);
    }

    #[tokio::test]
    async fn async_provider_is_awaited() {
        let mut sheet: Sheet<i32> = Sheet::new("Nums");
        sheet.set_data_provider_async(|| async { vec![42] });
        sheet.load_data_async().await;
        assert_eq!(sheet.loaded_data(), &[42]);
    }

    #[test]
    fn sheet_meta_derives_relationship_and_path() {
        let meta = SheetMeta::new("Sheet1", 2, true);
        assert_eq!(meta.relationship_id, "rId2");
        assert_eq!(meta.file_path, "xl/worksheets/sheet2.xml");
    }
}
