//! Top-level `Workbook` build (spec §4.11): owns sheets for one build,
//! drives the directory skeleton, sheet assembly, the seven/eight global
//! parts, and the ZIP writer, emitting `Progress` events throughout.

use crate::error::{Result, SheetcraftError};
use crate::logger::{Logger, NullLogger};
use crate::here;
use crate::package::{self, DocumentProperties};
use crate::progress::{Progress, ProgressSender};
use crate::shared_strings::SharedStringRegister;
use crate::sheet::{Sheet, SheetMeta};
use crate::sheet_assembler::assemble_sheet;
use crate::style::StyleRegister;
use crate::zip::{CompressionMethod, ZipWriter};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Normalizes the caller's output path: keep a `.xlsx` extension, replace
/// any other extension, or append one if there is none (spec §4.11 "Path
/// normalization").
fn normalize_output_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => path.to_path_buf(),
        _ => path.with_extension("xlsx"),
    }
}

fn temp_dir_for(final_path: &Path) -> PathBuf {
    let stem = final_path.file_stem().unwrap_or_default().to_string_lossy();
    let suffix = format!("{stem}.temp");
    match final_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(suffix),
        _ => PathBuf::from(suffix),
    }
}

/// Owns every `Sheet` for one build. Registries live only for the
/// duration of `build` (spec §3 "Lifecycle").
pub struct Workbook<Record> {
    sheets: Vec<Sheet<Record>>,
    document_properties: DocumentProperties,
    logger: Box<dyn Logger>,
}

impl<Record> Workbook<Record> {
    pub fn new() -> Self {
        Workbook {
            sheets: Vec::new(),
            document_properties: DocumentProperties::default(),
            logger: Box::new(NullLogger::default()),
        }
    }

    pub fn with_sheet(mut self, sheet: Sheet<Record>) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn with_document_properties(mut self, props: DocumentProperties) -> Self {
        self.document_properties = props;
        self
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    fn create_skeleton(temp_dir: &Path) -> Result<()> {
        fs::create_dir_all(temp_dir.join("_rels"))?;
        fs::create_dir_all(temp_dir.join("xl/_rels"))?;
        fs::create_dir_all(temp_dir.join("xl/worksheets"))?;
        fs::create_dir_all(temp_dir.join("docProps"))?;
        Ok(())
    }

    fn zip_directory(temp_dir: &Path, final_path: &Path, sheets: &[SheetMeta]) -> Result<()> {
        let file = File::create(final_path)?;
        let mut zip = ZipWriter::new(BufWriter::with_capacity(64 * 1024, file));

        let mut ordered_entries: Vec<String> = vec![
            "[Content_Types].xml".to_string(),
            "_rels/.rels".to_string(),
            "xl/workbook.xml".to_string(),
            "xl/_rels/workbook.xml.rels".to_string(),
            "xl/styles.xml".to_string(),
            "xl/sharedStrings.xml".to_string(),
            "docProps/core.xml".to_string(),
            "docProps/app.xml".to_string(),
        ];
        for sheet in sheets {
            ordered_entries.push(sheet.file_path.clone());
        }

        for entry in &ordered_entries {
            let data = fs::read(temp_dir.join(entry))?;
            zip.add_entry(entry, &data, CompressionMethod::Deflated)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Runs the full spec §4.11 build algorithm, loading each sheet's
    /// data synchronously. Emits progress on `progress` throughout;
    /// `Failed` is emitted (and the error returned) on any failure.
    pub fn build(mut self, output_path: impl AsRef<Path>, progress: ProgressSender) -> Result<PathBuf> {
        match self.build_inner(output_path.as_ref(), &progress) {
            Ok(path) => {
                progress.emit(Progress::Completed);
                Ok(path)
            }
            Err(err) => {
                progress.emit(Progress::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Same as [`Workbook::build`] but awaits each sheet's async data
    /// provider (falling back to its sync provider if only that was set).
    pub async fn build_async(mut self, output_path: impl AsRef<Path>, progress: ProgressSender) -> Result<PathBuf> {
        for sheet in &mut self.sheets {
            sheet.load_data_async().await;
        }
        match self.build_inner(output_path.as_ref(), &progress) {
            Ok(path) => {
                progress.emit(Progress::Completed);
                Ok(path)
            }
            Err(err) => {
                progress.emit(Progress::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    fn build_inner(&mut self, output_path: &Path, progress: &ProgressSender) -> Result<PathBuf> {
        progress.emit(Progress::Started);

        if self.sheets.is_empty() {
            return Err(SheetcraftError::EmptyWorkbook);
        }

        let final_path = normalize_output_path(output_path);
        let temp_dir = temp_dir_for(&final_path);

        progress.emit(Progress::CreatingDirectory);
        Self::create_skeleton(&temp_dir)?;

        let total_sheets = self.sheets.len() as u32;
        progress.emit(Progress::ProcessingSheets(total_sheets));

        let mut shared_strings = SharedStringRegister::new();
        let mut styles = StyleRegister::new();
        let mut sheet_metas = Vec::with_capacity(self.sheets.len());

        for (i, sheet) in self.sheets.iter_mut().enumerate() {
            sheet.load_data();
            let sheet_id = i as u32 + 1;
            progress.emit(Progress::ProcessingSheet(i as u32, total_sheets, sheet.name.clone()));

            let sheet_path = temp_dir.join(format!("xl/worksheets/sheet{sheet_id}.xml"));
            let mut file = BufWriter::new(File::create(&sheet_path)?);
            let meta = assemble_sheet(sheet, sheet_id, &mut shared_strings, &mut styles, &mut file)?;
            self.logger.debug(&format!("assembled {}", meta.file_path), here!());
            sheet_metas.push(meta);
        }
        progress.emit(Progress::SheetsCompleted(total_sheets));

        progress.emit(Progress::GeneratingGlobalFiles);

        progress.emit(Progress::GeneratingContentTypes);
        let mut f = File::create(temp_dir.join("[Content_Types].xml"))?;
        package::write_content_types(&mut f, &sheet_metas)?;

        progress.emit(Progress::GeneratingRootRelationships);
        let mut f = File::create(temp_dir.join("_rels/.rels"))?;
        package::write_root_rels(&mut f)?;

        progress.emit(Progress::GeneratingWorkbook);
        let mut f = File::create(temp_dir.join("xl/workbook.xml"))?;
        package::write_workbook_xml(&mut f, &sheet_metas)?;

        progress.emit(Progress::GeneratingWorkbookRelationships);
        let mut f = File::create(temp_dir.join("xl/_rels/workbook.xml.rels"))?;
        package::write_workbook_rels(&mut f, &sheet_metas)?;

        progress.emit(Progress::GeneratingStyles);
        let mut f = File::create(temp_dir.join("xl/styles.xml"))?;
        styles.write_xml(&mut crate::xml_writer::XmlWriter::new(&mut f))?;

        progress.emit(Progress::GeneratingSharedStrings);
        let mut f = File::create(temp_dir.join("xl/sharedStrings.xml"))?;
        shared_strings.write_xml(&mut crate::xml_writer::XmlWriter::new(&mut f))?;

        progress.emit(Progress::GeneratingCoreProperties);
        let mut f = File::create(temp_dir.join("docProps/core.xml"))?;
        package::write_core_properties(&mut f, &self.document_properties)?;

        progress.emit(Progress::GeneratingAppProperties);
        let mut f = File::create(temp_dir.join("docProps/app.xml"))?;
        package::write_app_properties(&mut f, &self.document_properties, total_sheets)?;

        progress.emit(Progress::PreparingPackage);
        Self::zip_directory(&temp_dir, &final_path, &sheet_metas)?;

        progress.emit(Progress::CleaningUp);
        fs::remove_dir_all(&temp_dir)?;

        Ok(final_path)
    }
}

impl<Record> Default for Workbook<Record> {
    fn default() -> Self {
        Self::new()
    }
}
