//! Progress-reporting state machine (spec §4.10): a monotone stream of
//! build-phase events over an unbounded SPSC channel. Grounded on
//! `tokio::sync::mpsc::unbounded_channel` for the "drops by the consumer
//! must not stall the producer" requirement (spec §9).

use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};

/// One phase-transition event. Each non-terminal variant corresponds to
/// a fixed completion fraction; `ProcessingSheet` interpolates within
/// `[0.10, 0.30]`.
#[derive(Debug, Clone)]
pub enum Progress {
    Started,
    CreatingDirectory,
    ProcessingSheets(u32),
    ProcessingSheet(u32, u32, String),
    SheetsCompleted(u32),
    GeneratingGlobalFiles,
    GeneratingContentTypes,
    GeneratingRootRelationships,
    GeneratingWorkbook,
    GeneratingWorkbookRelationships,
    GeneratingStyles,
    GeneratingSharedStrings,
    GeneratingCoreProperties,
    GeneratingAppProperties,
    PreparingPackage,
    CleaningUp,
    Completed,
    Failed(String),
}

impl Progress {
    /// The fraction this event represents, per the spec §4.10 table.
    pub fn fraction(&self) -> f64 {
        match self {
            Progress::Started => 0.00,
            Progress::CreatingDirectory => 0.05,
            Progress::ProcessingSheets(_) => 0.10,
            Progress::ProcessingSheet(index, total, _) => {
                if *total == 0 {
                    0.10
                } else {
                    let t = (*index as f64) / (*total as f64);
                    0.10 + t * (0.30 - 0.10)
                }
            }
            Progress::SheetsCompleted(_) => 0.30,
            Progress::GeneratingGlobalFiles => 0.35,
            Progress::GeneratingContentTypes => 0.40,
            Progress::GeneratingRootRelationships => 0.45,
            Progress::GeneratingWorkbook => 0.50,
            Progress::GeneratingWorkbookRelationships => 0.55,
            Progress::GeneratingStyles => 0.60,
            Progress::GeneratingSharedStrings => 0.65,
            Progress::GeneratingCoreProperties => 0.70,
            Progress::GeneratingAppProperties => 0.75,
            Progress::PreparingPackage => 0.85,
            Progress::CleaningUp => 0.95,
            Progress::Completed => 1.00,
            Progress::Failed(_) => 0.00,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Progress::Completed | Progress::Failed(_))
    }
}

/// Producer handle. Cloning is cheap; sends after the receiver drops are
/// silently discarded (no back-pressure, per spec §4.10 cancellation).
#[derive(Clone)]
pub struct ProgressSender {
    inner: UnboundedSender<Progress>,
}

impl ProgressSender {
    pub fn emit(&self, event: Progress) {
        let _: Result<(), SendError<Progress>> = self.inner.send(event);
    }
}

pub type ProgressReceiver = UnboundedReceiver<Progress>;

/// Builds a fresh SPSC progress channel.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { inner: tx }, rx)
}
