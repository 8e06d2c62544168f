use crate::navigate::instruction::Instruction;
use crate::navigate::occupancy::OccupancyVector;
use crate::navigate::Navigator;
use anyhow::{Context, Result};
use hashbrown::HashMap;
use log::{debug, info, warn};
use safestep_inference::{DetectionFrame, DetectionSource};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::io::Write;
use tokio::sync::mpsc;

/// Frames buffered between the detection source and the decision loop.
pub const FRAME_QUEUE_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One instruction per line.
    #[default]
    Text,
    /// One JSON report per line.
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub width: u32,
    pub height: u32,
    pub occupancy: OccupancyVector,
    pub instruction: Instruction,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub skipped: u64,
    pub interrupted: bool,
    pub instructions: HashMap<Instruction, u64>,
}

impl RunSummary {
    pub fn count(&self, instruction: Instruction) -> u64 {
        self.instructions.get(&instruction).copied().unwrap_or(0)
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed {} frames ({} skipped)",
            self.frames, self.skipped
        )?;
        for instruction in Instruction::ALL {
            let count = self.count(instruction);
            if count > 0 {
                write!(f, ", {}: {}", instruction, count)?;
            }
        }
        if self.interrupted {
            write!(f, ", interrupted")?;
        }
        Ok(())
    }
}

pub fn write_report(out: &mut impl Write, report: &FrameReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", report.instruction)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Decides every frame the source yields and hands each report to `sink`.
///
/// The source is drained on its own thread. The loop ends at end of input, on
/// the first source or sink error, or on Ctrl-C.
pub async fn run<S, F>(source: S, navigator: &Navigator, mut sink: F) -> Result<RunSummary>
where
    S: DetectionSource + Send + 'static,
    F: FnMut(&FrameReport) -> Result<()>,
{
    let (tx, mut rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
    std::thread::Builder::new()
        .name("detection-source".to_string())
        .spawn(move || read_frames(source, tx))
        .context("Failed to start detection source thread")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(shutdown);

    let mut summary = RunSummary::default();
    let mut index = 0u64;
    loop {
        let next = tokio::select! {
            next = rx.recv() => next,
            _ = &mut shutdown => {
                info!("Interrupted, stopping");
                summary.interrupted = true;
                break;
            }
        };
        let Some(frame) = next else {
            break;
        };
        let frame = frame?;
        index += 1;

        if frame.width == 0 || frame.height == 0 {
            warn!(
                "Skipping frame {} with empty size {}x{}",
                index, frame.width, frame.height
            );
            summary.skipped += 1;
            continue;
        }

        let navigation = navigator.navigate(&frame);
        let report = FrameReport {
            frame: index,
            width: frame.width,
            height: frame.height,
            occupancy: navigation.occupancy,
            instruction: navigation.instruction,
        };
        sink(&report).with_context(|| format!("Failed to emit report for frame {index}"))?;

        summary.frames += 1;
        *summary.instructions.entry(report.instruction).or_insert(0) += 1;
    }

    info!("{summary}");
    Ok(summary)
}

fn read_frames<S: DetectionSource>(mut source: S, tx: mpsc::Sender<Result<DetectionFrame>>) {
    loop {
        let next = match source.next_frame() {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => break,
            Err(e) => Err(e),
        };
        let failed = next.is_err();
        if tx.blocking_send(next).is_err() || failed {
            break;
        }
    }
    debug!("Detection source closed");
}
