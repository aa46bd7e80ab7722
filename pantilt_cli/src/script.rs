//! Detection scripts: CSV replay input for the simulated detector.
//!
//! Header `frame,x,y,width,height`, one row per moving region. Frame numbers
//! start at 0 and must not decrease; frames with no rows are still frames. A
//! row with only a frame number and empty region fields marks a still frame,
//! which is how a script extends past its last detection.

use pantilt_hardware::SimFrame;
use pantilt_traits::Rect;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ScriptRow {
    frame: u64,
    x: Option<i32>,
    y: Option<i32>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Hard cap on script length, guarding against a typo'd frame number.
const MAX_FRAMES: u64 = 1_000_000;

pub fn load_script(path: &Path) -> eyre::Result<Vec<SimFrame>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open detection script {:?}: {}", path, e))?;
    parse_script(rdr)
}

fn parse_script<R: std::io::Read>(mut rdr: csv::Reader<R>) -> eyre::Result<Vec<SimFrame>> {
    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read script headers: {}", e))?
        .clone();
    let expected = ["frame", "x", "y", "width", "height"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "detection script must have headers 'frame,x,y,width,height', got: {}",
            actual.join(",")
        );
    }

    let mut frames: Vec<SimFrame> = Vec::new();
    let mut last: Option<u64> = None;
    for (idx, rec) in rdr.deserialize::<ScriptRow>().enumerate() {
        let line = idx + 2;
        let row = rec.map_err(|e| eyre::eyre!("invalid script row {}: {}", line, e))?;
        if row.frame >= MAX_FRAMES {
            eyre::bail!("script row {line}: frame {} exceeds {MAX_FRAMES}", row.frame);
        }
        if let Some(prev) = last
            && row.frame < prev
        {
            eyre::bail!("script row {line}: frame {} after frame {prev}", row.frame);
        }
        last = Some(row.frame);

        // Frame numbers are bounded above, so this fits in usize.
        let wanted = usize::try_from(row.frame + 1).unwrap_or(usize::MAX);
        if frames.len() < wanted {
            frames.resize_with(wanted, SimFrame::still);
        }
        match (row.x, row.y, row.width, row.height) {
            (Some(x), Some(y), Some(w), Some(h)) => {
                if let Some(f) = frames.last_mut() {
                    f.regions.push(Rect::new(x, y, w, h));
                }
            }
            (None, None, None, None) => {}
            _ => eyre::bail!("script row {line}: region needs all of x, y, width, height"),
        }
    }
    Ok(frames)
}
