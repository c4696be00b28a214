use std::path::Path;

use gridocr::imaging::load_binarized;
use gridocr::{GridSettings, PixBox, page_geometry};

use crate::cli::GridFormat;

pub fn run(image: &Path, format: GridFormat) -> Result<(), i32> {
    let page = load_binarized(image).map_err(|e| {
        eprintln!("Error reading {}: {e}", image.display());
        1
    })?;
    let geometry = page_geometry(&page, &GridSettings::default());

    match format {
        GridFormat::Text => {
            for (i, block) in geometry.blocks.iter().enumerate() {
                let b = &block.bbox;
                println!(
                    "block {i}: ({},{})-({},{}) {} hlines, {} vlines, {} rows x {} cols",
                    b.x1,
                    b.y1,
                    b.x2,
                    b.y2,
                    block.hlines.len(),
                    block.vlines.len(),
                    block.rows.len(),
                    block.cols.len()
                );
                for row in &block.rows {
                    println!("  row: ({},{})-({},{})", row.x1, row.y1, row.x2, row.y2);
                }
                for col in &block.cols {
                    println!("  col: ({},{})-({},{})", col.x1, col.y1, col.x2, col.y2);
                }
            }
            if geometry.blocks.is_empty() {
                println!("no blocks detected");
            }
        }
        GridFormat::Json => {
            let blocks: Vec<serde_json::Value> = geometry
                .blocks
                .iter()
                .map(|block| {
                    serde_json::json!({
                        "bbox": box_json(&block.bbox),
                        "hlines": block.hlines.iter().map(box_json).collect::<Vec<_>>(),
                        "vlines": block.vlines.iter().map(box_json).collect::<Vec<_>>(),
                        "rows": block.rows.iter().map(box_json).collect::<Vec<_>>(),
                        "cols": block.cols.iter().map(box_json).collect::<Vec<_>>(),
                    })
                })
                .collect();
            let obj = serde_json::json!({ "blocks": blocks });
            println!("{}", serde_json::to_string(&obj).unwrap());
        }
    }
    Ok(())
}

fn box_json(b: &PixBox) -> serde_json::Value {
    serde_json::json!({ "x1": b.x1, "y1": b.y1, "x2": b.x2, "y2": b.y2 })
}
