use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("gridocr").unwrap()
}

/// Write a 400x600 page with a fully-ruled 2x2 table as a PNG.
fn write_ruled_page(path: &Path) {
    let img = GrayImage::from_fn(400, 600, |x, y| {
        let in_table_y = (100..500).contains(&y);
        let in_table_x = (20..383).contains(&x);
        let vline = in_table_y && [20u32, 200, 380].iter().any(|&v| (v..v + 3).contains(&x));
        let hline = in_table_x && [100u32, 300, 497].iter().any(|&h| (h..h + 3).contains(&y));
        if vline || hline { Luma([0u8]) } else { Luma([255u8]) }
    });
    img.save(path).unwrap();
}

#[test]
fn grid_reports_detected_geometry_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("page.png");
    write_ruled_page(&png);

    cmd()
        .arg("grid")
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("block 0:"))
        .stdout(predicate::str::contains("3 hlines, 3 vlines"))
        .stdout(predicate::str::contains("2 rows x 2 cols"));
}

#[test]
fn grid_json_output_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("page.png");
    write_ruled_page(&png);

    let output = cmd()
        .arg("grid")
        .arg(&png)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let blocks = parsed["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(blocks[0]["cols"].as_array().unwrap().len(), 2);
    assert_eq!(blocks[0]["bbox"]["x1"], 20);
}

#[test]
fn grid_reports_blank_page() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("blank.png");
    GrayImage::from_pixel(200, 200, Luma([255u8])).save(&png).unwrap();

    cmd()
        .arg("grid")
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("no blocks detected"));
}
