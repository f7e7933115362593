//! Run the region readers on a saved crop:
//! `cargo run -p xchg-ocr --bin test_ocr -- <image.png> [ratio|box] [fast|full]`

use anyhow::{Context, Result, bail};
use xchg_ocr::{OcrEngine, ScanMode, TesseractEngine, preprocess, read_box, read_ratio};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: test_ocr <image.png> [ratio|box] [fast|full]");
    };
    let kind = args.next().unwrap_or_else(|| "ratio".to_string());
    let mode = match args.next().as_deref() {
        Some("fast") => ScanMode::Fast,
        _ => ScanMode::Full,
    };

    let engine = TesseractEngine::locate(std::env::var("TESSERACT_PATH").ok().as_deref(), "eng");
    let version = engine.check().await.context("OCR engine check failed")?;
    println!("engine: {version} ({})", engine.program().display());

    let image = image::open(&path).with_context(|| format!("Failed to open {path}"))?;
    let gray = preprocess::to_gray(&image.to_rgba8());

    let start = std::time::Instant::now();
    match kind.as_str() {
        "ratio" => {
            let (ratio, text) = read_ratio(&engine, &gray, mode).await?;
            println!("ratio: {ratio:?}");
            println!("text:  {text:?}");
        }
        "box" => {
            let (value, text) = read_box(&engine, &gray, mode).await?;
            println!("value: {value:?}");
            println!("text:  {text:?}");
        }
        other => bail!("unknown region kind '{other}', expected ratio or box"),
    }
    println!("{mode:?} pass took {:?}", start.elapsed());
    Ok(())
}
