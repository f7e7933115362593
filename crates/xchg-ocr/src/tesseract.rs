use std::path::{Path, PathBuf};
use std::process::Stdio;

use image::GrayImage;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::engine::{GlyphBox, OcrEngine, PageProfile, encode_png};
use crate::error::OcrError;

/// Default install locations checked when no explicit path is configured
const WINDOWS_INSTALL_PATHS: [&str; 2] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

/// Drives the `tesseract` command line tool, piping PNG on stdin
pub struct TesseractEngine {
    program: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }

    /// Pick the executable: explicit path, then the default install
    /// locations, then whatever `tesseract` resolves to on PATH
    pub fn locate(explicit: Option<&str>, language: &str) -> Self {
        let candidates = explicit
            .into_iter()
            .chain(WINDOWS_INSTALL_PATHS)
            .map(Path::new);

        for candidate in candidates {
            if candidate.exists() {
                tracing::debug!("Using tesseract at {}", candidate.display());
                return Self::new(candidate, language);
            }
        }

        if let Some(path) = explicit {
            tracing::warn!("Configured tesseract path {path} does not exist, falling back to PATH");
        }
        Self::new("tesseract", language)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn run(
        &self,
        image: &GrayImage,
        profile: &PageProfile,
        trailing: &[&str],
    ) -> Result<String, OcrError> {
        let png = encode_png(image)?;

        let mut child = Command::new(&self.program)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .args(profile.tesseract_args())
            .args(trailing)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, e: std::io::Error) -> OcrError {
        if e.kind() == std::io::ErrorKind::NotFound {
            OcrError::EngineMissing(format!(
                "Tesseract OCR not found at '{}'. Install it or set TESSERACT_PATH.",
                self.program.display()
            ))
        } else {
            OcrError::Io(e)
        }
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn check(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(OcrError::EngineMissing(format!(
                "'{} --version' exited with {}",
                self.program.display(),
                output.status
            )));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let banner = String::from_utf8_lossy(&banner);
        Ok(banner.lines().next().unwrap_or("tesseract").trim().to_string())
    }

    async fn recognize(
        &self,
        image: &GrayImage,
        profile: &PageProfile,
    ) -> Result<String, OcrError> {
        self.run(image, profile, &[]).await
    }

    async fn recognize_glyphs(
        &self,
        image: &GrayImage,
        profile: &PageProfile,
    ) -> Result<Vec<GlyphBox>, OcrError> {
        let text = self.run(image, profile, &["makebox"]).await?;
        Ok(parse_box_output(&text))
    }
}

/// Parse tesseract box output: `<char> <x1> <y1> <x2> <y2> <page>` per line
pub fn parse_box_output(text: &str) -> Vec<GlyphBox> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let mut chars = parts.next()?.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            let x1 = parts.next()?.parse().ok()?;
            let y1 = parts.next()?.parse().ok()?;
            let x2 = parts.next()?.parse().ok()?;
            let y2 = parts.next()?.parse().ok()?;
            Some(GlyphBox { ch, x1, y1, x2, y2 })
        })
        .collect()
}
