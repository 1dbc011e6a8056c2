//! System clipboard image writes via clipboard-rs.
//!
//! The writer places the platform bitmap representation first and a PNG
//! buffer as a secondary representation; a failure to produce the secondary
//! form is a logged side effect, not an operation failure. Prior clipboard
//! contents are overwritten with no restore guarantee.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContent, ClipboardContext, RustImageData};
use image::GenericImageView;
use log::{debug, warn};

use crate::error::{AppError, Result};
use crate::interface::ClipboardImageWriter;

pub struct SystemClipboardWriter {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl SystemClipboardWriter {
    /// Open a clipboard context. Fails with `Unsupported` when the platform
    /// clipboard capability is unavailable (e.g. a headless session).
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new().map_err(|e| {
            AppError::unsupported(format!("failed to create clipboard context: {}", e))
        })?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
        })
    }
}

impl ClipboardImageWriter for SystemClipboardWriter {
    fn copy_image(&self, path: &Path) -> Result<()> {
        let bytes = read_image_bytes(path)?;

        let image = RustImageData::from_bytes(&bytes)
            .map_err(|e| AppError::decode(format!("{:?}: {}", path, e)))?;

        let mut contents = vec![ClipboardContent::Image(image)];

        // Secondary lossless representation, best effort
        match RustImageData::from_bytes(&bytes).and_then(|img| img.to_png()) {
            Ok(png) => {
                contents.push(ClipboardContent::Other(
                    "image/png".to_string(),
                    png.get_bytes().to_vec(),
                ));
            }
            Err(e) => warn!("PNG representation unavailable for {:?}: {}", path, e),
        }

        let ctx = self.inner.lock().unwrap();
        if let Err(e) = ctx.set(contents) {
            // Some paste targets reject multi-representation writes; retry
            // with the bitmap alone before giving up.
            warn!("Multi-representation clipboard write failed: {}", e);
            let image = RustImageData::from_bytes(&bytes)
                .map_err(|e| AppError::decode(format!("{:?}: {}", path, e)))?;
            ctx.set_image(image)
                .map_err(|e| AppError::internal(format!("clipboard write failed: {}", e)))?;
        }

        debug!("Copied {:?} to clipboard", path);
        Ok(())
    }
}

/// Read and validate an image file.
///
/// Fails with `NotFound` for a missing file and `Decode` for bytes the
/// image crate cannot interpret.
fn read_image_bytes(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(AppError::not_found(format!("{:?}", path)));
    }

    let bytes = fs::read(path)?;
    let decoded = image::load_from_memory(&bytes)?;
    let (width, height) = decoded.dimensions();
    debug!(
        "Image {:?}: {} x {}",
        path.file_name().unwrap_or_default(),
        width,
        height
    );

    Ok(bytes)
}
