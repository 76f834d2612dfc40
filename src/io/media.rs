// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading.
//!
//! Images are fetched and decoded on a background thread. Each request gets
//! a [`LoadToken`]; starting a new request supersedes the previous one, so a
//! slow load for an image the user already navigated away from can never
//! replace the texture of the current image.

use crate::error::{MaskError, MaskResult};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Result delivered for the current request.
#[derive(Debug)]
pub struct LoadOutcome {
    pub token: LoadToken,
    pub result: MaskResult<DecodedImage>,
}

/// Reject files whose extension is not a known image format.
pub fn ensure_image(path: &Path) -> MaskResult<()> {
    image::ImageFormat::from_path(path)
        .map(|_| ())
        .map_err(|_| MaskError::NotAnImage(path.display().to_string()))
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_image(name: &str, bytes: &[u8]) -> MaskResult<DecodedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| MaskError::ImageLoad {
        filename: name.to_string(),
        reason: e.to_string(),
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidDimensions { width, height });
    }
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Background loader holding at most one live request.
#[derive(Debug, Default)]
pub struct ImageLoader {
    generation: Arc<AtomicU64>,
    receiver: Option<Receiver<LoadOutcome>>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `name` using `fetch` to obtain the encoded bytes.
    ///
    /// Any previous request is superseded.
    pub fn request<F>(&mut self, name: impl Into<String>, fetch: F) -> LoadToken
    where
        F: FnOnce() -> MaskResult<Vec<u8>> + Send + 'static,
    {
        let token = LoadToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        let generation = Arc::clone(&self.generation);
        let name = name.into();

        let (sender, receiver) = channel();
        self.receiver = Some(receiver);

        std::thread::spawn(move || {
            let is_current = || generation.load(Ordering::SeqCst) == token.0;

            let result = fetch().and_then(|bytes| {
                if !is_current() {
                    // Superseded while fetching; skip the decode.
                    return Err(MaskError::ImageLoad {
                        filename: name.clone(),
                        reason: "superseded".to_string(),
                    });
                }
                decode_image(&name, &bytes)
            });

            if is_current() {
                match &result {
                    Ok(img) => log::info!("Loaded image: {} ({}x{})", name, img.width, img.height),
                    Err(e) => log::error!("{}", e),
                }
                let _ = sender.send(LoadOutcome { token, result });
            } else {
                log::debug!("Dropping stale load of {}", name);
            }
        });

        token
    }

    /// Abandon the current request.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.receiver = None;
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.is_some()
    }

    /// Non-blocking check for the current request's result.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(outcome) => {
                self.receiver = None;
                let current = LoadToken(self.generation.load(Ordering::SeqCst));
                (outcome.token == current).then_some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    fn wait_for(loader: &mut ImageLoader) -> Option<LoadOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(outcome) = loader.poll() {
                return Some(outcome);
            }
            if !loader.is_loading() {
                return None;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_ensure_image_by_extension() {
        assert!(ensure_image(Path::new("scan.PNG")).is_ok());
        assert!(ensure_image(Path::new("photo.jpeg")).is_ok());
        assert!(matches!(
            ensure_image(Path::new("notes.txt")),
            Err(MaskError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image("a.png", &png_bytes(4, 3)).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.pixels.len(), 4 * 3 * 4);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_image("bad.png", b"not an image"),
            Err(MaskError::ImageLoad { .. })
        ));
    }

    #[test]
    fn test_load_delivers_current_result() {
        let mut loader = ImageLoader::new();
        let bytes = png_bytes(2, 2);
        let token = loader.request("a.png", move || Ok(bytes));
        let outcome = wait_for(&mut loader).expect("load result");
        assert_eq!(outcome.token, token);
        assert_eq!(outcome.result.unwrap().width, 2);
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_superseded_load_is_dropped() {
        let mut loader = ImageLoader::new();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let slow = png_bytes(8, 8);
        loader.request("slow.png", move || {
            let _ = gate_rx.recv();
            Ok(slow)
        });

        let fast = png_bytes(3, 3);
        let token = loader.request("fast.png", move || Ok(fast));
        let outcome = wait_for(&mut loader).expect("fast result");
        assert_eq!(outcome.token, token);
        assert_eq!(outcome.result.unwrap().width, 3);

        gate_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_cancel_discards_result() {
        let mut loader = ImageLoader::new();
        let bytes = png_bytes(2, 2);
        loader.request("a.png", move || Ok(bytes));
        loader.cancel();
        assert!(!loader.is_loading());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_fetch_error_reported() {
        let mut loader = ImageLoader::new();
        loader.request("missing.png", || Err(MaskError::Backend("HTTP error! status: 404".to_string())));
        let outcome = wait_for(&mut loader).expect("error result");
        assert!(matches!(outcome.result, Err(MaskError::Backend(_))));
    }
}
