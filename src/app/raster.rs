//! Index raster loading: fetch (network or disk), decode, hand over once

use super::App;
use crate::utils::is_remote;
use eframe::egui;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Upper bound on the buffer reserved up front from a Content-Length header
const MAX_PREALLOC: u64 = 64 << 20;

/// Decoded raster, ready for texture upload
pub(crate) struct DecodedRaster {
    /// Original pixel size; region coordinates refer to this
    pub natural: egui::Vec2,
    /// Possibly downscaled to fit the GPU's texture limit
    pub image: egui::ColorImage,
}

pub(crate) enum RasterEvent {
    Loaded(DecodedRaster),
    Failed(String),
}

/// Bytes received so far and expected total (0 when unknown)
#[derive(Default)]
pub(crate) struct RasterProgress {
    pub received: AtomicU64,
    pub total: AtomicU64,
}

impl RasterProgress {
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn fraction(&self) -> Option<f32> {
        let total = self.total.load(Ordering::Relaxed);
        (total > 0).then(|| {
            (self.received.load(Ordering::Relaxed) as f64 / total as f64).min(1.0) as f32
        })
    }
}

pub(crate) enum RasterState {
    NotStarted,
    Loading {
        rx: oneshot::Receiver<RasterEvent>,
        progress: Arc<RasterProgress>,
    },
    Ready(egui::TextureHandle),
    Failed(String),
}

/// Raster locator in precedence order: env override, settings override,
/// catalog default.
pub(crate) fn resolve_locator(env: Option<String>, setting: Option<&str>, catalog_default: &str) -> String {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| setting.map(str::to_string))
        .unwrap_or_else(|| catalog_default.to_string())
}

async fn fetch_remote(
    url: &str,
    progress: &RasterProgress,
    ctx: &egui::Context,
) -> Result<Vec<u8>, String> {
    let response = reqwest::get(url).await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let total = response.content_length().unwrap_or(0);
    progress.total.store(total, Ordering::Relaxed);
    let mut bytes = Vec::with_capacity(initial_capacity(total));
    let mut stream = response.bytes_stream();
    let mut last_repaint = Instant::now();

    while let Some(chunk) = stream.next().await {
        let data = chunk.map_err(|e| e.to_string())?;
        bytes.extend_from_slice(&data);
        progress.received.fetch_add(data.len() as u64, Ordering::Relaxed);
        if last_repaint.elapsed() >= Duration::from_millis(100) {
            ctx.request_repaint();
            last_repaint = Instant::now();
        }
    }
    Ok(bytes)
}

/// The header is untrusted: a huge or lying length must not size the buffer.
fn initial_capacity(content_length: u64) -> usize {
    content_length.min(MAX_PREALLOC) as usize
}

async fn fetch(locator: &str, progress: &RasterProgress, ctx: &egui::Context) -> Result<Vec<u8>, String> {
    if is_remote(locator) {
        fetch_remote(locator, progress, ctx).await
    } else {
        let bytes = tokio::fs::read(locator)
            .await
            .map_err(|e| format!("{locator}: {e}"))?;
        progress.total.store(bytes.len() as u64, Ordering::Relaxed);
        progress.received.store(bytes.len() as u64, Ordering::Relaxed);
        Ok(bytes)
    }
}

/// Decode and, if either side exceeds `max_side`, shrink the uploaded copy.
/// The reported natural size is always the source size.
pub(crate) fn decode(bytes: &[u8], max_side: usize) -> Result<DecodedRaster, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let natural = egui::vec2(img.width() as f32, img.height() as f32);

    let max_side = max_side.max(1) as u32;
    let img = if img.width() > max_side || img.height() > max_side {
        debug!(
            width = img.width(),
            height = img.height(),
            max_side,
            "Downscaling raster for texture upload"
        );
        img.resize(max_side, max_side, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedRaster {
        natural,
        image: egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()),
    })
}

impl App {
    /// Kick off the single raster load. Completion arrives through a
    /// one-shot channel polled by `poll_raster`.
    pub fn start_raster_load(&mut self, ctx: &egui::Context) {
        let Some(runtime) = self.runtime.as_ref() else {
            self.raster = RasterState::Failed("async runtime unavailable".into());
            return;
        };

        let (tx, rx) = oneshot::channel();
        let progress = Arc::new(RasterProgress::default());
        let locator = self.raster_locator.clone();
        let max_side = ctx.input(|i| i.max_texture_side);
        let task_progress = progress.clone();
        let ctx = ctx.clone();

        info!(locator = %locator, "Loading index raster");

        runtime.spawn(async move {
            let event = match fetch(&locator, &task_progress, &ctx).await {
                Ok(bytes) => {
                    match tokio::task::spawn_blocking(move || decode(&bytes, max_side)).await {
                        Ok(Ok(raster)) => RasterEvent::Loaded(raster),
                        Ok(Err(e)) => RasterEvent::Failed(format!("decode failed: {e}")),
                        Err(e) => RasterEvent::Failed(format!("decode task failed: {e}")),
                    }
                }
                Err(e) => RasterEvent::Failed(e),
            };
            if tx.send(event).is_err() {
                debug!("Raster receiver dropped before load finished");
            }
            ctx.request_repaint();
        });

        self.raster = RasterState::Loading { rx, progress };
    }

    /// Consume the load result exactly once, then drop the receiver.
    pub fn poll_raster(&mut self, ctx: &egui::Context) {
        let RasterState::Loading { rx, .. } = &mut self.raster else {
            return;
        };

        let event = match rx.try_recv() {
            Ok(event) => event,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                RasterEvent::Failed("raster loader stopped unexpectedly".into())
            }
        };

        match event {
            RasterEvent::Loaded(raster) => {
                let texture =
                    ctx.load_texture("index_raster", raster.image, egui::TextureOptions::LINEAR);
                self.session
                    .on_raster_loaded(raster.natural, None, &self.catalog);
                self.raster = RasterState::Ready(texture);
            }
            RasterEvent::Failed(msg) => {
                error!(locator = %self.raster_locator, error = %msg, "Index raster unavailable");
                self.raster = RasterState::Failed(msg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 20, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decode_reports_natural_size() {
        let raster = decode(&png(40, 30), 4096).unwrap();
        assert_eq!(raster.natural, egui::vec2(40.0, 30.0));
        assert_eq!(raster.image.size, [40, 30]);
    }

    #[test]
    fn oversized_raster_is_downscaled_but_keeps_natural_size() {
        let raster = decode(&png(200, 100), 50).unwrap();
        assert_eq!(raster.natural, egui::vec2(200.0, 100.0));
        assert_eq!(raster.image.size, [50, 25]);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode(b"definitely not an image", 4096).is_err());
    }

    #[test]
    fn locator_precedence() {
        assert_eq!(resolve_locator(Some("env.png".into()), Some("set.png"), "cat.png"), "env.png");
        assert_eq!(resolve_locator(Some("  ".into()), Some("set.png"), "cat.png"), "set.png");
        assert_eq!(resolve_locator(None, None, "cat.png"), "cat.png");
    }

    #[test]
    fn advertised_length_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(1024), 1024);
        assert_eq!(initial_capacity(100_000_000_000_000), MAX_PREALLOC as usize);
    }

    /// Serves one response that claims far more body than it sends
    fn lying_server() -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 100000000000000\r\nConnection: close\r\n\r\nabc",
                );
            }
        });
        format!("http://{addr}/index.png")
    }

    #[test]
    fn huge_content_length_fails_without_aborting() {
        let url = lying_server();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let progress = RasterProgress::default();
        let ctx = egui::Context::default();

        let result = runtime.block_on(fetch(&url, &progress, &ctx));

        // The body is cut short, so the fetch reports an error
        assert!(result.is_err());
        assert_eq!(progress.total.load(Ordering::Relaxed), 100_000_000_000_000);
        assert!(progress.received() <= 3);
    }

    #[test]
    fn progress_fraction() {
        let progress = RasterProgress::default();
        assert_eq!(progress.fraction(), None);
        progress.total.store(200, Ordering::Relaxed);
        progress.received.store(50, Ordering::Relaxed);
        assert_eq!(progress.fraction(), Some(0.25));
    }
}
