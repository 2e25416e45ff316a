use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use chrono::Datelike;

use crate::assets::resolve::AssetResolver;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{GlowreelError, GlowreelResult};
use crate::model::record::VictoryRecord;
use crate::render::buffer::PixelBufferBridge;
use crate::render::compose::{FrameComposer, RenderedStaticLayer};
use crate::render::frame::FrameRGBA;
use crate::render::static_layer::StaticLayerRenderer;
use crate::timeline::plan::{FRAMES_PER_SCENE, FrameDescriptor, total_frames};

/// The fixed square output canvas.
pub const CANVAS: Canvas = Canvas {
    width: 1000,
    height: 1000,
};

/// Receives the `emitted / total` fraction after every appended frame.
///
/// Called from the generation thread; callers that update UI state marshal
/// onto their own context inside the implementation.
pub trait ProgressSink: Send {
    /// `fraction` is monotone non-decreasing and reaches exactly 1.0.
    fn on_progress(&mut self, fraction: f64);
}

impl<F: FnMut(f64) + Send> ProgressSink for F {
    fn on_progress(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Cooperative cancellation flag checked once per frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token in the not-canceled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run aborts at the next frame boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-run options for [`VideoGenerator::generate`].
pub struct GenerateOpts {
    /// Destination path; also the re-entrancy key for concurrent runs.
    pub output_path: PathBuf,
    /// Progress receiver, called after every appended frame.
    pub progress: Option<Box<dyn ProgressSink>>,
    /// Optional cancellation token.
    pub cancel: Option<CancelToken>,
    /// Year shown on the intro card; defaults to the current year.
    pub year: Option<i32>,
    /// Readiness polls per frame before the run fails.
    pub readiness_retries: u32,
    /// Sleep between readiness polls.
    pub retry_yield: Duration,
}

impl GenerateOpts {
    /// Defaults for a given output path.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            progress: None,
            cancel: None,
            year: None,
            readiness_retries: 10_000,
            retry_yield: Duration::from_millis(1),
        }
    }
}

/// A collision-free `newYearVideo-*.mp4` path in the system temp dir.
pub fn suggested_output_path() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "newYearVideo-{:x}-{:x}.mp4",
        std::process::id(),
        nanos
    ))
}

// One generation run at a time per output path.
static ACTIVE_OUTPUTS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

struct OutputGuard(PathBuf);

impl OutputGuard {
    fn acquire(path: &PathBuf) -> GlowreelResult<Self> {
        let registry = ACTIVE_OUTPUTS.get_or_init(|| Mutex::new(HashSet::new()));
        let mut active = registry
            .lock()
            .map_err(|_| GlowreelError::validation("output path registry poisoned"))?;
        if !active.insert(path.clone()) {
            return Err(GlowreelError::validation(format!(
                "a generation run is already writing to {}",
                path.display()
            )));
        }
        Ok(Self(path.clone()))
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if let Some(registry) = ACTIVE_OUTPUTS.get()
            && let Ok(mut active) = registry.lock()
        {
            active.remove(&self.0);
        }
    }
}

/// Drives one generation run: intro scene, one scene per record, pad frames,
/// strictly sequential with in-order appends.
pub struct VideoGenerator {
    fps: Fps,
    resolver: Box<dyn AssetResolver>,
    renderer: StaticLayerRenderer,
    composer: FrameComposer,
    bridge: PixelBufferBridge,
}

impl VideoGenerator {
    /// Assemble a generator from explicitly constructed stages.
    pub fn new(
        fps: Fps,
        resolver: Box<dyn AssetResolver>,
        renderer: StaticLayerRenderer,
        composer: FrameComposer,
        bridge: PixelBufferBridge,
    ) -> Self {
        Self {
            fps,
            resolver,
            renderer,
            composer,
            bridge,
        }
    }

    /// Generate the full video into `sink`.
    ///
    /// Success is reported only after the sink's `end` confirms a finished
    /// output; any fatal error aborts the sink so no partial file survives.
    #[tracing::instrument(skip_all, fields(records = records.len(), out = %opts.output_path.display()))]
    pub fn generate(
        &mut self,
        records: &[VictoryRecord],
        sink: &mut dyn FrameSink,
        mut opts: GenerateOpts,
    ) -> GlowreelResult<PathBuf> {
        if records.is_empty() {
            return Err(GlowreelError::InputEmpty);
        }

        let _guard = OutputGuard::acquire(&opts.output_path)?;

        sink.begin(SinkConfig {
            width: CANVAS.width,
            height: CANVAS.height,
            fps: self.fps,
        })?;

        match self.run(records, sink, &mut opts) {
            Ok(()) => {
                sink.end()?;
                tracing::info!(
                    frames = total_frames(records.len()),
                    "generation run finished"
                );
                Ok(opts.output_path)
            }
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    fn run(
        &mut self,
        records: &[VictoryRecord],
        sink: &mut dyn FrameSink,
        opts: &mut GenerateOpts,
    ) -> GlowreelResult<()> {
        let total = total_frames(records.len());
        let mut emitted: u64 = 0;

        let year = opts
            .year
            .unwrap_or_else(|| chrono::Utc::now().year());

        // Intro: fully opaque from the very first frame.
        let intro = self.composer.intro_frame(year)?;
        for i in 0..FRAMES_PER_SCENE {
            let desc = FrameDescriptor::intro(i, FrameIndex(emitted), self.fps);
            self.append(sink, &intro, &desc, opts, &mut emitted, total)?;
        }

        for (index, record) in records.iter().enumerate() {
            let is_last = index == records.len() - 1;

            let media = self.resolver.resolve(record);
            tracing::debug!(
                record = %record.id.0,
                media_w = media.width,
                media_h = media.height,
                "scene asset resolved"
            );

            let layer = RenderedStaticLayer::new(self.renderer.render(record)?);
            for i in 0..FRAMES_PER_SCENE {
                let desc =
                    FrameDescriptor::victory(index, is_last, i, FrameIndex(emitted), self.fps);
                let frame = self.composer.compose(&layer, desc.transform())?;
                self.append(sink, &frame, &desc, opts, &mut emitted, total)?;
            }
        }

        // Drift guard: the scene loops above are frame-exact, but the declared
        // duration wins if they ever disagree.
        if emitted < total {
            let black = FrameRGBA::black(CANVAS.width, CANVAS.height);
            while emitted < total {
                let desc = FrameDescriptor::intro(0, FrameIndex(emitted), self.fps);
                self.append(sink, &black, &desc, opts, &mut emitted, total)?;
            }
        }

        Ok(())
    }

    /// Convert, wait for readiness, and append one frame, then report progress.
    ///
    /// The same frame is retried while the sink is not ready; the frame
    /// counter only advances on a successful append.
    fn append(
        &mut self,
        sink: &mut dyn FrameSink,
        frame: &FrameRGBA,
        desc: &FrameDescriptor,
        opts: &mut GenerateOpts,
        emitted: &mut u64,
        total: u64,
    ) -> GlowreelResult<()> {
        if let Some(cancel) = &opts.cancel
            && cancel.is_canceled()
        {
            return Err(GlowreelError::Canceled);
        }

        let mut tries = 0u32;
        while !sink.is_ready() {
            if tries >= opts.readiness_retries {
                return Err(GlowreelError::encoder_write(format!(
                    "sink not ready after {} polls at frame {}",
                    tries, desc.frame_index.0
                )));
            }
            tries += 1;
            std::thread::sleep(opts.retry_yield);
        }

        let buffer = self.bridge.to_buffer(frame, desc.alpha)?;
        let result = sink.push_frame(desc.frame_index, &buffer.data);
        self.bridge.release(buffer);
        result?;

        *emitted += 1;
        if let Some(progress) = opts.progress.as_mut() {
            progress.on_progress(*emitted as f64 / total as f64);
        }
        Ok(())
    }
}
