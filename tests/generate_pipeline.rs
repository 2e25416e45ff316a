use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glowreel::{
    CANVAS, CancelToken, Category, FfmpegSink, FfmpegSinkOpts, FileAssetResolver, FrameComposer,
    FrameIndex, FrameSink, Fps, GenerateOpts, GlowGradient, GlowreelError, GlowreelResult,
    InMemorySink, PixelBufferBridge, SinkConfig, StaticLayerRenderer, Theme, VictoryRecord,
    VideoGenerator, is_ffmpeg_on_path, suggested_output_path,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn generator() -> VideoGenerator {
    let theme = Theme::builtin().unwrap();
    let renderer = StaticLayerRenderer::new(CANVAS, theme, None).unwrap();
    let composer = FrameComposer::new(CANVAS, GlowGradient::warm(), None).unwrap();
    VideoGenerator::new(
        Fps::new(30, 1).unwrap(),
        Box::new(FileAssetResolver::new(CANVAS)),
        renderer,
        composer,
        PixelBufferBridge::new(),
    )
}

fn records(n: usize) -> Vec<VictoryRecord> {
    use chrono::TimeZone;
    (0..n)
        .map(|i| {
            VictoryRecord::bare(
                format!("r{i}"),
                Category::Sport,
                chrono::Utc
                    .with_ymd_and_hms(2025, 1, 1 + i as u32, 12, 0, 0)
                    .unwrap(),
            )
        })
        .collect()
}

fn opts(name: &str) -> GenerateOpts {
    GenerateOpts::new(std::env::temp_dir().join(name))
}

/// Records per-frame summaries instead of whole frames, keeping full bytes
/// only for a chosen few. Full-resolution runs are too large to retain.
#[derive(Default)]
struct StatsSink {
    cfg: Option<SinkConfig>,
    count: u64,
    next_expected: u64,
    contiguous: bool,
    keep: Vec<u64>,
    kept: HashMap<u64, Vec<u8>>,
    byte_len_ok: bool,
    aborted: bool,
}

impl StatsSink {
    fn keeping(keep: &[u64]) -> Self {
        Self {
            contiguous: true,
            byte_len_ok: true,
            keep: keep.to_vec(),
            ..Self::default()
        }
    }
}

impl FrameSink for StatsSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowreelResult<()> {
        self.cfg = Some(cfg);
        self.count = 0;
        self.next_expected = 0;
        self.contiguous = true;
        self.byte_len_ok = true;
        self.kept.clear();
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, data: &[u8]) -> GlowreelResult<()> {
        if idx.0 != self.next_expected {
            self.contiguous = false;
        }
        self.next_expected = idx.0 + 1;
        if let Some(cfg) = &self.cfg
            && data.len() != (cfg.width as usize) * (cfg.height as usize) * 4
        {
            self.byte_len_ok = false;
        }
        if self.keep.contains(&idx.0) {
            self.kept.insert(idx.0, data.to_vec());
        }
        self.count += 1;
        Ok(())
    }

    fn end(&mut self) -> GlowreelResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn two_bare_records_make_270_contiguous_frames() {
    init_tracing();
    let mut generator = generator();
    let mut sink = StatsSink::keeping(&[]);

    let progress: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = progress.clone();
    let mut run_opts = opts("glowreel_e2e_two.mp4");
    run_opts.progress = Some(Box::new(move |f: f64| {
        seen.lock().unwrap().push(f);
    }));

    let out = generator
        .generate(&records(2), &mut sink, run_opts)
        .unwrap();
    assert!(out.ends_with("glowreel_e2e_two.mp4"));

    assert_eq!(sink.count, 270);
    assert!(sink.contiguous);
    assert!(sink.byte_len_ok);
    assert!(!sink.aborted);

    let cfg = sink.cfg.clone().unwrap();
    assert_eq!((cfg.width, cfg.height), (1000, 1000));
    assert_eq!((cfg.fps.num, cfg.fps.den), (30, 1));

    let progress = progress.lock().unwrap();
    assert_eq!(progress.len(), 270);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*progress.last().unwrap(), 1.0);
}

#[test]
fn zero_records_are_rejected() {
    let mut generator = generator();
    let mut sink = InMemorySink::new();
    let err = generator
        .generate(&[], &mut sink, opts("glowreel_e2e_empty.mp4"))
        .unwrap_err();
    assert!(matches!(err, GlowreelError::InputEmpty));
    assert!(sink.config().is_none());
}

#[test]
fn scene_cut_fades_through_black() {
    let mut generator = generator();
    let mut sink = StatsSink::keeping(&[0, 90, 135, 179]);
    generator
        .generate(&records(1), &mut sink, opts("glowreel_e2e_fade.mp4"))
        .unwrap();
    assert_eq!(sink.count, 180);

    // Intro frames are the gradient card, visibly lit from frame zero.
    assert!(sink.kept[&0].iter().step_by(4).any(|&r| r > 0));
    // The victory scene's first frame has alpha zero: pure opaque black.
    for px in sink.kept[&90].chunks_exact(4) {
        assert_eq!(px, [0, 0, 0, 255]);
    }
    // Mid-scene frames are fully visible and lit by the glow.
    assert!(sink.kept[&135].iter().step_by(4).any(|&r| r > 10));
    // The final scene holds full opacity on its last frame.
    assert!(sink.kept[&179].iter().step_by(4).any(|&r| r > 10));
}

/// Accepts a frame only on every other readiness poll.
struct ThrottledSink {
    inner: StatsSink,
    polls: Cell<u64>,
}

impl FrameSink for ThrottledSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowreelResult<()> {
        self.inner.begin(cfg)
    }

    fn is_ready(&self) -> bool {
        let n = self.polls.get();
        self.polls.set(n + 1);
        n % 2 == 1
    }

    fn push_frame(&mut self, idx: FrameIndex, data: &[u8]) -> GlowreelResult<()> {
        self.inner.push_frame(idx, data)
    }

    fn end(&mut self) -> GlowreelResult<()> {
        self.inner.end()
    }

    fn abort(&mut self) {
        self.inner.abort()
    }
}

#[test]
fn backpressure_stalls_never_skip_frames() {
    let mut generator = generator();
    let mut sink = ThrottledSink {
        inner: StatsSink::keeping(&[]),
        polls: Cell::new(0),
    };
    let mut run_opts = opts("glowreel_e2e_throttle.mp4");
    run_opts.retry_yield = std::time::Duration::from_micros(10);

    generator
        .generate(&records(1), &mut sink, run_opts)
        .unwrap();

    assert_eq!(sink.inner.count, 180);
    assert!(sink.inner.contiguous);
}

#[test]
fn cancellation_aborts_the_sink() {
    let mut generator = generator();
    let mut sink = InMemorySink::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut run_opts = opts("glowreel_e2e_cancel.mp4");
    run_opts.cancel = Some(cancel);

    let err = generator
        .generate(&records(1), &mut sink, run_opts)
        .unwrap_err();
    assert!(matches!(err, GlowreelError::Canceled));
    assert!(sink.aborted());
    assert!(sink.frames().is_empty());
}

/// Fails a fixed number of frames into the run.
struct FailingSink {
    inner: StatsSink,
    fail_at: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowreelResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, data: &[u8]) -> GlowreelResult<()> {
        if idx.0 >= self.fail_at {
            return Err(GlowreelError::encoder_write("disk full"));
        }
        self.inner.push_frame(idx, data)
    }

    fn end(&mut self) -> GlowreelResult<()> {
        self.inner.end()
    }

    fn abort(&mut self) {
        self.inner.abort()
    }
}

#[test]
fn write_failures_abort_and_discard() {
    let mut generator = generator();
    let mut sink = FailingSink {
        inner: StatsSink::keeping(&[]),
        fail_at: 5,
    };

    let err = generator
        .generate(&records(1), &mut sink, opts("glowreel_e2e_fail.mp4"))
        .unwrap_err();
    assert!(matches!(err, GlowreelError::EncoderWrite(_)));
    assert!(sink.inner.aborted);
}

#[test]
fn output_path_is_reusable_across_sequential_runs() {
    let mut generator = generator();
    let path = std::env::temp_dir().join("glowreel_e2e_sequential.mp4");

    let mut first = StatsSink::keeping(&[]);
    generator
        .generate(&records(1), &mut first, GenerateOpts::new(&path))
        .unwrap();

    let mut second = StatsSink::keeping(&[]);
    generator
        .generate(&records(1), &mut second, GenerateOpts::new(&path))
        .unwrap();
    assert_eq!(second.count, 180);
}

#[test]
fn ffmpeg_smoke_writes_a_playable_file() {
    init_tracing();
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let out = suggested_output_path();
    let mut generator = generator();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    let mut run_opts = GenerateOpts::new(&out);
    run_opts.year = Some(2025);

    let path = generator
        .generate(&records(1), &mut sink, run_opts)
        .unwrap();
    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
    let _ = std::fs::remove_file(&path);
}
