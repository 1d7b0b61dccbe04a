use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, OrderGuard, SinkConfig, ensure_parent_dir};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;

/// Options for [`FfmpegGifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Output GIF path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl GifSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to stdin, producing a
/// looping GIF.
pub struct FfmpegGifSink {
    opts: GifSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    order: OrderGuard,
}

impl FfmpegGifSink {
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            order: OrderGuard::default(),
        }
    }
}

/// `ffmpeg` arguments for a GIF encode of `cfg`, reading raw RGBA from stdin.
pub fn gif_args(cfg: &SinkConfig, opts: &GifSinkOpts) -> Vec<String> {
    let mut args: Vec<String> = vec![
        if opts.overwrite { "-y" } else { "-n" }.into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", cfg.width, cfg.height),
        // For rawvideo input, `-r` before `-i` sets the input framerate.
        "-r".into(),
        format!("1000/{}", cfg.frame_ms),
        "-i".into(),
        "pipe:0".into(),
    ];
    if let Some(colors) = cfg.palette.filter(|&c| c > 0) {
        args.push("-filter_complex".into());
        args.push(palette_filter(colors));
    }
    args.extend(["-loop".into(), "0".into()]);
    args.push(opts.out_path.to_string_lossy().into_owned());
    args
}

/// Single-pass palette generation and mapping with dithering off.
pub fn palette_filter(max_colors: u32) -> String {
    format!(
        "split[a][b];[a]palettegen=max_colors={}[p];[b][p]paletteuse=dither=none",
        max_colors.clamp(2, 256)
    )
}

impl FrameSink for FfmpegGifSink {
    fn begin(&mut self, cfg: SinkConfig) -> LoaderResult<()> {
        cfg.validate()?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(LoaderError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(LoaderError::encode(
                "ffmpeg is required for GIF encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(gif_args(&cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            LoaderError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LoaderError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LoaderError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            frames = cfg.frame_count,
            "spawned ffmpeg gif encoder"
        );
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.order.reset();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterBuffer) -> LoaderResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LoaderError::encode("gif sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.accept(idx)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(LoaderError::encode("gif sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            LoaderError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> LoaderResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| LoaderError::encode("gif sink not started"))?;

        let status = child.wait().map_err(|e| {
            LoaderError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LoaderError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| LoaderError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(LoaderError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(
            out = %self.opts.out_path.display(),
            frames = self.order.pushed(),
            "wrote gif"
        );
        self.cfg = None;
        Ok(())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
