// Frame sinks for video export: ffmpeg via video-rs, or an in-memory counter
use anyhow::Result;
use ndarray::Array3;

/// Consumer of rendered RGBA frames, shaped `(height, width, 4)`.
pub trait FrameSink {
    fn encode(&mut self, frame: &Array3<u8>, time_secs: f64) -> Result<()>;
    /// Flushes buffered data. Called once after the last frame.
    fn finish(&mut self) -> Result<()>;
}

/// Keeps counts and timestamps instead of encoding. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct CountingEncoder {
    pub frames: usize,
    pub timestamps: Vec<f64>,
    /// `(height, width, channels)` of the last frame.
    pub last_shape: Option<(usize, usize, usize)>,
    pub finished: bool,
}

impl CountingEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for CountingEncoder {
    fn encode(&mut self, frame: &Array3<u8>, time_secs: f64) -> Result<()> {
        self.frames += 1;
        self.timestamps.push(time_secs);
        self.last_shape = Some(frame.dim());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(feature = "video-rs")]
mod real {
    use super::*;
    use std::path::Path;
    use video_rs::ffmpeg::{self, codec, format, software};

    /// Configuration for H.264 encoding.
    #[derive(Debug, Clone, Copy)]
    pub struct EncoderSettings {
        pub width: usize,
        pub height: usize,
        pub fps: u32,
        pub bitrate: usize,
    }

    /// Video-only H.264 / YUV420P encoder on top of `ffmpeg-next` (via `video-rs`).
    pub struct Encoder {
        output: format::context::Output,
        video_idx: usize,
        video_encoder: codec::encoder::video::Encoder,
        scaler: software::scaling::Context,
        rgba_frame: ffmpeg::util::frame::Video,
        yuv_frame: ffmpeg::util::frame::Video,
        finished: bool,
    }

    impl Encoder {
        /// Opens `path` and writes the container header.
        pub fn new(path: &Path, settings: EncoderSettings) -> Result<Self> {
            ffmpeg::init()?;

            let mut output = format::output(&path)?;
            let global_header = output
                .format()
                .flags()
                .contains(format::flag::Flags::GLOBAL_HEADER);

            let codec_v =
                codec::encoder::find(codec::Id::H264).ok_or(anyhow::anyhow!("H264 not found"))?;
            tracing::info!(bitrate = settings.bitrate, "[Encoder] Using codec: H264 (software)");

            let mut v_encoder = codec::context::Context::new_with_codec(codec_v)
                .encoder()
                .video()?;
            v_encoder.set_width(settings.width as u32);
            v_encoder.set_height(settings.height as u32);
            v_encoder.set_format(format::Pixel::YUV420P);
            v_encoder.set_time_base((1, 90000));
            v_encoder.set_frame_rate(Some((settings.fps.max(1) as i32, 1)));
            v_encoder.set_bit_rate(settings.bitrate);
            if global_header {
                v_encoder.set_flags(codec::flag::Flags::GLOBAL_HEADER);
            }

            let v_encoder = v_encoder.open_as(codec_v)?;
            let mut stream = output.add_stream(codec_v)?;
            stream.set_parameters(&v_encoder);
            let video_idx = stream.index();

            let scaler = software::scaling::Context::get(
                format::Pixel::RGBA,
                settings.width as u32,
                settings.height as u32,
                format::Pixel::YUV420P,
                settings.width as u32,
                settings.height as u32,
                software::scaling::flag::Flags::BILINEAR,
            )?;

            output.write_header()?;

            let rgba_frame = ffmpeg::util::frame::Video::new(
                format::Pixel::RGBA,
                settings.width as u32,
                settings.height as u32,
            );
            let yuv_frame = ffmpeg::util::frame::Video::new(
                format::Pixel::YUV420P,
                settings.width as u32,
                settings.height as u32,
            );

            Ok(Self {
                output,
                video_idx,
                video_encoder: v_encoder,
                scaler,
                rgba_frame,
                yuv_frame,
                finished: false,
            })
        }

        fn write_packets(&mut self) -> Result<()> {
            let stream_tb = self
                .output
                .stream(self.video_idx)
                .ok_or(anyhow::anyhow!("video stream missing"))?
                .time_base();
            let mut packet = codec::packet::Packet::empty();
            while self.video_encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(self.video_idx);
                packet.rescale_ts(self.video_encoder.time_base(), stream_tb);
                packet.write_interleaved(&mut self.output)?;
            }
            Ok(())
        }
    }

    impl FrameSink for Encoder {
        fn encode(&mut self, frame: &Array3<u8>, time_secs: f64) -> Result<()> {
            let (h, w, c) = frame.dim();
            if c != 4 {
                return Err(anyhow::anyhow!("expected RGBA frame, got {c} channels"));
            }
            let src = frame
                .as_slice()
                .ok_or(anyhow::anyhow!("frame is not contiguous"))?;

            let stride = self.rgba_frame.stride(0);
            let width_bytes = w * 4;
            if stride == width_bytes {
                self.rgba_frame.data_mut(0)[..src.len()].copy_from_slice(src);
            } else {
                for y in 0..h {
                    let src_row = &src[y * width_bytes..(y + 1) * width_bytes];
                    self.rgba_frame.data_mut(0)[y * stride..y * stride + width_bytes]
                        .copy_from_slice(src_row);
                }
            }

            self.scaler.run(&self.rgba_frame, &mut self.yuv_frame)?;
            self.yuv_frame.set_pts(Some((time_secs * 90000.0) as i64));
            self.video_encoder.send_frame(&self.yuv_frame)?;
            self.write_packets()
        }

        fn finish(&mut self) -> Result<()> {
            if self.finished {
                return Ok(());
            }
            self.finished = true;
            self.video_encoder.send_eof()?;
            self.write_packets()?;
            self.output.write_trailer()?;
            Ok(())
        }
    }
}

#[cfg(feature = "video-rs")]
pub use real::{Encoder, EncoderSettings};
