use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

use crate::clip::PcmClip;
use crate::error::AudioError;

pub struct AudioDecoder;

impl AudioDecoder {
    /// Decode a whole audio file into per-channel sample buffers.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<PcmClip, AudioError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|source| AudioError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path_ref.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| AudioError::Decode(err.to_string()))?;
        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::Decode("no default audio track".into()))?;
        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| AudioError::Decode(err.to_string()))?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(err) => return Err(AudioError::Decode(err.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(err)) => {
                    // Skip the undecodable packet and keep going.
                    debug!(%err, "skipping undecodable packet");
                    continue;
                }
                Err(err) => return Err(AudioError::Decode(err.to_string())),
            };

            let spec = *decoded.spec();
            let channel_count = spec.channels.count();
            if channels.is_empty() {
                channels = vec![Vec::new(); channel_count];
            }
            let frames = decoded.frames() as u64;
            let mut interleaved = SampleBuffer::<f32>::new(frames, spec);
            interleaved.copy_interleaved_ref(decoded);
            for frame in interleaved.samples().chunks(channel_count) {
                for (channel, &sample) in channels.iter_mut().zip(frame) {
                    channel.push(sample);
                }
            }
        }

        let clip = PcmClip::new(sample_rate, channels)?;
        info!(
            path = %path_ref.display(),
            sample_rate,
            channels = clip.channel_count(),
            duration_secs = clip.duration_secs(),
            "decoded audio clip"
        );
        Ok(clip)
    }
}
