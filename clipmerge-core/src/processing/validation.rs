//! Admission checks and media validation.
//!
//! Admission looks only at what the caller declared (input count and byte
//! sizes) and runs before anything is probed. Validation probes every input
//! in submission order and stops at the first one that violates the policy.

use crate::config::ValidationPolicy;
use crate::error::{CoreError, CoreResult};
use crate::external::FfprobeExecutor;
use crate::media::{MediaInput, MediaMetadata};

/// Checks input count and declared sizes without touching the files.
pub fn validate_admission(
    videos: &[MediaInput],
    audio: &MediaInput,
    policy: &ValidationPolicy,
) -> CoreResult<()> {
    if videos.is_empty() {
        return Err(CoreError::NoVideoInputs);
    }
    if videos.len() > policy.max_videos {
        return Err(CoreError::TooManyVideos {
            count: videos.len(),
            max: policy.max_videos,
        });
    }

    for input in videos.iter().chain(std::iter::once(audio)) {
        if input.size > policy.max_file_size {
            return Err(CoreError::FileTooLarge {
                file: input.display_name.clone(),
                size: input.size,
                max: policy.max_file_size,
            });
        }
    }

    log::debug!(
        "Admitted {} video(s) and audio '{}'",
        videos.len(),
        audio.display_name
    );
    Ok(())
}

/// Probes `input`, attributing probe failures to its display name.
fn probe_input<P: FfprobeExecutor + ?Sized>(
    prober: &P,
    input: &MediaInput,
) -> CoreResult<MediaMetadata> {
    prober.probe(&input.path).map_err(|e| match e {
        CoreError::Probe { reason, .. } => CoreError::Probe {
            file: input.display_name.clone(),
            reason,
        },
        CoreError::Timeout { command, timeout } => CoreError::Probe {
            file: input.display_name.clone(),
            reason: format!("{command} timed out after {}s", timeout.as_secs()),
        },
        other => other,
    })
}

/// Validates one video input against the policy.
pub fn validate_video<P: FfprobeExecutor + ?Sized>(
    prober: &P,
    input: &MediaInput,
    policy: &ValidationPolicy,
) -> CoreResult<MediaMetadata> {
    let metadata = probe_input(prober, input)?;

    let stream = metadata
        .primary_video_stream()
        .ok_or_else(|| CoreError::NoVideoStream(input.display_name.clone()))?;

    if !policy.accepts_video_codec(&stream.codec_name) {
        return Err(CoreError::UnsupportedCodec {
            file: input.display_name.clone(),
            kind: "video",
            codec: stream.codec_name.clone(),
        });
    }

    if let (Some(width), Some(height)) = (stream.width, stream.height) {
        if !policy.accepts_resolution(width, height) {
            return Err(CoreError::ResolutionTooHigh {
                file: input.display_name.clone(),
                width,
                height,
                max_width: policy.max_width,
                max_height: policy.max_height,
            });
        }
    } else {
        log::warn!(
            "No dimensions reported for '{}', skipping resolution check",
            input.display_name
        );
    }

    log::debug!(
        "Video '{}' accepted: {} {}x{} {:.2}s",
        input.display_name,
        stream.codec_name,
        stream.width.unwrap_or(0),
        stream.height.unwrap_or(0),
        metadata.duration_secs
    );
    Ok(metadata)
}

/// Validates every video in submission order, failing on the first rejection.
///
/// Inputs after the failing one are never probed.
pub fn validate_videos<P: FfprobeExecutor + ?Sized>(
    prober: &P,
    inputs: &[MediaInput],
    policy: &ValidationPolicy,
) -> CoreResult<Vec<MediaMetadata>> {
    inputs
        .iter()
        .map(|input| validate_video(prober, input, policy))
        .collect()
}

/// Validates the audio track.
pub fn validate_audio<P: FfprobeExecutor + ?Sized>(
    prober: &P,
    input: &MediaInput,
    policy: &ValidationPolicy,
) -> CoreResult<MediaMetadata> {
    let metadata = probe_input(prober, input)?;

    let stream = metadata
        .primary_audio_stream()
        .ok_or_else(|| CoreError::NoAudioStream(input.display_name.clone()))?;

    if !policy.accepts_audio_codec(&stream.codec_name) {
        return Err(CoreError::UnsupportedCodec {
            file: input.display_name.clone(),
            kind: "audio",
            codec: stream.codec_name.clone(),
        });
    }

    log::debug!(
        "Audio '{}' accepted: {} {:.2}s",
        input.display_name,
        stream.codec_name,
        metadata.duration_secs
    );
    Ok(metadata)
}
