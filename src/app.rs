//! Captioning application entry points.
//!
//! Composes the capture source, transcription session, and annotation sink
//! for the two operating modes: live microphone and WAV-on-stdin.

use crate::audio::capture::{CpalSampleSource, suppress_audio_warnings};
use crate::audio::source::SampleSource;
use crate::audio::wav::WavSampleSource;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::sink::{CollectorSink, StdoutSink};
use crate::session::{self, SessionConfig};

/// Run the live captioning session: microphone → relay → annotations.
///
/// Runs until Ctrl-C. Stop releases the capture device, closes the channel,
/// and discards any buffered-but-unreleased audio.
pub async fn run_caption_command(
    mut config: Config,
    device: Option<String>,
    token_url: Option<String>,
    relay: Option<String>,
    quiet: bool,
) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    // Apply CLI overrides
    if let Some(d) = device {
        config.audio.device = Some(d);
    }
    if let Some(url) = token_url {
        config.service.token_url = url;
    }
    if let Some(addr) = relay {
        config.service.relay_addr = addr;
    }

    let source = CpalSampleSource::new(config.audio.device.as_deref())?;
    if !quiet {
        eprintln!(
            "slatewire: capturing at {} Hz, connecting to {}...",
            source.sample_rate(),
            config.service.relay_addr
        );
    }

    let handle = session::start(
        SessionConfig::from_config(&config),
        Box::new(source),
        Box::new(StdoutSink::new()),
    )
    .await?;

    if !quiet {
        eprintln!("slatewire: listening — call your slate, then ACTION / CUT. Ctrl-C stops.");
    }

    tokio::signal::ctrl_c().await?;

    if !quiet {
        eprintln!("slatewire: stopping...");
    }
    let _ = handle.stop();

    Ok(())
}

/// Run pipe mode: WAV on stdin → relay → take log on stdout.
pub async fn run_pipe_command(
    mut config: Config,
    token_url: Option<String>,
    relay: Option<String>,
    quiet: bool,
) -> Result<()> {
    if let Some(url) = token_url {
        config.service.token_url = url;
    }
    if let Some(addr) = relay {
        config.service.relay_addr = addr;
    }

    let source = WavSampleSource::from_stdin()?;
    if !quiet {
        eprintln!(
            "slatewire: streaming WAV at {} Hz to {}...",
            source.sample_rate(),
            config.service.relay_addr
        );
    }

    let handle = session::start(
        SessionConfig::from_config(&config),
        Box::new(source),
        Box::new(CollectorSink::new()),
    )
    .await?;

    if let Some(log) = handle.finish() {
        println!("{}", log);
    } else if !quiet {
        eprintln!("slatewire: no annotations produced");
    }

    Ok(())
}
