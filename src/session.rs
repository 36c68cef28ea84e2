//! Session setup and teardown.
//!
//! A recording session acquires its resources in a fixed order (token,
//! transcription channel, capture) and releases them in reverse. Any
//! failure along the way unwinds what was already acquired before the error
//! is reported: the channel closes on drop and capture is only started once
//! everything else is live.

use crate::audio::source::SampleSource;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, SlatewireError};
use crate::pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
use crate::pipeline::sink::AnnotationSink;
use crate::transport::channel::TcpTranscriptionChannel;
use crate::transport::token::TokenClient;
use std::time::Duration;

/// Resolved parameters for one recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Token endpoint URL.
    pub token_url: String,
    /// Streaming relay address.
    pub relay_addr: String,
    /// Pipeline configuration (flush policy, correlation window, buffers).
    pub pipeline: PipelineConfig,
}

impl SessionConfig {
    /// Derive session parameters from the application config.
    pub fn from_config(config: &Config) -> Self {
        let correlation_window = if config.slate.correlation_window_secs == 0 {
            defaults::CORRELATION_WINDOW
        } else {
            Duration::from_secs(config.slate.correlation_window_secs)
        };

        Self {
            token_url: config.service.token_url.clone(),
            relay_addr: config.service.relay_addr.clone(),
            pipeline: PipelineConfig {
                flush_policy: config.service.flush_policy(),
                correlation_window,
                ..Default::default()
            },
        }
    }
}

/// Start a captioning session: fetch a token, connect the channel, start
/// the pipeline.
///
/// On failure nothing stays acquired: a token is stateless, the channel
/// closes when dropped, and the capture source only starts inside
/// `Pipeline::start` after the rest of the pipeline is standing.
pub async fn start(
    session: SessionConfig,
    source: Box<dyn SampleSource>,
    sink: Box<dyn AnnotationSink>,
) -> Result<PipelineHandle> {
    let token = TokenClient::new(&session.token_url).fetch().await?;

    let sample_rate = source.sample_rate();
    let relay_addr = session.relay_addr.clone();
    let channel = tokio::task::spawn_blocking(move || {
        TcpTranscriptionChannel::connect(&relay_addr, &token, sample_rate)
    })
    .await
    .map_err(|e| SlatewireError::SessionConnect {
        message: format!("connect task failed: {}", e),
    })??;

    Pipeline::new(session.pipeline).start(source, Box::new(channel), sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::accumulator::FlushPolicy;
    use crate::audio::source::MockSampleSource;
    use crate::pipeline::sink::CollectorSink;

    #[test]
    fn session_config_from_app_config() {
        let mut config = Config::default();
        config.service.flush_short_final = true;
        config.slate.correlation_window_secs = 15;

        let session = SessionConfig::from_config(&config);
        assert_eq!(session.token_url, "http://localhost:3000/token");
        assert_eq!(session.relay_addr, "localhost:43007");
        assert_eq!(session.pipeline.flush_policy, FlushPolicy::FlushShort);
        assert_eq!(
            session.pipeline.correlation_window,
            Duration::from_secs(15)
        );
    }

    #[test]
    fn zero_window_falls_back_to_default() {
        let mut config = Config::default();
        config.slate.correlation_window_secs = 0;

        let session = SessionConfig::from_config(&config);
        assert_eq!(
            session.pipeline.correlation_window,
            defaults::CORRELATION_WINDOW
        );
    }

    #[tokio::test]
    async fn token_failure_is_fatal_and_clean() {
        // Nothing is listening on the token port: setup fails before any
        // resource is acquired
        let session = SessionConfig {
            token_url: "http://127.0.0.1:1/token".to_string(),
            relay_addr: "127.0.0.1:1".to_string(),
            pipeline: PipelineConfig::default(),
        };

        let result = start(
            session,
            Box::new(MockSampleSource::new()),
            Box::new(CollectorSink::new()),
        )
        .await;

        assert!(matches!(result, Err(SlatewireError::TokenFetch { .. })));
    }
}
