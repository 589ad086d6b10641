use std::future::Future;
use std::time::Duration;

use lingo_core::audio::AudioClip;
use lingo_core::ProviderError;

/// Text-to-speech backend returning raw 16-bit little-endian mono PCM at 24 kHz.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        text: &str,
        language_code: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Synthesize and decode `text`, bounded by `timeout`. Any failure yields
/// `None`; pronunciation is optional and never blocks a lesson.
pub async fn speak_or_none<S: SpeechSynthesizer>(
    synth: &S,
    text: &str,
    language_code: &str,
    timeout: Duration,
) -> Option<AudioClip> {
    let pcm = match tokio::time::timeout(timeout, synth.synthesize(text, language_code)).await {
        Ok(Ok(pcm)) => pcm,
        Ok(Err(e)) => {
            tracing::warn!(language = language_code, error = %e, "speech synthesis failed");
            return None;
        }
        Err(_) => {
            tracing::warn!(
                language = language_code,
                timeout_ms = timeout.as_millis() as u64,
                "speech synthesis timed out"
            );
            return None;
        }
    };
    if pcm.is_empty() {
        return None;
    }
    match AudioClip::from_speech_pcm(&pcm) {
        Ok(clip) => Some(clip),
        Err(e) => {
            tracing::warn!(error = %e, "speech payload could not be decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSpeechSynthesizer;

    fn tone() -> Vec<u8> {
        [0i16, 8192, -8192, 0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }

    #[tokio::test]
    async fn test_speak_decodes_pcm() {
        let synth = MockSpeechSynthesizer::new(tone());
        let clip = speak_or_none(&synth, "Hola", "es", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(clip.sample_rate, 24_000);
        assert_eq!(clip.frames(), 4);
        assert_eq!(clip.channels[0][1], 0.25);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_none() {
        let synth = MockSpeechSynthesizer::failing(ProviderError::RateLimited);
        assert!(speak_or_none(&synth, "Hola", "es", Duration::from_secs(5))
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_none() {
        let synth = MockSpeechSynthesizer::new(tone()).with_delay(Duration::from_secs(30));
        assert!(speak_or_none(&synth, "Hola", "es", Duration::from_secs(2))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_bad_payload_degrades_to_none() {
        let synth = MockSpeechSynthesizer::new(vec![1, 2, 3]);
        assert!(speak_or_none(&synth, "Hola", "es", Duration::from_secs(5))
            .await
            .is_none());
        let silent = MockSpeechSynthesizer::new(Vec::new());
        assert!(speak_or_none(&silent, "Hola", "es", Duration::from_secs(5))
            .await
            .is_none());
    }
}
