use std::sync::Arc;

use thiserror::Error;

use crate::handlers::fallback::unavailable_analysis;
use crate::handlers::invoker::{InvocationResult, ModelRunner, Sleeper, TokioSleeper};
use crate::handlers::profile_guide::build_profile_guide;
use crate::handlers::prompt::compose_prompt;
use crate::handlers::validate::normalize;
use crate::models::{AnalyzeRequest, FoodAnalysis, ImagePart};
use crate::services::inference::InferenceProvider;

/// The one request shape the service refuses outright: nothing to
/// analyze. Surfaced before any provider call.
#[derive(Debug, Error)]
#[error("이미지 데이터 또는 음식 설명이 필요합니다")]
pub struct MissingInputError;

/// Per-request orchestration: prompt assembly, the model-fallback run,
/// and normalization of whatever comes back.
pub struct AnalysisHandler {
    provider: Arc<dyn InferenceProvider>,
    runner: ModelRunner,
    sleeper: Arc<dyn Sleeper>,
}

impl AnalysisHandler {
    pub fn new(provider: Arc<dyn InferenceProvider>, models: Vec<String>) -> Self {
        Self::with_sleeper(provider, models, Arc::new(TokioSleeper))
    }

    /// Same handler with an injected sleep capability, used by tests to
    /// run the retry loop without real delays.
    pub fn with_sleeper(
        provider: Arc<dyn InferenceProvider>,
        models: Vec<String>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            provider,
            runner: ModelRunner::new(models),
            sleeper,
        }
    }

    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<FoodAnalysis, MissingInputError> {
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let image = request
            .image_base64
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ImagePart::from_base64);

        if description.is_none() && image.is_none() {
            return Err(MissingInputError);
        }

        let guide = build_profile_guide(request.user_profile.as_ref(), request.language);
        let bundle = compose_prompt(description, image, request.language, &guide);

        match self
            .runner
            .run(self.provider.as_ref(), self.sleeper.as_ref(), &bundle)
            .await
        {
            InvocationResult::Success(raw) => Ok(normalize(&raw, request.language)),
            InvocationResult::Exhausted => {
                log::error!("❌ Every model attempt failed, returning fallback analysis");
                Ok(unavailable_analysis(description, request.language))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::services::inference::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubProvider {
        responses: Mutex<Vec<Result<String, ProviderError>>>,
        call_count: AtomicUsize,
    }

    impl StubProvider {
        fn new(mut responses: Vec<Result<String, ProviderError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl InferenceProvider for StubProvider {
        async fn generate(
            &self,
            _model_id: &str,
            _bundle: &crate::models::PromptBundle,
        ) -> Result<String, ProviderError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ProviderError::Api("no scripted response".to_string())))
        }
    }

    struct NoopSleeper;

    #[async_trait::async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn handler(provider: Arc<StubProvider>) -> AnalysisHandler {
        AnalysisHandler::with_sleeper(
            provider,
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            Arc::new(NoopSleeper),
        )
    }

    fn description_request(description: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected_before_any_model_call() {
        let provider = Arc::new(StubProvider::new(vec![]));
        let handler = handler(provider.clone());

        let request = AnalyzeRequest {
            description: Some("   ".to_string()),
            ..Default::default()
        };
        let result = handler.analyze(&request).await;

        assert!(result.is_err());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_description_only_request_yields_full_result() {
        let provider = Arc::new(StubProvider::new(vec![Ok(r#"{
            "foodName": "비빔밥",
            "calories": 560,
            "carbs": 82.0,
            "protein": 18.0,
            "fat": 14.0,
            "description": "나물과 고추장을 비빈 밥"
        }"#
        .to_string())]));
        let handler = handler(provider.clone());

        let result = handler.analyze(&description_request("비빔밥")).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.food_name, "비빔밥");
        assert_eq!(result.calories, 560);
        // defaulted fields are still populated
        assert_eq!(result.sugar, 0.0);
        assert_eq!(result.serving_size, 1.0);
        assert!(result.ingredients.is_empty());
    }

    #[tokio::test]
    async fn test_total_exhaustion_degrades_to_fallback_result() {
        let fatal = || Err(ProviderError::Api("quota exceeded".to_string()));
        let provider = Arc::new(StubProvider::new(vec![fatal(), fatal(), fatal()]));
        let handler = handler(provider.clone());

        let result = handler.analyze(&description_request("잔치국수")).await.unwrap();

        assert_eq!(provider.calls(), 3);
        assert_eq!(result.food_name, "잔치국수");
        assert_eq!(result.calories, 0);
        assert_eq!(result.analysis.unwrap().health_score, 50);
    }

    #[tokio::test]
    async fn test_language_flows_through_to_fallback() {
        let provider = Arc::new(StubProvider::new(vec![
            Err(ProviderError::Api("a".to_string())),
            Err(ProviderError::Api("b".to_string())),
            Err(ProviderError::Api("c".to_string())),
        ]));
        let handler = handler(provider);

        let request = AnalyzeRequest {
            description: Some("ramen".to_string()),
            language: Language::English,
            ..Default::default()
        };
        let result = handler.analyze(&request).await.unwrap();

        assert_eq!(result.description, "ramen (Analysis Failed)");
    }
}
