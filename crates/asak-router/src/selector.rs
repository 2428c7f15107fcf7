//! Model selection and dispatch.
//!
//! A [`Selector`] owns a validated [`Config`], a [`QuotaTracker`] with one usage
//! record per model, and the [`CompletionService`] requests go out through.
//!
//! Selecting a model always counts as a use, whether or not the caller goes on to
//! send anything: [`Selector::get_model`] reserves quota at selection time. This is
//! the only point where the tracker can observe traffic, so callers that pick a
//! model and talk to the provider themselves are still accounted for.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::debug;

use asak_core::types::{AssistantMessage, ChatCompletion, ChatCompletionRequest, Message};
use asak_core::utils::mask_secret;
use asak_core::{Config, ModelSpec};
use asak_providers::{Completion, CompletionService, HttpCompletionService, ProviderError};

use crate::clock::{Clock, SystemClock};
use crate::delta::DeltaStream;
use crate::error::{Result, RouterError};
use crate::filter::ModelFilter;
use crate::recorder::{QuotaTracker, UsageRecord};

/// Caller-supplied predicate over `(index, model)`.
///
/// Runs while the tracker lock is held, so it must not call back into the selector.
pub type Predicate<'a> = &'a (dyn Fn(usize, &ModelSpec) -> bool + Sync);

// ─────────────────────────────────────────────
// Mode
// ─────────────────────────────────────────────

/// How one model is chosen from the candidate set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Lowest candidate index: earlier models are primaries, later ones fallbacks.
    Index,
    /// Highest headroom score; equal scores go to the lowest index.
    Available,
    /// Uniform random choice.
    Random,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Index => "index",
            Mode::Available => "available",
            Mode::Random => "random",
        }
    }

    /// `candidates` must be ascending; `records` is indexed by model index.
    fn pick(self, candidates: &[usize], records: &[UsageRecord]) -> Option<usize> {
        match self {
            Mode::Index => candidates.iter().copied().min(),
            Mode::Available => {
                let mut best: Option<(usize, f64)> = None;
                for &i in candidates {
                    let score = records.get(i).map_or(f64::MIN, UsageRecord::availability);
                    if best.map_or(true, |(_, top)| score > top) {
                        best = Some((i, score));
                    }
                }
                best.map(|(i, _)| i)
            }
            Mode::Random => candidates.choose(&mut rand::rng()).copied(),
        }
    }
}

impl FromStr for Mode {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "index" => Ok(Mode::Index),
            "available" => Ok(Mode::Available),
            "random" => Ok(Mode::Random),
            _ => Err(RouterError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Selection results
// ─────────────────────────────────────────────

/// Everything needed to call the chosen model without going back through the selector.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedModel {
    /// Position in `Config::models`.
    pub index: usize,
    pub provider: String,
    pub base_url: String,
    pub key: String,
    pub model: String,
}

impl fmt::Debug for SelectedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedModel")
            .field("index", &self.index)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("key", &mask_secret(&self.key))
            .field("model", &self.model)
            .finish()
    }
}

/// A dispatched request: which model served it and what came back.
#[derive(Debug)]
pub struct Response {
    pub selected: SelectedModel,
    pub body: ResponseBody,
}

/// What a request returns.
///
/// Only the non-streamed variant carries the raw completion. A streamed
/// response yields text fragments and nothing else: the chunk envelopes are
/// consumed while decoding.
#[derive(Debug)]
pub enum ResponseBody {
    /// Streamed text fragments. Single pass; drop it to abort the request.
    Delta(DeltaStream),
    /// The completed message, plus the raw completion it came from.
    Message {
        message: AssistantMessage,
        original: ChatCompletion,
    },
}

// ─────────────────────────────────────────────
// Selector
// ─────────────────────────────────────────────

/// Builder for [`Selector`], for swapping the completion service or the clock.
pub struct SelectorBuilder {
    config: Config,
    service: Option<Arc<dyn CompletionService>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SelectorBuilder {
    pub fn service(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the config and build the selector with empty usage records.
    pub fn build(self) -> Result<Selector> {
        self.config.validate()?;

        let service: Arc<dyn CompletionService> = match self.service {
            Some(service) => service,
            None => Arc::new(HttpCompletionService::new()?),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let tracker = QuotaTracker::new(self.config.models.clone(), clock);

        debug!(
            providers = self.config.providers.len(),
            models = self.config.models.len(),
            "Selector ready"
        );

        Ok(Selector {
            config: self.config,
            tracker,
            service,
        })
    }
}

/// Rate-limit-aware model selector and request dispatcher.
pub struct Selector {
    config: Config,
    tracker: QuotaTracker,
    service: Arc<dyn CompletionService>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl Selector {
    /// Selector over `config`, talking HTTP to the configured providers.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> SelectorBuilder {
        SelectorBuilder {
            config,
            service: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Usage snapshot interface (`get` / `replace` / `add`).
    pub fn recorder(&self) -> &QuotaTracker {
        &self.tracker
    }

    /// Choose one model that passes `filter` and has quota left, and record a use of it.
    ///
    /// Compaction, filtering, selection and recording happen under a single lock,
    /// so concurrent callers never overshoot a window between them.
    pub fn get_model(&self, mode: Mode, filter: Option<Predicate<'_>>) -> Result<SelectedModel> {
        let index = self.tracker.reserve(|records, models| {
            let candidates: Vec<usize> = models
                .iter()
                .enumerate()
                .filter(|&(i, spec)| filter.map_or(true, |f| f(i, spec)))
                .filter(|&(i, _)| records.get(i).is_some_and(UsageRecord::is_available))
                .map(|(i, _)| i)
                .collect();

            debug!(mode = %mode, candidates = candidates.len(), "Candidates filtered");
            mode.pick(&candidates, records)
                .ok_or(RouterError::NoModelAvailable)
        })?;

        let selected = self.selected(index)?;
        debug!(
            mode = %mode,
            index,
            provider = %selected.provider,
            model = %selected.model,
            "Model selected"
        );
        Ok(selected)
    }

    /// [`Selector::get_model`] with a parsed textual filter.
    pub fn get_model_with(&self, mode: Mode, filter: &ModelFilter) -> Result<SelectedModel> {
        self.get_model(mode, Some(&|i: usize, spec: &ModelSpec| filter.matches(i, spec)))
    }

    /// Select a model and send it `messages`.
    ///
    /// Quota is reserved before the network call, so it stays consumed even when
    /// the provider fails. Provider errors come back as [`RouterError::Upstream`]
    /// with the original [`ProviderError`] inside.
    pub async fn request(
        &self,
        mode: Mode,
        filter: Option<Predicate<'_>>,
        messages: Vec<Message>,
        stream: bool,
    ) -> Result<Response> {
        let selected = self.get_model(mode, filter)?;
        self.dispatch(selected, messages, stream).await
    }

    /// [`Selector::request`] with a parsed textual filter.
    pub async fn request_with(
        &self,
        mode: Mode,
        filter: &ModelFilter,
        messages: Vec<Message>,
        stream: bool,
    ) -> Result<Response> {
        let selected = self.get_model_with(mode, filter)?;
        self.dispatch(selected, messages, stream).await
    }

    async fn dispatch(
        &self,
        selected: SelectedModel,
        messages: Vec<Message>,
        stream: bool,
    ) -> Result<Response> {
        let request = ChatCompletionRequest::new(selected.model.clone(), messages, stream);
        let completion = self
            .service
            .create_chat_completion(&selected.base_url, &selected.key, request)
            .await?;

        let body = match completion {
            Completion::Stream(chunks) => ResponseBody::Delta(DeltaStream::new(chunks)),
            Completion::Full(original) => {
                let message = original.first_message().cloned().ok_or_else(|| {
                    ProviderError::Decode("completion has no choices".to_string())
                })?;
                ResponseBody::Message { message, original }
            }
        };

        Ok(Response { selected, body })
    }

    fn selected(&self, index: usize) -> Result<SelectedModel> {
        let (spec, provider) = self.config.provider_for(index).ok_or_else(|| {
            RouterError::RecordsInvalid(format!("no provider for model index {index}"))
        })?;
        Ok(SelectedModel {
            index,
            provider: spec.provider.clone(),
            base_url: provider.base_url.clone(),
            key: provider.key.clone(),
            model: spec.model.clone(),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use asak_core::types::{ChatChoice, ChatCompletionChunk};
    use asak_core::ProviderConfig;
    use async_trait::async_trait;
    use futures_util::{stream, StreamExt};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const T0: i64 = 1_700_000_000_000;

    // ── Fakes ──

    #[derive(Default)]
    struct FakeService {
        calls: Mutex<Vec<(String, String, ChatCompletionRequest)>>,
        fail: bool,
    }

    impl FakeService {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, String, ChatCompletionRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn text_chunk(text: Option<&str>) -> ChatCompletionChunk {
        let delta = match text {
            Some(t) => serde_json::json!({"content": t}),
            None => serde_json::json!({"role": "assistant"}),
        };
        serde_json::from_value(serde_json::json!({"choices": [{"delta": delta}]})).unwrap()
    }

    #[async_trait]
    impl CompletionService for FakeService {
        async fn create_chat_completion(
            &self,
            base_url: &str,
            api_key: &str,
            request: ChatCompletionRequest,
        ) -> std::result::Result<Completion, ProviderError> {
            self.calls.lock().unwrap().push((
                base_url.to_string(),
                api_key.to_string(),
                request.clone(),
            ));

            if self.fail {
                return Err(ProviderError::Api {
                    status: 503,
                    body: "upstream down".to_string(),
                });
            }

            if request.stream {
                let chunks = vec![
                    Ok(text_chunk(None)),
                    Ok(text_chunk(Some("po"))),
                    Ok(text_chunk(Some(""))),
                    Ok(text_chunk(Some("ng"))),
                ];
                Ok(Completion::Stream(stream::iter(chunks).boxed()))
            } else {
                Ok(Completion::Full(ChatCompletion {
                    id: Some("c1".to_string()),
                    model: Some(request.model.clone()),
                    choices: vec![ChatChoice {
                        index: 0,
                        message: AssistantMessage {
                            role: Some("assistant".to_string()),
                            content: Some("pong".to_string()),
                            reasoning_content: None,
                        },
                        finish_reason: Some("stop".to_string()),
                    }],
                    usage: None,
                }))
            }
        }
    }

    // ── Helpers ──

    fn config(models: Vec<ModelSpec>) -> Config {
        let mut providers = HashMap::new();
        providers.insert(
            "groq".to_string(),
            ProviderConfig::new("https://api.groq.com/openai/v1", "gsk-secret-key"),
        );
        providers.insert(
            "openrouter".to_string(),
            ProviderConfig::new("https://openrouter.ai/api/v1", "sk-or-secret"),
        );
        Config { providers, models }
    }

    fn uniform(n: usize, rpm: u32, rpd: u32) -> Vec<ModelSpec> {
        (0..n)
            .map(|i| ModelSpec::new("groq", format!("model-{i}"), rpm, rpd))
            .collect()
    }

    fn selector(models: Vec<ModelSpec>) -> (Selector, Arc<ManualClock>, Arc<FakeService>) {
        selector_with(models, FakeService::default())
    }

    fn selector_with(
        models: Vec<ModelSpec>,
        service: FakeService,
    ) -> (Selector, Arc<ManualClock>, Arc<FakeService>) {
        let clock = Arc::new(ManualClock::new(T0));
        let service = Arc::new(service);
        let selector = Selector::builder(config(models))
            .service(service.clone())
            .clock(clock.clone())
            .build()
            .unwrap();
        (selector, clock, service)
    }

    /// Give each model `uses[i]` minute and day events at T0.
    fn preload(selector: &Selector, uses: &[usize]) {
        let records = selector
            .config()
            .models
            .iter()
            .zip(uses)
            .map(|(spec, &n)| {
                UsageRecord::with_events(
                    vec![T0; n],
                    vec![T0; n],
                    spec.rate_limit.rpm,
                    spec.rate_limit.rpd,
                )
            })
            .collect();
        selector.recorder().replace(records).unwrap();
    }

    // ── Construction ──

    #[test]
    fn test_rejects_unknown_provider() {
        let mut models = uniform(1, 5, 50);
        models.push(ModelSpec::new("mistral", "mistral-small", 5, 50));
        let err = Selector::builder(config(models))
            .service(Arc::new(FakeService::default()))
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_rpm() {
        let err = Selector::builder(config(uniform(2, 0, 50)))
            .service(Arc::new(FakeService::default()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("rate_limit.rpm"));
    }

    #[test]
    fn test_starts_with_empty_records() {
        let (selector, _, _) = selector(uniform(3, 5, 50));
        let records = selector.recorder().get();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.day_events().is_empty()));
    }

    // ── Mode ──

    #[test]
    fn test_mode_parsing() {
        assert_eq!("index".parse::<Mode>().unwrap(), Mode::Index);
        assert_eq!("available".parse::<Mode>().unwrap(), Mode::Available);
        assert_eq!("random".parse::<Mode>().unwrap(), Mode::Random);
        for loose in [" Available ", "RANDOM", "Index", "index "] {
            assert!(matches!(
                loose.parse::<Mode>(),
                Err(RouterError::InvalidMode(m)) if m == loose
            ));
        }
        assert!(matches!(
            "fastest".parse::<Mode>(),
            Err(RouterError::InvalidMode(m)) if m == "fastest"
        ));
        assert_eq!(Mode::Available.to_string(), "available");
    }

    // ── get_model ──

    #[test]
    fn test_index_mode_picks_lowest_candidate() {
        let (selector, _, _) = selector(uniform(8, 5, 50));
        let filter = |i: usize, _: &ModelSpec| [2, 5, 7].contains(&i);

        for _ in 0..3 {
            assert_eq!(selector.get_model(Mode::Index, Some(&filter)).unwrap().index, 2);
        }
    }

    #[test]
    fn test_available_mode_picks_most_headroom() {
        let (selector, _, _) = selector(uniform(3, 10, 100));
        preload(&selector, &[9, 1, 5]);

        let selected = selector.get_model(Mode::Available, None).unwrap();
        assert_eq!(selected.index, 1);
        assert_eq!(selected.model, "model-1");
    }

    #[test]
    fn test_available_mode_two_models() {
        let (selector, _, _) = selector(uniform(2, 10, 100));
        preload(&selector, &[8, 2]);
        assert_eq!(selector.get_model(Mode::Available, None).unwrap().index, 1);
    }

    #[test]
    fn test_available_mode_ties_go_to_lowest_index() {
        let (selector, _, _) = selector(uniform(4, 10, 100));
        preload(&selector, &[5, 3, 3, 3]);
        let filter = |i: usize, _: &ModelSpec| i != 1;

        assert_eq!(
            selector.get_model(Mode::Available, Some(&filter)).unwrap().index,
            2
        );
    }

    #[test]
    fn test_random_mode_stays_within_candidates() {
        let (selector, _, _) = selector(uniform(6, 100, 1000));
        let filter = |i: usize, _: &ModelSpec| i % 2 == 1;

        for _ in 0..30 {
            let index = selector.get_model(Mode::Random, Some(&filter)).unwrap().index;
            assert!([1, 3, 5].contains(&index), "picked {index}");
        }
    }

    #[test]
    fn test_selection_records_exactly_one_use() {
        let (selector, _, _) = selector(uniform(3, 5, 50));
        preload(&selector, &[1, 2, 0]);
        let before = selector.recorder().get();

        let selected = selector.get_model(Mode::Available, None).unwrap();
        assert_eq!(selected.index, 2);

        let after = selector.recorder().get();
        for i in 0..3 {
            let added = usize::from(i == 2);
            assert_eq!(after[i].minute_events().len(), before[i].minute_events().len() + added);
            assert_eq!(after[i].day_events().len(), before[i].day_events().len() + added);
        }
    }

    #[test]
    fn test_selected_model_carries_provider_details() {
        let mut models = uniform(1, 5, 50);
        models.push(ModelSpec::new("openrouter", "qwen/qwen3:free", 5, 50));
        let (selector, _, _) = selector(models);

        let filter: ModelFilter = "provider=openrouter".parse().unwrap();
        let selected = selector.get_model_with(Mode::Index, &filter).unwrap();

        assert_eq!(selected.index, 1);
        assert_eq!(selected.provider, "openrouter");
        assert_eq!(selected.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(selected.key, "sk-or-secret");
        assert_eq!(selected.model, "qwen/qwen3:free");
        assert!(!format!("{selected:?}").contains("sk-or-secret"));
    }

    #[test]
    fn test_filter_excluding_everything() {
        let (selector, _, _) = selector(uniform(2, 5, 50));
        let err = selector
            .get_model(Mode::Index, Some(&|_: usize, _: &ModelSpec| false))
            .unwrap_err();

        assert!(err.is_quota_exhausted());
        assert!(selector.recorder().get().iter().all(|r| r.minute_events().is_empty()));
    }

    #[test]
    fn test_minute_quota_then_recovery() {
        let (selector, clock, _) = selector(uniform(1, 1, 10));

        assert_eq!(selector.get_model(Mode::Index, None).unwrap().model, "model-0");
        assert!(matches!(
            selector.get_model(Mode::Index, None),
            Err(RouterError::NoModelAvailable)
        ));

        clock.advance(Duration::from_secs(61));
        let selected = selector.get_model(Mode::Index, None).unwrap();
        assert_eq!(selected.index, 0);
        assert_eq!(selector.recorder().get()[0].day_events().len(), 2);
    }

    #[test]
    fn test_index_mode_falls_back_when_primary_exhausted() {
        let (selector, _, _) = selector(uniform(2, 2, 100));

        let picks: Vec<usize> = (0..4)
            .map(|_| selector.get_model(Mode::Index, None).unwrap().index)
            .collect();
        assert_eq!(picks, vec![0, 0, 1, 1]);
        assert!(selector.get_model(Mode::Index, None).is_err());
    }

    #[test]
    fn test_day_quota_blocks_after_minutes_pass() {
        let (selector, clock, _) = selector(uniform(1, 5, 2));

        selector.get_model(Mode::Index, None).unwrap();
        clock.advance(Duration::from_secs(120));
        selector.get_model(Mode::Index, None).unwrap();
        clock.advance(Duration::from_secs(120));

        assert!(matches!(
            selector.get_model(Mode::Random, None),
            Err(RouterError::NoModelAvailable)
        ));
    }

    #[test]
    fn test_concurrent_selection_never_overshoots() {
        let (selector, _, _) = selector(uniform(2, 10, 100));
        let selector = Arc::new(selector);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let selector = Arc::clone(&selector);
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| selector.get_model(Mode::Random, None).is_ok())
                        .count()
                })
            })
            .collect();
        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(granted, 20);
        let records = selector.recorder().get();
        assert!(records.iter().all(|r| r.minute_events().len() == 10));
    }

    // ── request ──

    #[tokio::test]
    async fn test_request_returns_message() {
        let (selector, _, service) = selector(uniform(2, 5, 50));

        let response = selector
            .request(Mode::Index, None, vec![Message::user("ping")], false)
            .await
            .unwrap();

        assert_eq!(response.selected.index, 0);
        match response.body {
            ResponseBody::Message { message, original } => {
                assert_eq!(message.content.as_deref(), Some("pong"));
                assert_eq!(original.id.as_deref(), Some("c1"));
            }
            other => panic!("expected message, got {other:?}"),
        }

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        let (base_url, key, request) = &calls[0];
        assert_eq!(base_url, "https://api.groq.com/openai/v1");
        assert_eq!(key, "gsk-secret-key");
        assert_eq!(request.model, "model-0");
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_request_streams_text_deltas() {
        let (selector, _, service) = selector(uniform(1, 5, 50));

        let response = selector
            .request(Mode::Random, None, vec![Message::user("ping")], true)
            .await
            .unwrap();

        let ResponseBody::Delta(deltas) = response.body else {
            panic!("expected a delta stream");
        };
        let items: Vec<String> = deltas.map(|d| d.unwrap()).collect().await;
        assert_eq!(items, vec!["po".to_string(), "ng".to_string()]);
        assert!(service.calls()[0].2.stream);
    }

    #[tokio::test]
    async fn test_upstream_error_passes_through_after_accounting() {
        let (selector, _, _) = selector_with(uniform(1, 5, 50), FakeService::failing());

        let err = selector
            .request(Mode::Index, None, vec![Message::user("ping")], false)
            .await
            .unwrap_err();

        match err {
            RouterError::Upstream(ProviderError::Api { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert_eq!(selector.recorder().get()[0].minute_events().len(), 1);
    }

    #[tokio::test]
    async fn test_request_without_quota_never_calls_service() {
        let (selector, _, service) = selector(uniform(1, 1, 10));
        selector.get_model(Mode::Index, None).unwrap();

        let err = selector
            .request_with(Mode::Index, &ModelFilter::any(), vec![Message::user("hi")], true)
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::NoModelAvailable));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_request_over_http() {
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer local-key"))
            .and(body_partial_json(serde_json::json!({"model": "local-model", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "hello from mock"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut providers = HashMap::new();
        providers.insert(
            "local".to_string(),
            ProviderConfig::new(format!("{}/v1", mock_server.uri()), "local-key"),
        );
        let config = Config {
            providers,
            models: vec![ModelSpec::new("local", "local-model", 3, 30)],
        };

        let selector = Selector::new(config).unwrap();
        let response = selector
            .request(Mode::Index, None, vec![Message::user("hi")], false)
            .await
            .unwrap();

        let ResponseBody::Message { message, .. } = response.body else {
            panic!("expected a message");
        };
        assert_eq!(message.content.as_deref(), Some("hello from mock"));
        assert_eq!(response.selected.provider, "local");
    }
}
