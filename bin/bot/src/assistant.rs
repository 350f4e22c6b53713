//! Message handling.
//!
//! [`Assistant`] turns one inbound text into one [`Reply`]. It owns the
//! session and preference stores and talks to the completion, translation
//! and places services through their traits. Failures are logged here and
//! replaced with fixed texts, so [`Assistant::handle`] never fails.

use crate::config::BotConfig;
use crate::error::{HandlerError, ServiceError, StartupError};
use crate::reply::{Keyboard, RandomSuffix, Reply, SuffixPicker, format_places};
use crate::router::{FOOD_QUERY, Route, is_food_request, route};
use crate::texts::{
    FIND_HINT, FOOD_EMPTY, FOOD_HEADER, GREETING, LANGUAGE_SAVED, SEARCH_EMPTY, SEARCH_HEADER,
    SEARCH_USAGE, SYSTEM_PROMPT,
};
use chrono::{DateTime, Utc};
use rootcause::prelude::ResultExt;
use rusgo_ai::{LlmBackend, LlmMessage, LlmRequest, OpenAiBackend};
use rusgo_conversation::{
    InMemoryLanguageStore, InMemorySessionStore, LanguageStore, MessageRole, Session,
    SessionManager,
};
use rusgo_core::{Language, UserId};
use rusgo_integration::{GoogleTranslator, PlacesSearch, SourceLanguage, Translator, YandexPlaces};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// The bot's conversational core.
pub struct Assistant {
    llm: Arc<dyn LlmBackend>,
    translator: Arc<dyn Translator>,
    places: Arc<dyn PlacesSearch>,
    sessions: SessionManager,
    languages: Arc<dyn LanguageStore>,
    suffixes: Box<dyn SuffixPicker>,
}

impl Assistant {
    /// Creates an assistant from its collaborators.
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        translator: Arc<dyn Translator>,
        places: Arc<dyn PlacesSearch>,
        sessions: SessionManager,
        languages: Arc<dyn LanguageStore>,
        suffixes: Box<dyn SuffixPicker>,
    ) -> Self {
        Self {
            llm,
            translator,
            places,
            sessions,
            languages,
            suffixes,
        }
    }

    /// Builds the production assistant with in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns an error if a service client cannot be constructed.
    pub fn from_config(config: &BotConfig) -> rusgo_core::Result<Self, StartupError> {
        let llm = OpenAiBackend::new(config.completion_backend())
            .context(StartupError::Client { service: "completion" })?;
        let translator = GoogleTranslator::new(config.http_timeout())
            .context(StartupError::Client { service: "translation" })?;
        let places = YandexPlaces::new(&config.yandex_api_key, config.http_timeout())
            .context(StartupError::Client { service: "places" })?;
        info!(
            provider = llm.provider().name(),
            model = llm.model(),
            "completion backend ready"
        );

        let sessions = SessionManager::new(
            Arc::new(InMemorySessionStore::new()),
            config.session_policy(),
            SYSTEM_PROMPT,
        );

        Ok(Self::new(
            Arc::new(llm),
            Arc::new(translator),
            Arc::new(places),
            sessions,
            Arc::new(InMemoryLanguageStore::new()),
            Box::new(RandomSuffix),
        ))
    }

    /// Handles one inbound text message from `user_id` received at `now`.
    pub async fn handle(&self, user_id: UserId, text: &str, now: DateTime<Utc>) -> Reply {
        let route = route(text);
        info!(%user_id, route = route.name(), "handling message");

        match route {
            Route::Start => Reply::with_keyboard(GREETING, Keyboard::languages()),
            Route::SelectLanguage(language) => {
                self.languages.set(user_id, language).await;
                debug!(%user_id, %language, "language saved");
                Reply::with_keyboard(LANGUAGE_SAVED, Keyboard::topics())
            }
            Route::FindHint => Reply::text(FIND_HINT),
            Route::Search(None) => Reply::text(SEARCH_USAGE),
            Route::Search(Some(query)) => self.recover(self.search_command(&query).await),
            Route::General => self.recover(self.general_reply(user_id, text, now).await),
        }
    }

    /// Logs a failed handler and swaps it for its fixed user text.
    fn recover(&self, result: rusgo_core::Result<Reply, HandlerError>) -> Reply {
        result.unwrap_or_else(|report| {
            error!(error = %report, "handler failed");
            Reply::text(report.current_context().user_message())
        })
    }

    #[instrument(skip(self))]
    async fn search_command(&self, query: &str) -> rusgo_core::Result<Reply, HandlerError> {
        let places = self
            .places
            .search(query)
            .await
            .map_err(ServiceError::Places)
            .context(HandlerError::PlacesSearch {
                query: query.to_string(),
            })?;

        if places.is_empty() {
            return Ok(Reply::text(SEARCH_EMPTY));
        }
        Ok(Reply::text(format_places(SEARCH_HEADER, &places)))
    }

    #[instrument(skip(self, text, now))]
    async fn general_reply(
        &self,
        user_id: UserId,
        text: &str,
        now: DateTime<Utc>,
    ) -> rusgo_core::Result<Reply, HandlerError> {
        let failed = || HandlerError::GeneralReply { user_id };

        let _guard = self.sessions.lock(user_id).await;
        let mut session = self
            .sessions
            .get_or_refresh(user_id, now)
            .await
            .context(failed())?;
        self.sessions
            .append_user_message(&mut session, text, now)
            .await
            .context(failed())?;

        if is_food_request(text) {
            let places = self
                .places
                .search(FOOD_QUERY)
                .await
                .map_err(ServiceError::Places)
                .context(failed())?;
            if places.is_empty() {
                return Ok(Reply::text(FOOD_EMPTY));
            }
            return Ok(Reply::text(format_places(FOOD_HEADER, &places)));
        }

        let language = self.languages.get(user_id).await;
        if !language.is_primary() {
            let translated = match self
                .translator
                .translate(text, SourceLanguage::Auto, Language::PRIMARY)
                .await
            {
                Ok(translated) => translated,
                Err(err) => {
                    self.sessions
                        .discard_last_user_message(&mut session)
                        .await
                        .context(failed())?;
                    return Err(ServiceError::Translation(err)).context(failed());
                }
            };
            self.sessions
                .rewrite_last_user_message(&mut session, translated)
                .await
                .context(failed())?;
        }

        let response = self
            .llm
            .generate(&completion_request(&session))
            .await
            .map_err(ServiceError::Completion)
            .context(failed())?;
        debug!(
            session_id = %session.id,
            tokens = response.usage.total(),
            "completion received"
        );
        self.sessions
            .append_assistant_message(&mut session, response.content.as_str())
            .await
            .context(failed())?;

        let mut answer = response.content;
        answer.push_str(self.suffixes.pick());

        if !language.is_primary() {
            answer = self
                .translator
                .translate(&answer, SourceLanguage::Known(Language::PRIMARY), language)
                .await
                .map_err(ServiceError::Translation)
                .context(failed())?;
        }

        Ok(Reply::text(answer))
    }
}

/// Converts a session transcript into a completion request.
fn completion_request(session: &Session) -> LlmRequest {
    LlmRequest::new(
        session
            .transcript()
            .iter()
            .map(|message| match message.role {
                MessageRole::System => LlmMessage::system(message.content.as_str()),
                MessageRole::User => LlmMessage::user(message.content.as_str()),
                MessageRole::Assistant => LlmMessage::assistant(message.content.as_str()),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::SUFFIXES;
    use crate::texts::{REPLY_FAILED, SEARCH_FAILED};
    use async_trait::async_trait;
    use rusgo_ai::{LlmError, LlmProvider, LlmResponse, TokenUsage};
    use rusgo_conversation::{SessionPolicy, SessionStore};
    use rusgo_integration::{ConnectorError, Place};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct FakeLlm {
        reply: Result<String, LlmError>,
        requests: Mutex<Vec<LlmRequest>>,
        delay: Duration,
        gate: Option<Barrier>,
    }

    impl FakeLlm {
        fn new(reply: Result<String, LlmError>) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                gate: None,
            }
        }

        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self::new(Ok(text.to_string())))
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self::new(Err(LlmError::Timeout)))
        }

        /// Answers only after `delay`.
        fn slow(text: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Self::new(Ok(text.to_string()))
            })
        }

        /// Answers once `callers` requests are in flight together.
        fn gated(text: &str, callers: usize) -> Arc<Self> {
            Arc::new(Self {
                gate: Some(Barrier::new(callers)),
                ..Self::new(Ok(text.to_string()))
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmBackend for FakeLlm {
        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map(|content| LlmResponse {
                content,
                usage: TokenUsage::default(),
                model: "fake".to_string(),
            })
        }

        fn provider(&self) -> LlmProvider {
            LlmProvider::OpenAiCompatible
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    /// Tags text with its target language code.
    #[derive(Default)]
    struct FakeTranslator {
        calls: Mutex<Vec<(String, SourceLanguage, Language)>>,
        fail: bool,
    }

    impl FakeTranslator {
        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(
            &self,
            text: &str,
            source: SourceLanguage,
            target: Language,
        ) -> Result<String, ConnectorError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source, target));
            if self.fail {
                return Err(ConnectorError::Timeout {
                    service: "google-translate".to_string(),
                });
            }
            Ok(format!("[{target}] {text}"))
        }
    }

    struct FakePlaces {
        result: Result<Vec<Place>, ConnectorError>,
        queries: Mutex<Vec<String>>,
    }

    impl FakePlaces {
        fn returning(places: Vec<Place>) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(places),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err(ConnectorError::RequestFailed {
                    service: "yandex-maps".to_string(),
                    status: 500,
                }),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlacesSearch for FakePlaces {
        async fn search(&self, query: &str) -> Result<Vec<Place>, ConnectorError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.result.clone()
        }
    }

    struct FixedSuffix(&'static str);

    impl SuffixPicker for FixedSuffix {
        fn pick(&self) -> &'static str {
            self.0
        }
    }

    struct Harness {
        assistant: Assistant,
        llm: Arc<FakeLlm>,
        translator: Arc<FakeTranslator>,
        places: Arc<FakePlaces>,
        store: Arc<InMemorySessionStore>,
    }

    fn harness(llm: Arc<FakeLlm>, places: Arc<FakePlaces>, suffix: &'static str) -> Harness {
        build(
            llm,
            Arc::new(FakeTranslator::default()),
            places,
            SessionPolicy::default(),
            suffix,
        )
    }

    fn build(
        llm: Arc<FakeLlm>,
        translator: Arc<FakeTranslator>,
        places: Arc<FakePlaces>,
        policy: SessionPolicy,
        suffix: &'static str,
    ) -> Harness {
        let store = Arc::new(InMemorySessionStore::new());
        let sessions = SessionManager::new(store.clone(), policy, SYSTEM_PROMPT);
        let assistant = Assistant::new(
            llm.clone(),
            translator.clone(),
            places.clone(),
            sessions,
            Arc::new(InMemoryLanguageStore::new()),
            Box::new(FixedSuffix(suffix)),
        );
        Harness {
            assistant,
            llm,
            translator,
            places,
            store,
        }
    }

    fn cafe(name: &str) -> Place {
        Place {
            name: name.to_string(),
            address: "Пушкино, ул. Тургенева, 5".to_string(),
            phone: "+7 495 123-45-67".to_string(),
        }
    }

    const USER: UserId = UserId::new(42);

    #[tokio::test]
    async fn start_offers_languages() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "/start", Utc::now()).await;

        assert_eq!(reply.text, GREETING);
        assert_eq!(reply.keyboard, Some(Keyboard::languages()));
        assert_eq!(h.llm.calls(), 0);
    }

    #[tokio::test]
    async fn first_message_stores_system_user_then_assistant() {
        let h = harness(FakeLlm::replying("Иди в МФЦ."), FakePlaces::returning(vec![]), "");

        let reply = h
            .assistant
            .handle(USER, "Как сделать регистрацию?", Utc::now())
            .await;

        assert_eq!(reply.text, "Иди в МФЦ.");
        assert_eq!(reply.keyboard, None);

        let request = h.llm.requests.lock().unwrap()[0].clone();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].content, "Как сделать регистрацию?");

        let session = h.store.get(USER).await.expect("get").expect("session");
        let roles: Vec<_> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
    }

    #[tokio::test]
    async fn idle_user_gets_a_fresh_session() {
        let h = harness(FakeLlm::replying("ответ"), FakePlaces::returning(vec![]), "");
        let t1 = Utc::now();

        h.assistant.handle(USER, "первый", t1).await;
        let first = h.store.get(USER).await.expect("get").expect("session");

        h.assistant
            .handle(USER, "второй", t1 + chrono::Duration::minutes(31))
            .await;
        let second = h.store.get(USER).await.expect("get").expect("session");

        assert_ne!(first.id, second.id);
        let request = h.llm.requests.lock().unwrap()[1].clone();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "второй");
    }

    #[tokio::test]
    async fn russian_by_default_without_translation() {
        let h = harness(
            FakeLlm::replying("Патент делают в ММЦ."),
            FakePlaces::returning(vec![]),
            SUFFIXES[1],
        );

        let reply = h
            .assistant
            .handle(USER, "Где сделать патент?", Utc::now())
            .await;

        assert_eq!(reply.text, format!("Патент делают в ММЦ.{}", SUFFIXES[1]));
        assert!(h.translator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chosen_language_translates_both_ways() {
        let h = harness(
            FakeLlm::replying("Иди в ММЦ."),
            FakePlaces::returning(vec![]),
            SUFFIXES[3],
        );
        let now = Utc::now();

        let saved = h.assistant.handle(USER, "🇺🇿 O'zbekcha", now).await;
        assert_eq!(saved.text, LANGUAGE_SAVED);
        assert_eq!(saved.keyboard, Some(Keyboard::topics()));

        let reply = h.assistant.handle(USER, "Patent qayerda?", now).await;

        let calls = h.translator.calls.lock().unwrap().clone();
        assert_eq!(
            calls[0],
            (
                "Patent qayerda?".to_string(),
                SourceLanguage::Auto,
                Language::Russian
            )
        );
        let expected_answer = format!("Иди в ММЦ.{}", SUFFIXES[3]);
        assert_eq!(
            calls[1],
            (
                expected_answer.clone(),
                SourceLanguage::Known(Language::Russian),
                Language::Uzbek
            )
        );
        assert_eq!(reply.text, format!("[uz] {expected_answer}"));

        let session = h.store.get(USER).await.expect("get").expect("session");
        assert_eq!(session.transcript()[1].content, "[ru] Patent qayerda?");
        assert_eq!(session.transcript()[2].content, "Иди в ММЦ.");
    }

    #[tokio::test]
    async fn food_keyword_searches_fixed_query() {
        let h = harness(
            FakeLlm::replying("не должен вызываться"),
            FakePlaces::returning(vec![cafe("Теремок")]),
            "",
        );

        let reply = h.assistant.handle(USER, "Кафе рядом есть?", Utc::now()).await;

        assert_eq!(h.places.queries(), vec![FOOD_QUERY.to_string()]);
        assert!(reply.text.starts_with(FOOD_HEADER));
        assert!(reply.text.contains("📍 Теремок\n"));
        assert_eq!(h.llm.calls(), 0);

        let session = h.store.get(USER).await.expect("get").expect("session");
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    async fn food_keyword_without_results() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "где поесть", Utc::now()).await;

        assert_eq!(reply.text, FOOD_EMPTY);
    }

    #[tokio::test]
    async fn search_without_argument_makes_no_calls() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "/найти", Utc::now()).await;

        assert_eq!(reply.text, SEARCH_USAGE);
        assert!(h.places.queries().is_empty());
        assert_eq!(h.llm.calls(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn search_with_results() {
        let h = harness(
            FakeLlm::replying("ok"),
            FakePlaces::returning(vec![cafe("Поликлиника №1"), cafe("Медцентр")]),
            "",
        );

        let reply = h
            .assistant
            .handle(USER, "/найти медосмотр Москва", Utc::now())
            .await;

        assert_eq!(h.places.queries(), vec!["медосмотр Москва".to_string()]);
        assert!(reply.text.starts_with(SEARCH_HEADER));
        assert_eq!(reply.text.matches("📍 ").count(), 2);
    }

    #[tokio::test]
    async fn search_without_results() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "/найти аптека", Utc::now()).await;

        assert_eq!(reply.text, SEARCH_EMPTY);
    }

    #[tokio::test]
    async fn search_failure_is_reported_politely() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::failing(), "");

        let reply = h.assistant.handle(USER, "/найти аптека", Utc::now()).await;

        assert_eq!(reply.text, SEARCH_FAILED);
    }

    #[tokio::test]
    async fn completion_failure_becomes_fixed_message() {
        let h = harness(FakeLlm::failing(), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "Привет", Utc::now()).await;

        assert_eq!(reply.text, REPLY_FAILED);
        let session = h.store.get(USER).await.expect("get").expect("session");
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    async fn translation_failure_discards_untranslated_message() {
        let h = build(
            FakeLlm::replying("ok"),
            FakeTranslator::failing(),
            FakePlaces::returning(vec![]),
            SessionPolicy::default(),
            "",
        );
        let now = Utc::now();
        h.assistant.handle(USER, "🇺🇿 O'zbekcha", now).await;

        let reply = h.assistant.handle(USER, "Patent qayerda?", now).await;

        assert_eq!(reply.text, REPLY_FAILED);
        assert_eq!(h.llm.calls(), 0);
        let session = h.store.get(USER).await.expect("get").expect("session");
        let roles: Vec<_> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::System]);
    }

    #[tokio::test]
    async fn history_cap_never_sends_orphan_answer() {
        let h = build(
            FakeLlm::replying("ответ"),
            Arc::new(FakeTranslator::default()),
            FakePlaces::returning(vec![]),
            SessionPolicy::new(chrono::Duration::minutes(30), 2),
            "",
        );
        let now = Utc::now();

        h.assistant.handle(USER, "первый", now).await;
        h.assistant.handle(USER, "второй", now).await;

        let request = h.llm.requests.lock().unwrap()[1].clone();
        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![SYSTEM_PROMPT, "второй"]);
    }

    #[tokio::test]
    async fn same_user_messages_are_answered_in_turn() {
        let h = harness(
            FakeLlm::slow("ответ", Duration::from_millis(50)),
            FakePlaces::returning(vec![]),
            "",
        );
        let assistant = Arc::new(h.assistant);
        let now = Utc::now();

        let first = {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.handle(USER, "первый", now).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let assistant = Arc::clone(&assistant);
            tokio::spawn(async move { assistant.handle(USER, "второй", now).await })
        };
        first.await.expect("first joins");
        second.await.expect("second joins");

        let request = h.llm.requests.lock().unwrap()[1].clone();
        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![SYSTEM_PROMPT, "первый", "ответ", "второй"]);

        let session = h.store.get(USER).await.expect("get").expect("session");
        assert_eq!(session.message_count(), 5);
    }

    #[tokio::test]
    async fn different_users_do_not_wait_for_each_other() {
        let h = harness(FakeLlm::gated("ответ", 2), FakePlaces::returning(vec![]), "");
        let now = Utc::now();

        // Each completion waits until both are in flight.
        let (first, second) = tokio::time::timeout(Duration::from_secs(1), async {
            tokio::join!(
                h.assistant.handle(UserId::new(1), "первый", now),
                h.assistant.handle(UserId::new(2), "второй", now),
            )
        })
        .await
        .expect("both users answered concurrently");

        assert_eq!(first.text, "ответ");
        assert_eq!(second.text, "ответ");
        assert_eq!(h.llm.calls(), 2);
    }

    #[tokio::test]
    async fn find_button_shows_hint() {
        let h = harness(FakeLlm::replying("ok"), FakePlaces::returning(vec![]), "");

        let reply = h.assistant.handle(USER, "🔍 Найти рядом", Utc::now()).await;

        assert_eq!(reply.text, FIND_HINT);
        assert_eq!(h.llm.calls(), 0);
    }
}
