//! Bot controller
//!
//! One entry point per incoming chat event: classify, then either run the
//! forecast workflow or answer a command. The forecast workflow keeps the
//! user informed through a single progress message that is edited in
//! place and redacted once the final image is delivered.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use wx_browser::{ForecastResult, ScrapeStage};
use wx_core::{Coordinates, CredentialStatus, CredentialStore};

use crate::commands::Command;
use crate::error::Result;
use crate::event::{ChatEvent, EventContent, RoomId, UserId};
use crate::responder::{MediaMessage, MessageHandle, Responder};
use crate::scrape::{CredentialProbe, ForecastProvider};

/// Controller configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// The bot's own user id; events from it are ignored
    pub self_id: UserId,
    /// URL of the login form, advertised in help and auth replies
    pub login_url: String,
    /// Dimensions reported with the forecast image
    pub image_width: u32,
    pub image_height: u32,
}

impl BotConfig {
    pub fn new(self_id: impl Into<String>, login_url: impl Into<String>) -> Self {
        Self {
            self_id: UserId(self_id.into()),
            login_url: login_url.into(),
            image_width: 1245,
            image_height: 800,
        }
    }
}

/// The bot controller
pub struct BotController {
    config: BotConfig,
    responder: Arc<dyn Responder>,
    provider: Arc<dyn ForecastProvider>,
    probe: Arc<dyn CredentialProbe>,
    store: CredentialStore,
}

impl BotController {
    pub fn new(
        config: BotConfig,
        responder: Arc<dyn Responder>,
        provider: Arc<dyn ForecastProvider>,
        probe: Arc<dyn CredentialProbe>,
        store: CredentialStore,
    ) -> Self {
        Self {
            config,
            responder,
            provider,
            probe,
            store,
        }
    }

    /// Handle one incoming chat event
    pub async fn handle_event(&self, event: ChatEvent) -> Result<()> {
        // Replying to our own messages would echo forever
        if event.sender == self.config.self_id {
            return Ok(());
        }

        info!("Message received from {}", event.sender);

        match event.content {
            EventContent::Location { ref geo_uri } => {
                match Coordinates::from_geo_uri(geo_uri) {
                    Some(coords) => self.run_forecast(&event.room, coords).await,
                    None => {
                        warn!("Unparseable geo URI: {}", geo_uri);
                        self.responder
                            .send(&event.room, "Could not parse the shared location.")
                            .await?;
                        Ok(())
                    }
                }
            }
            EventContent::Text { ref body } => match Command::classify(body) {
                Command::Forecast(coords) => self.run_forecast(&event.room, coords).await,
                Command::Version => self.send_version(&event.room).await,
                Command::Auth => self.send_auth_status(&event.room).await,
                Command::Help => self.send_help(&event.room).await,
            },
        }
    }

    /// Forecast workflow: progress message, scrape, media delivery
    async fn run_forecast(&self, room: &RoomId, coords: Coordinates) -> Result<()> {
        info!("Fetching forecast for {}", coords);

        let handle = self.responder.send(room, "Fetching weather…").await?;

        // Stage updates arrive from the blocking scrape; a separate task
        // folds them into the progress message.
        let (stage_tx, mut stage_rx) = mpsc::unbounded_channel::<ScrapeStage>();
        let responder = Arc::clone(&self.responder);
        let stage_room = room.clone();
        let stage_handle = handle.clone();
        let stage_task = tokio::spawn(async move {
            while let Some(stage) = stage_rx.recv().await {
                let text = match stage {
                    ScrapeStage::Launching => "Launching browser…",
                    ScrapeStage::Loading => "Loading forecast…",
                    ScrapeStage::Extracting => "Extracting forecast…",
                };
                if responder.edit(&stage_room, &stage_handle, text).await.is_err() {
                    break;
                }
            }
        });

        let cookies = self.store.get().await;
        let result = self.provider.forecast(coords, cookies, stage_tx).await;

        // The sender is gone once the provider returns; wait for the last
        // stage edit so the final edit below cannot be overwritten.
        let _ = stage_task.await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                warn!("Forecast scrape failed: {}", e);
                self.responder
                    .edit(
                        room,
                        &handle,
                        "Something went wrong fetching the forecast. Please try again later.",
                    )
                    .await?;
                return Ok(());
            }
        };

        self.deliver_result(room, &handle, &coords, result).await
    }

    async fn deliver_result(
        &self,
        room: &RoomId,
        handle: &MessageHandle,
        coords: &Coordinates,
        result: ForecastResult,
    ) -> Result<()> {
        let glyph = if result.authenticated { "🔓" } else { "🔒" };
        let place = if result.place.is_empty() {
            coords.to_string()
        } else {
            result.place.clone()
        };

        match result.image {
            Some(bytes) => {
                self.responder
                    .edit(room, handle, "Storing forecast…")
                    .await?;

                let caption = format!("Weather for {} {}", place, glyph);
                let media = MediaMessage::png(
                    bytes,
                    self.config.image_width,
                    self.config.image_height,
                    caption,
                );
                self.responder.send_media(room, media).await?;

                // The image supersedes the progress message
                self.responder.redact(room, handle).await?;

                info!("Forecast delivered for {}", place);
            }
            None => {
                self.responder
                    .edit(
                        room,
                        handle,
                        &format!("Weather for {} {}. Forecast did not load.", place, glyph),
                    )
                    .await?;

                info!("Degraded forecast outcome for {}", place);
            }
        }

        Ok(())
    }

    async fn send_version(&self, room: &RoomId) -> Result<()> {
        let text = format!("wx-gateway {}", env!("CARGO_PKG_VERSION"));
        self.responder.send(room, &text).await?;
        Ok(())
    }

    async fn send_auth_status(&self, room: &RoomId) -> Result<()> {
        match self.probe.check().await {
            CredentialStatus::Valid => {
                self.responder
                    .send(room, "🔓 Logged in to windy.com. Premium forecasts are enabled.")
                    .await?;
            }
            CredentialStatus::Invalid => {
                let html = format!(
                    "🔒 Your windy.com session is no longer valid. \
                     <a href=\"{}\">Log in again</a> to re-enable premium forecasts.",
                    self.config.login_url
                );
                self.responder.send_html(room, &html).await?;
            }
            CredentialStatus::Absent => {
                let html = format!(
                    "🔒 Not logged in to windy.com. \
                     <a href=\"{}\">Log in</a> to enable premium forecasts.",
                    self.config.login_url
                );
                self.responder.send_html(room, &html).await?;
            }
        }
        Ok(())
    }

    async fn send_help(&self, room: &RoomId) -> Result<()> {
        let html = format!(
            "Either share a location with me, or message me the coordinates you \
             want the weather for: \"&lt;lat&gt; &lt;lon&gt;\".<br>\
             Commands: <code>version</code>, <code>auth</code>.<br>\
             <a href=\"{}\">Log in to windy.com</a> for premium forecasts.",
            self.config.login_url
        );
        self.responder.send_html(room, &html).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::BotError;
    use wx_core::SessionCookies;

    /// Everything the stub responder saw, in order
    #[derive(Debug, Default)]
    struct Recorded {
        sends: Vec<String>,
        htmls: Vec<String>,
        edits: Vec<(String, String)>,
        redacts: Vec<String>,
        media: Vec<MediaMessage>,
    }

    #[derive(Default)]
    struct StubResponder {
        rec: Mutex<Recorded>,
    }

    #[async_trait]
    impl Responder for StubResponder {
        async fn send(&self, _room: &RoomId, text: &str) -> Result<MessageHandle> {
            let mut rec = self.rec.lock().unwrap();
            rec.sends.push(text.to_string());
            Ok(MessageHandle(format!("m{}", rec.sends.len())))
        }

        async fn send_html(&self, _room: &RoomId, html: &str) -> Result<MessageHandle> {
            let mut rec = self.rec.lock().unwrap();
            rec.htmls.push(html.to_string());
            Ok(MessageHandle(format!("h{}", rec.htmls.len())))
        }

        async fn edit(&self, _room: &RoomId, handle: &MessageHandle, text: &str) -> Result<()> {
            let mut rec = self.rec.lock().unwrap();
            rec.edits.push((handle.0.clone(), text.to_string()));
            Ok(())
        }

        async fn redact(&self, _room: &RoomId, handle: &MessageHandle) -> Result<()> {
            let mut rec = self.rec.lock().unwrap();
            rec.redacts.push(handle.0.clone());
            Ok(())
        }

        async fn send_media(&self, _room: &RoomId, media: MediaMessage) -> Result<()> {
            let mut rec = self.rec.lock().unwrap();
            rec.media.push(media);
            Ok(())
        }
    }

    /// Scraper stub returning a preset outcome and recording the input
    struct StubProvider {
        result: Option<ForecastResult>,
        seen: Mutex<Option<Coordinates>>,
        seen_cookies: Mutex<Option<SessionCookies>>,
    }

    impl StubProvider {
        fn with_result(result: ForecastResult) -> Self {
            Self {
                result: Some(result),
                seen: Mutex::new(None),
                seen_cookies: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                result: None,
                seen: Mutex::new(None),
                seen_cookies: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        async fn forecast(
            &self,
            coords: Coordinates,
            cookies: Option<SessionCookies>,
            stages: mpsc::UnboundedSender<ScrapeStage>,
        ) -> Result<ForecastResult> {
            *self.seen.lock().unwrap() = Some(coords);
            *self.seen_cookies.lock().unwrap() = cookies;
            let _ = stages.send(ScrapeStage::Launching);
            let _ = stages.send(ScrapeStage::Extracting);
            match &self.result {
                Some(result) => Ok(result.clone()),
                None => Err(BotError::Scrape("browser exploded".to_string())),
            }
        }
    }

    struct StubProbe {
        status: CredentialStatus,
    }

    #[async_trait]
    impl CredentialProbe for StubProbe {
        async fn check(&self) -> CredentialStatus {
            self.status
        }
    }

    struct Harness {
        controller: BotController,
        responder: Arc<StubResponder>,
        provider: Arc<StubProvider>,
        store: CredentialStore,
    }

    fn harness(provider: StubProvider, status: CredentialStatus) -> Harness {
        let responder = Arc::new(StubResponder::default());
        let provider = Arc::new(provider);
        let store = CredentialStore::new();
        let controller = BotController::new(
            BotConfig::new("@wxbot", "http://localhost:8080/login"),
            Arc::clone(&responder) as Arc<dyn Responder>,
            Arc::clone(&provider) as Arc<dyn ForecastProvider>,
            Arc::new(StubProbe { status }),
            store.clone(),
        );
        Harness {
            controller,
            responder,
            provider,
            store,
        }
    }

    fn image_result() -> ForecastResult {
        ForecastResult {
            place: "London".to_string(),
            authenticated: false,
            image: Some(vec![0x89, 0x50, 0x4e, 0x47]),
        }
    }

    fn degraded_result() -> ForecastResult {
        ForecastResult {
            place: "London".to_string(),
            authenticated: false,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_self_events_are_ignored() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@wxbot", "51.5074 -0.1278"))
            .await
            .unwrap();
        h.controller
            .handle_event(ChatEvent::location("!room", "@wxbot", "geo:1.0,2.0"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert!(rec.sends.is_empty());
        assert!(rec.htmls.is_empty());
        assert!(rec.media.is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_gets_help_exactly_once() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "hello there"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.htmls.len(), 1);
        assert!(rec.htmls[0].contains("share a location"));
        assert!(rec.htmls[0].contains("http://localhost:8080/login"));
        assert!(rec.sends.is_empty());
    }

    #[tokio::test]
    async fn test_forecast_with_image() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "51.5074 -0.1278"))
            .await
            .unwrap();

        // Extractor fed the exact pair into the workflow
        let seen = h.provider.seen.lock().unwrap().unwrap();
        assert_eq!(seen, Coordinates::new(51.5074, -0.1278));

        let rec = h.responder.rec.lock().unwrap();
        // Exactly one progress message, edited at least once
        assert_eq!(rec.sends.len(), 1);
        assert_eq!(rec.sends[0], "Fetching weather…");
        assert!(!rec.edits.is_empty());
        // Exactly one media message with place name and lock glyph
        assert_eq!(rec.media.len(), 1);
        assert_eq!(rec.media[0].mime_type, "image/png");
        assert_eq!(rec.media[0].width, 1245);
        assert_eq!(rec.media[0].height, 800);
        assert!(rec.media[0].caption.contains("Weather for London"));
        assert!(rec.media[0].caption.contains("🔒"));
        // Progress message redacted after the image was delivered
        assert_eq!(rec.redacts, vec!["m1".to_string()]);
    }

    #[tokio::test]
    async fn test_forecast_without_image() {
        let h = harness(StubProvider::with_result(degraded_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "51.5074 -0.1278"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert!(rec.media.is_empty());
        assert!(rec.redacts.is_empty());
        let (_, last_edit) = rec.edits.last().unwrap();
        assert!(last_edit.contains("Forecast did not load"));
        assert!(last_edit.contains("London"));
    }

    #[tokio::test]
    async fn test_forecast_failure_resolves_progress_message() {
        let h = harness(StubProvider::failing(), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "51.5074 -0.1278"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.sends.len(), 1);
        assert!(rec.media.is_empty());
        let (_, last_edit) = rec.edits.last().unwrap();
        assert!(last_edit.contains("Something went wrong"));
    }

    #[tokio::test]
    async fn test_authenticated_result_uses_unlock_glyph() {
        let result = ForecastResult {
            authenticated: true,
            ..image_result()
        };
        let h = harness(StubProvider::with_result(result), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "51.5074 -0.1278"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert!(rec.media[0].caption.contains("🔓"));
    }

    #[tokio::test]
    async fn test_stored_cookies_reach_the_provider() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);
        h.store.set(SessionCookies::new("sid", "ss")).await;

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "51.5074 -0.1278"))
            .await
            .unwrap();

        let cookies = h.provider.seen_cookies.lock().unwrap().clone().unwrap();
        assert_eq!(cookies.sid, "sid");
    }

    #[tokio::test]
    async fn test_location_event() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::location("!room", "@alice", "geo:48.2082,16.3738"))
            .await
            .unwrap();

        let seen = h.provider.seen.lock().unwrap().unwrap();
        assert_eq!(seen, Coordinates::new(48.2082, 16.3738));
    }

    #[tokio::test]
    async fn test_malformed_location_reports_parse_failure() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::location("!room", "@alice", "geo:somewhere"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.sends.len(), 1);
        assert!(rec.sends[0].contains("Could not parse"));
        assert!(h.provider.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_version_command() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "version"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.sends.len(), 1);
        assert!(rec.sends[0].starts_with("wx-gateway "));
    }

    #[tokio::test]
    async fn test_auth_absent_prompts_login() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Absent);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "auth"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.htmls.len(), 1);
        assert!(rec.htmls[0].contains("Not logged in"));
        assert!(rec.htmls[0].contains("http://localhost:8080/login"));
    }

    #[tokio::test]
    async fn test_auth_valid() {
        let h = harness(StubProvider::with_result(image_result()), CredentialStatus::Valid);

        h.controller
            .handle_event(ChatEvent::text("!room", "@alice", "auth"))
            .await
            .unwrap();

        let rec = h.responder.rec.lock().unwrap();
        assert_eq!(rec.sends.len(), 1);
        assert!(rec.sends[0].contains("Logged in"));
    }
}
