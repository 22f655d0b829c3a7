// WhatsApp — Headless Browser Client
//
// Drives WhatsApp Web in headless Chrome via `headless_chrome`:
//   - one Chrome process per session, persistent profile at the client's
//     profile dir (credentials survive restarts)
//   - a watcher thread probes the page every PAGE_POLL_INTERVAL_MS and turns
//     what it sees into ClientEvents (qr / authenticated / ready /
//     auth_failure / disconnected)
//   - sends go through the `send?phone=` deep link and the compose box's
//     send button, one at a time
//
// Each initialize() bumps a generation counter; a watcher whose generation
// is stale exits without emitting anything.

use super::client::{ClientEvent, EventSender, WhatsAppClient};
use super::phone::chat_id_digits;
use crate::atoms::constants::{
    BROWSER_ARGS, BROWSER_IDLE_TIMEOUT_SECS, PAGE_POLL_INTERVAL_MS, PAIRED_MARKER_FILE,
    PROBE_FAILURE_LIMIT, SEND_TIMEOUT_SECS, WHATSAPP_WEB_URL, WHATSAPP_WEB_VERSION_URL,
};
use crate::atoms::error::{EngineError, EngineResult};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, info, warn};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

// ── Page automation constants ──────────────────────────────────────────

/// WhatsApp Web refuses the default "HeadlessChrome" user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const SEND_BUTTON_SELECTOR: &str =
    r#"span[data-icon="send"], span[data-icon="wds-ic-send-filled"], button[aria-label="Send"]"#;

/// Time given to the page to dispatch a message after clicking send.
const SEND_SETTLE_MS: u64 = 1_500;

/// Reports which screen WhatsApp Web is showing.
const PROBE_SCRIPT: &str = r#"JSON.stringify((() => {
    if (document.querySelector('#pane-side')) return { state: 'ready' };
    const ref = document.querySelector('div[data-ref]');
    const code = ref && ref.getAttribute('data-ref');
    if (code) return { state: 'qr', code };
    return { state: 'loading' };
})())"#;

// ── Options ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Chrome user data dir holding the WhatsApp Web session
    pub profile_dir: PathBuf,
    /// Browser binary override; headless_chrome autodetects when `None`
    pub executable: Option<PathBuf>,
}

// ── Client ─────────────────────────────────────────────────────────────

struct ActiveSession {
    browser: Arc<Browser>,
    tab: Arc<Tab>,
    stop: Arc<AtomicBool>,
}

pub struct BrowserClient {
    options: BrowserOptions,
    events: EventSender,
    /// Held across launch and send so those never interleave.
    session: Mutex<Option<ActiveSession>>,
    generation: Arc<AtomicU64>,
}

impl BrowserClient {
    pub fn new(options: BrowserOptions, events: EventSender) -> Self {
        BrowserClient {
            options,
            events,
            session: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

fn not_initialized() -> EngineError {
    EngineError::client("client is not initialized")
}

#[async_trait]
impl WhatsAppClient for BrowserClient {
    async fn initialize(&self) -> EngineResult<()> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            info!("[whatsapp] Browser session already running");
            return Ok(());
        }

        let options = self.options.clone();
        let had_profile = is_paired(&options.profile_dir);
        info!(
            "[whatsapp] Launching browser with profile {} (stored session: {})",
            options.profile_dir.display(),
            had_profile
        );

        let (browser, tab) = tokio::task::spawn_blocking(move || launch(&options))
            .await
            .map_err(|e| EngineError::Other(e.to_string()))??;

        let stop = Arc::new(AtomicBool::new(false));
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let watcher = Watcher {
            tab: Arc::clone(&tab),
            stop: Arc::clone(&stop),
            events: self.events.clone(),
            generation: Arc::clone(&self.generation),
            my_gen,
            marker: paired_marker(&self.options.profile_dir),
            page: PageWatch::new(had_profile),
        };
        std::thread::Builder::new()
            .name(format!("whatsapp-watcher-{}", my_gen))
            .spawn(move || watcher.run())?;

        *guard = Some(ActiveSession { browser, tab, stop });
        info!("[whatsapp] WhatsApp Web loading (gen {})", my_gen);
        Ok(())
    }

    async fn destroy(&self) -> EngineResult<()> {
        let Some(active) = self.session.lock().await.take() else {
            return Ok(());
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        active.stop.store(true, Ordering::SeqCst);

        tokio::task::spawn_blocking(move || {
            let _ = active.tab.close(true);
            // Dropping the last Browser handle kills the Chrome process.
            drop(active.browser);
        })
        .await
        .map_err(|e| EngineError::Other(e.to_string()))?;

        info!("[whatsapp] Browser session destroyed");
        Ok(())
    }

    async fn logout(&self) -> EngineResult<()> {
        if self.session.lock().await.is_none() {
            return Err(not_initialized());
        }
        self.destroy().await?;

        let profile = self.options.profile_dir.clone();
        if tokio::fs::try_exists(&profile).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&profile).await?;
            info!("[whatsapp] Removed stored session at {}", profile.display());
        }

        let _ = self.events.send(ClientEvent::Disconnected("LOGOUT".into()));
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> EngineResult<()> {
        let guard = self.session.lock().await;
        let tab = guard
            .as_ref()
            .map(|s| Arc::clone(&s.tab))
            .ok_or_else(not_initialized)?;

        let url = send_url(chat_id, text);
        let chat = chat_id.to_string();
        debug!("[whatsapp] Sending to {}", chat);

        tokio::task::spawn_blocking(move || -> EngineResult<()> {
            tab.navigate_to(&url).map_err(EngineError::client)?;
            let button = tab
                .wait_for_element_with_custom_timeout(
                    SEND_BUTTON_SELECTOR,
                    Duration::from_secs(SEND_TIMEOUT_SECS),
                )
                .map_err(|e| {
                    EngineError::client(format!("Could not open chat {}: {}", chat, e))
                })?;
            button.click().map_err(EngineError::client)?;
            std::thread::sleep(Duration::from_millis(SEND_SETTLE_MS));
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Other(e.to_string()))??;

        drop(guard);
        info!("[whatsapp] Message sent to {}", chat_id);
        Ok(())
    }
}

// ── Launch ─────────────────────────────────────────────────────────────

fn launch(options: &BrowserOptions) -> EngineResult<(Arc<Browser>, Arc<Tab>)> {
    std::fs::create_dir_all(&options.profile_dir)?;

    let args: Vec<&OsStr> = BROWSER_ARGS.iter().map(|arg| OsStr::new(*arg)).collect();
    let mut builder = LaunchOptions::default_builder();
    builder
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(Duration::from_secs(BROWSER_IDLE_TIMEOUT_SECS))
        .user_data_dir(Some(options.profile_dir.clone()))
        .args(args);
    if let Some(ref path) = options.executable {
        builder.path(Some(path.clone()));
    }

    let launch_options = builder
        .build()
        .map_err(|e| EngineError::Config(format!("Browser launch options error: {}", e)))?;

    let browser = Browser::new(launch_options).map_err(|e| {
        EngineError::client(format!(
            "Failed to launch Chrome/Chromium: {}. Make sure Chrome or Chromium is installed.",
            e
        ))
    })?;

    let tab = browser.new_tab().map_err(EngineError::client)?;
    tab.set_user_agent(USER_AGENT, None, None)
        .map_err(EngineError::client)?;
    debug!(
        "[whatsapp] Loading live WhatsApp Web (reference build: {})",
        WHATSAPP_WEB_VERSION_URL
    );
    tab.navigate_to(WHATSAPP_WEB_URL).map_err(EngineError::client)?;

    Ok((Arc::new(browser), tab))
}

fn paired_marker(profile_dir: &Path) -> PathBuf {
    profile_dir.join(PAIRED_MARKER_FILE)
}

/// Whether a device was linked with this profile and not logged out since.
fn is_paired(profile_dir: &Path) -> bool {
    paired_marker(profile_dir).is_file()
}

fn mark_paired(marker: &Path) -> EngineResult<()> {
    if marker.is_file() {
        return Ok(());
    }
    std::fs::write(marker, b"")?;
    Ok(())
}

fn send_url(chat_id: &str, text: &str) -> String {
    format!(
        "{}/send?phone={}&text={}",
        WHATSAPP_WEB_URL,
        chat_id_digits(chat_id),
        urlencoding::encode(text)
    )
}

// ── Page watcher ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum PageProbe {
    Ready,
    Qr { code: String },
    Loading,
}

fn parse_probe(value: Option<serde_json::Value>) -> EngineResult<PageProbe> {
    match value {
        Some(serde_json::Value::String(raw)) => Ok(serde_json::from_str(&raw)?),
        _ => Ok(PageProbe::Loading),
    }
}

/// Turns successive page probes into client events.
#[derive(Debug)]
struct PageWatch {
    had_profile: bool,
    ready: bool,
    last_qr: Option<String>,
    auth_failure_reported: bool,
    failed_probes: u32,
}

impl PageWatch {
    fn new(had_profile: bool) -> Self {
        PageWatch {
            had_profile,
            ready: false,
            last_qr: None,
            auth_failure_reported: false,
            failed_probes: 0,
        }
    }

    /// Returns the events to emit and whether watching should stop.
    fn observe(&mut self, probe: PageProbe) -> (Vec<ClientEvent>, bool) {
        self.failed_probes = 0;
        let mut events = Vec::new();
        match probe {
            PageProbe::Ready => {
                if !self.ready {
                    self.ready = true;
                    self.last_qr = None;
                    events.push(ClientEvent::Authenticated);
                    events.push(ClientEvent::Ready);
                }
            }
            PageProbe::Qr { code } => {
                if self.ready {
                    // Linked device was removed from the phone.
                    events.push(ClientEvent::Disconnected("LOGOUT".into()));
                    return (events, true);
                }
                if self.had_profile && !self.auth_failure_reported {
                    self.auth_failure_reported = true;
                    events.push(ClientEvent::AuthFailure(
                        "stored session could not be restored".into(),
                    ));
                }
                if self.last_qr.as_deref() != Some(code.as_str()) {
                    self.last_qr = Some(code.clone());
                    events.push(ClientEvent::Qr(code));
                }
            }
            PageProbe::Loading => {}
        }
        (events, false)
    }

    /// A probe that could not run. Navigation briefly tears down the page's
    /// execution context, so only a run of failures means the browser is gone.
    fn probe_failed(&mut self, error: &str) -> (Vec<ClientEvent>, bool) {
        self.failed_probes += 1;
        if self.failed_probes < PROBE_FAILURE_LIMIT {
            return (Vec::new(), false);
        }
        (vec![ClientEvent::Disconnected(format!("browser session lost: {}", error))], true)
    }
}

struct Watcher {
    tab: Arc<Tab>,
    stop: Arc<AtomicBool>,
    events: EventSender,
    generation: Arc<AtomicU64>,
    my_gen: u64,
    marker: PathBuf,
    page: PageWatch,
}

impl Watcher {
    fn is_current(&self) -> bool {
        !self.stop.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == self.my_gen
    }

    fn run(mut self) {
        let interval = Duration::from_millis(PAGE_POLL_INTERVAL_MS);
        while self.is_current() {
            let probed = self
                .tab
                .evaluate(PROBE_SCRIPT, false)
                .map_err(EngineError::client)
                .and_then(|result| parse_probe(result.value));

            let (events, done) = match probed {
                Ok(probe) => self.page.observe(probe),
                Err(e) => {
                    if !self.is_current() {
                        break;
                    }
                    warn!("[whatsapp] Page probe failed: {}", e);
                    self.page.probe_failed(&e.to_string())
                }
            };

            for event in events {
                if event == ClientEvent::Ready {
                    if let Err(e) = mark_paired(&self.marker) {
                        warn!("[whatsapp] Could not record paired session: {}", e);
                    }
                }
                if !self.is_current() || self.events.send(event).is_err() {
                    return;
                }
            }
            if done {
                break;
            }
            std::thread::sleep(interval);
        }
        debug!("[whatsapp] Watcher gen {} exited", self.my_gen);
    }
}
