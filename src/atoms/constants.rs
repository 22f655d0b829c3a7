// ── Atoms: Constants ───────────────────────────────────────────────────────
// All named constants for the crate live here.

// ── HTTP listener ──────────────────────────────────────────────────────────
pub const DEFAULT_PORT: u16 = 3001;
pub const BIND_ADDRESS: &str = "0.0.0.0";

// ── Session storage ────────────────────────────────────────────────────────
// Directory under $TEMP when it is set; otherwise LOCAL_SESSION_DIR under the
// working directory. The browser profile for CLIENT_ID lives at
// `<session root>/session-<CLIENT_ID>`. Treat as stable identifiers: renaming
// any of them orphans an already paired session.
pub const TEMP_SESSION_DIR: &str = "ssi_whatsapp_auth";
pub const LOCAL_SESSION_DIR: &str = ".wwebjs_auth";
pub const CLIENT_ID: &str = "ssi-session";

// ── Recipient addressing ───────────────────────────────────────────────────
// Ten-digit numbers are assumed to be Indian mobile numbers.
pub const COUNTRY_PREFIX: &str = "91";
pub const LOCAL_NUMBER_DIGITS: usize = 10;
pub const CHAT_ID_SUFFIX: &str = "@c.us";

// ── Browser automation ─────────────────────────────────────────────────────
pub const WHATSAPP_WEB_URL: &str = "https://web.whatsapp.com";

/// Known-good WhatsApp Web build the session was pinned to. The browser
/// client loads the live site and only logs this; serving it in place of
/// the live page would need CDP `Fetch` interception of the main document.
pub const WHATSAPP_WEB_VERSION_URL: &str =
    "https://raw.githubusercontent.com/wppconnect-team/wa-version/main/html/2.3000.1014590913-alpha.html";

/// Extra Chrome flags. `--no-sandbox` is covered by `sandbox(false)`.
pub const BROWSER_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--no-zygote",
    "--disable-gpu",
    "--disable-features=site-per-process",
];

/// How often the watcher inspects the WhatsApp Web page.
pub const PAGE_POLL_INTERVAL_MS: u64 = 2_000;
/// Consecutive failed page probes before the browser is reported lost.
/// A single failure is normal while a send navigates the tab.
pub const PROBE_FAILURE_LIMIT: u32 = 3;
/// Written into the profile dir once WhatsApp Web reaches the chat list.
/// Chrome populates the profile on first launch, so a non-empty dir alone
/// does not mean a device was ever linked.
pub const PAIRED_MARKER_FILE: &str = ".paired";
/// How long a send waits for the compose box to become usable.
pub const SEND_TIMEOUT_SECS: u64 = 45;
/// headless_chrome tears the browser down after this much CDP silence.
/// The watcher keeps traffic flowing, so this only fires if it is wedged.
pub const BROWSER_IDLE_TIMEOUT_SECS: u64 = 600;

// ── Reconnect policy ───────────────────────────────────────────────────────
pub const RECONNECT_MAX_ATTEMPTS: u32 = 5;
pub const RECONNECT_BASE_DELAY_MS: u64 = 1_000;
/// Maximum reconnect delay cap (5 minutes).
pub const RECONNECT_MAX_DELAY_MS: u64 = 300_000;
