//! Locating and launching the Chrome used for page renders
//!
//! Resolution order: `CHROMIUM_PATH`, well-known install locations for the
//! current platform, `which` on unix, then a Chromium downloaded into the
//! user cache by the chromiumoxide fetcher.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::BrowserConfig;

const CHROMIUM_PATH_VAR: &str = "CHROMIUM_PATH";

const WINDOWS_INSTALLS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

const MACOS_INSTALLS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "~/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

const LINUX_INSTALLS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
    "/opt/google/chrome/chrome",
];

const PATH_COMMANDS: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Flags for every render session: quiet, no first-run UI, no throttling of
/// the background tab we scroll and wait on
const RENDER_FLAGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Only with `browser.disable_security`
const INSECURE_FLAGS: &[&str] = &[
    "--disable-web-security",
    "--disable-features=IsolateOrigins,site-per-process",
    "--ignore-certificate-errors",
];

const NO_SANDBOX_FLAGS: &[&str] = &["--no-sandbox", "--disable-setuid-sandbox"];

/// Profile directory that is removed again unless the launch succeeds
struct ProfileDir {
    path: PathBuf,
    launched: bool,
}

impl ProfileDir {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create profile directory {}", path.display()))?;
        Ok(Self {
            path,
            launched: false,
        })
    }

    /// Hand the directory over to the running session
    fn keep(mut self) {
        self.launched = true;
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.launched {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed profile of failed launch: {}", self.path.display()),
            Err(e) => warn!("Failed to remove profile {}: {}", self.path.display(), e),
        }
    }
}

/// Find an installed Chrome or Chromium
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CHROMIUM_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            debug!("Using browser from {}: {}", CHROMIUM_PATH_VAR, path.display());
            return Ok(path);
        }
        warn!("{} points to a missing file: {}", CHROMIUM_PATH_VAR, path.display());
    }

    if let Some(path) = platform_installs().find(|path| path.exists()) {
        debug!("Found browser at {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows")
        && let Some(path) = PATH_COMMANDS.iter().find_map(|cmd| which(cmd))
    {
        debug!("Found browser on PATH: {}", path.display());
        return Ok(path);
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Install locations for this platform with `~` and `%VAR%` expanded
fn platform_installs() -> impl Iterator<Item = PathBuf> {
    let candidates = if cfg!(target_os = "windows") {
        WINDOWS_INSTALLS
    } else if cfg!(target_os = "macos") {
        MACOS_INSTALLS
    } else {
        LINUX_INSTALLS
    };

    candidates.iter().filter_map(|candidate| {
        if let Some(rest) = candidate.strip_prefix("~/") {
            dirs::home_dir().map(|home| home.join(rest))
        } else if candidate.contains('%') {
            Some(PathBuf::from(expand_windows_env_vars(candidate)))
        } else {
            Some(PathBuf::from(candidate))
        }
    })
}

fn which(cmd: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(cmd).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!found.is_empty()).then(|| PathBuf::from(found))
}

/// Expand `%VAR%` tokens; unknown variables are kept verbatim
fn expand_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            result.push(ch);
            continue;
        }
        let var_name: String = chars.by_ref().take_while(|&c| c != '%').collect();
        if var_name.is_empty() {
            result.push('%');
            continue;
        }
        match std::env::var(&var_name) {
            Ok(value) => result.push_str(&value),
            Err(_) => {
                result.push('%');
                result.push_str(&var_name);
                result.push('%');
            }
        }
    }

    result
}

/// Download Chromium into the user cache and return its executable
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join(".cache"))
        .join("kodegen/chromium");
    info!("No local Chrome, downloading Chromium into {}", cache_dir.display());

    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let installed = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to download Chromium")?;

    info!("Chromium ready at {}", installed.folder_path.display());
    Ok(installed.executable_path)
}

/// Launch one browser for a render session
///
/// `profile_dir` is created here and removed again if the launch fails; on
/// success the caller owns it (see `BrowserWrapper`). The returned handler
/// task must be aborted once the browser is closed.
pub async fn launch_browser(
    config: &BrowserConfig,
    profile_dir: Option<PathBuf>,
    user_agent: &str,
) -> Result<(Browser, JoinHandle<()>)> {
    let executable = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{}, falling back to a managed download", e);
            download_managed_browser().await?
        }
    };

    let profile = ProfileDir::create(profile_dir.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("kodegen_webfetch_{}", std::process::id()))
    }))?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(config.window.width, config.window.height)
        .user_data_dir(profile.path.clone())
        .chrome_executable(executable)
        .arg(format!("--user-agent={user_agent}"));

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let mut flags: Vec<&str> = RENDER_FLAGS.to_vec();
    if config.disable_security {
        warn!("Launching with web security disabled");
        flags.extend_from_slice(INSECURE_FLAGS);
    }
    if config.disable_security || running_in_container() {
        flags.extend_from_slice(NO_SANDBOX_FLAGS);
    }
    for flag in flags {
        builder = builder.arg(flag);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_unknown_cdp_message(&message) {
                    trace!("Ignoring unknown CDP message: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        debug!("Browser handler task completed");
    });

    profile.keep();
    Ok((browser, handler_task))
}

/// chromiumoxide does not model every CDP event Chrome emits
fn is_unknown_cdp_message(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// setuid sandboxing does not work inside containers
fn running_in_container() -> bool {
    std::path::Path::new("/.dockerenv").exists()
        || std::env::var("container").is_ok()
        || std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
}
