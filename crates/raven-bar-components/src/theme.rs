use std::path::{Path, PathBuf};

use gtk4::gdk::Display;
use gtk4::CssProvider;
use tracing::{debug, info, warn};

/// Built-in bar theme, overridden by the user stylesheet
pub const BAR_CSS: &str = r#"
window.raven-bar {
    background-color: rgba(30, 30, 30, 0.85);
    color: #e0e0e0;
    font-size: 13px;
}

window.raven-bar.hidden {
    background-color: transparent;
}

.bar-box {
    padding: 0 6px;
}

.modules-left,
.modules-center,
.modules-right {
    background: transparent;
}

.module {
    padding: 0 8px;
    margin: 0 2px;
}

.module:hover {
    background: rgba(255, 255, 255, 0.08);
    border-radius: 6px;
}

.clock {
    font-weight: bold;
}

.custom.error {
    color: #ff6b6b;
}
"#;

/// Installs the built-in theme and keeps the user stylesheet current
pub struct StyleManager {
    user_path: PathBuf,
    user: CssProvider,
}

impl StyleManager {
    /// Load both stylesheets on the default display
    pub fn install(user_path: &Path) -> Option<Self> {
        let Some(display) = Display::default() else {
            warn!("No default display, skipping CSS");
            return None;
        };

        let base = CssProvider::new();
        base.load_from_data(BAR_CSS);
        gtk4::style_context_add_provider_for_display(
            &display,
            &base,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );

        let user = CssProvider::new();
        gtk4::style_context_add_provider_for_display(
            &display,
            &user,
            gtk4::STYLE_PROVIDER_PRIORITY_USER,
        );
        debug!("CSS theme loaded");

        let manager = Self {
            user_path: user_path.to_path_buf(),
            user,
        };
        manager.reload();
        Some(manager)
    }

    /// Re-read the user stylesheet; a missing file clears it
    pub fn reload(&self) {
        match std::fs::read_to_string(&self.user_path) {
            Ok(css) => {
                self.user.load_from_data(&css);
                info!("Loaded stylesheet {:?}", self.user_path);
            }
            Err(e) => {
                debug!("No user stylesheet at {:?}: {}", self.user_path, e);
                self.user.load_from_data("");
            }
        }
    }
}
