//! User configuration: sheet tuning, bridge selection, keybindings.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/snap-sheet/config.toml` (default
//! `~/.config/snap-sheet/config.toml`).  Unknown keys are skipped; values
//! that don't parse keep their default and log a warning.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use crate::core::sheet::controller::SheetSettings;
use crate::core::sheet::{MidDragPolicy, SnapState};

// ───────────────────────────────────────── actions ───────────

/// Keyboard-driven sheet commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    OpenSheet,
    HalfSheet,
    CloseSheet,
    RaiseSheet,
    LowerSheet,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::OpenSheet,
        Action::HalfSheet,
        Action::CloseSheet,
        Action::RaiseSheet,
        Action::LowerSheet,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::OpenSheet => "open_sheet",
            Action::HalfSheet => "half_sheet",
            Action::CloseSheet => "close_sheet",
            Action::RaiseSheet => "raise_sheet",
            Action::LowerSheet => "lower_sheet",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short display string for the status bar (e.g. `"↑"`, `"Ctrl+c"`).
    pub fn display(&self) -> String {
        self.format(true)
    }

    fn to_config_string(&self) -> String {
        self.format(false)
    }

    fn format(&self, arrows: bool) -> String {
        let mut s = String::new();
        for (m, label) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(m) {
                s.push_str(label);
            }
        }
        let key = match (self.code, arrows) {
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::Left, _) => "Left".into(),
            (KeyCode::Right, _) => "Right".into(),
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) => "Tab".into(),
            (KeyCode::Home, _) => "Home".into(),
            (KeyCode::End, _) => "End".into(),
            (KeyCode::PageUp, _) => "PageUp".into(),
            (KeyCode::PageDown, _) => "PageDown".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Up"`, `"q"`, `"Esc"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let (mods, key_part) = match s.rsplit_once('+') {
            // A bare "+" is the plus key itself.
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── bridge mode ───────

/// Which transport answers bridge calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeMode {
    /// Canned values from the config file; no host involved.
    #[default]
    Canned,
    /// Spawn `host_command` and talk JSON lines over its stdio.
    Process,
}

impl BridgeMode {
    fn key(self) -> &'static str {
        match self {
            BridgeMode::Canned => "canned",
            BridgeMode::Process => "process",
        }
    }

    fn from_key(s: &str) -> Option<Self> {
        match s {
            "canned" | "dev" => Some(BridgeMode::Canned),
            "process" => Some(BridgeMode::Process),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("snap fractions must satisfy 0 <= open < half < closed <= 1")]
    Fractions,
    #[error("thresholds must be non-negative with closed_to_half <= closed_to_open")]
    Thresholds,
    #[error("{key} must be positive")]
    NonPositive { key: &'static str },
    #[error("bridge = process needs a host_command")]
    MissingHostCommand,
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub sheet: SheetSettings,
    /// Duration of the eased snap animation.
    pub transition_ms: u64,
    /// Redraw interval while idle or animating.
    pub frame_ms: u64,
    /// Layout units per terminal row; thresholds and offsets are in units.
    pub units_per_row: f64,
    pub bridge: BridgeMode,
    pub host_command: Option<String>,
    pub bridge_timeout_ms: u64,
    /// Values the canned transport answers with, keyed by action.
    pub canned: BTreeMap<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            sheet: SheetSettings::default(),
            transition_ms: 300,
            frame_ms: 16,
            units_per_row: 16.0,
            bridge: BridgeMode::Canned,
            host_command: None,
            bridge_timeout_ms: 2000,
            canned: Self::default_canned(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(OpenSheet, vec![KeyBind::new(Char('o'), n)]);
        m.insert(HalfSheet, vec![KeyBind::new(Char('h'), n)]);
        m.insert(CloseSheet, vec![KeyBind::new(Char('c'), n)]);
        m.insert(RaiseSheet, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(LowerSheet, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    fn default_canned() -> BTreeMap<String, Value> {
        use crate::core::bridge::actions::*;
        let mut m = BTreeMap::new();
        m.insert(GET_USER_NAME.to_string(), Value::from("developer"));
        m.insert(GET_AUTH_TOKEN.to_string(), Value::from("dev-token"));
        m.insert(GET_STATUS_BAR_HEIGHT.to_string(), Value::from(0));
        m
    }

    /// Find the action bound to a key event.  When several match, the
    /// binding with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Status-bar hint built from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}/{}: open/half/close | {}/{}: raise/lower | drag the handle | {}: quit",
            self.short_binding(Action::OpenSheet),
            self.short_binding(Action::HalfSheet),
            self.short_binding(Action::CloseSheet),
            self.short_binding(Action::RaiseSheet),
            self.short_binding(Action::LowerSheet),
            self.short_binding(Action::Quit),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sheet.fractions.is_valid() {
            return Err(ConfigError::Fractions);
        }
        if !self.sheet.thresholds.is_valid() {
            return Err(ConfigError::Thresholds);
        }
        if !(self.units_per_row > 0.0) {
            return Err(ConfigError::NonPositive { key: "units_per_row" });
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::NonPositive { key: "frame_ms" });
        }
        if self.bridge == BridgeMode::Process && self.host_command.is_none() {
            return Err(ConfigError::MissingHostCommand);
        }
        Ok(())
    }

    /// Repair whatever `validate` rejects by falling back to defaults.
    fn sanitise(&mut self) {
        while let Err(e) = self.validate() {
            tracing::warn!("config: {e}; using default");
            let d = AppConfig::default();
            match e {
                ConfigError::Fractions => self.sheet.fractions = d.sheet.fractions,
                ConfigError::Thresholds => self.sheet.thresholds = d.sheet.thresholds,
                ConfigError::NonPositive { key: "units_per_row" } => {
                    self.units_per_row = d.units_per_row
                }
                ConfigError::NonPositive { .. } => self.frame_ms = d.frame_ms,
                ConfigError::MissingHostCommand => self.bridge = BridgeMode::Canned,
            }
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, falling back to defaults when it is absent
    /// or unreadable.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) => {
                if path.exists() {
                    tracing::warn!("config: cannot read {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    pub fn parse(s: &str) -> Self {
        let mut cfg = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if !cfg.apply(key, value) {
                tracing::warn!(key, value, "config: ignoring invalid value");
            }
        }

        cfg.sanitise();
        cfg
    }

    /// Apply one `key = value` pair.  Returns `false` if the value was
    /// rejected; unknown keys are accepted and ignored.
    fn apply(&mut self, key: &str, value: &str) -> bool {
        let unquoted = value.trim_matches('"');
        let f = || value.parse::<f64>().ok().filter(|v| v.is_finite());
        let u = || value.parse::<u64>().ok();

        let sheet = &mut self.sheet;
        let slot: Option<&mut f64> = match key {
            "open_fraction" => Some(&mut sheet.fractions.open),
            "half_fraction" => Some(&mut sheet.fractions.half),
            "closed_fraction" => Some(&mut sheet.fractions.closed),
            "closed_to_half" => Some(&mut sheet.thresholds.closed_to_half),
            "closed_to_open" => Some(&mut sheet.thresholds.closed_to_open),
            "half_to_open" => Some(&mut sheet.thresholds.half_to_open),
            "half_to_closed" => Some(&mut sheet.thresholds.half_to_closed),
            "open_to_half" => Some(&mut sheet.thresholds.open_to_half),
            "grab_offset" => Some(&mut sheet.grab_offset),
            "units_per_row" => Some(&mut self.units_per_row),
            _ => None,
        };
        if let Some(slot) = slot {
            return f().map(|v| *slot = v).is_some();
        }

        match key {
            "transition_ms" => u().map(|v| self.transition_ms = v.min(5000)).is_some(),
            "frame_ms" => u().map(|v| self.frame_ms = v.clamp(1, 1000)).is_some(),
            "bridge_timeout_ms" => u().map(|v| self.bridge_timeout_ms = v.max(1)).is_some(),
            "initial_state" => unquoted
                .parse::<SnapState>()
                .map(|s| self.sheet.initial = s)
                .is_ok(),
            "mid_drag_policy" => MidDragPolicy::from_key(unquoted)
                .map(|p| self.sheet.mid_drag = p)
                .is_some(),
            "bridge" => BridgeMode::from_key(unquoted)
                .map(|m| self.bridge = m)
                .is_some(),
            "host_command" => {
                // Only the outer pair belongs to the file format; the command
                // itself may start or end with a quote.
                let command = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                self.host_command = (!command.is_empty()).then(|| command.to_string());
                true
            }
            k if k.starts_with("canned.") => match serde_json::from_str::<Value>(value) {
                Ok(v) => {
                    self.canned.insert(k["canned.".len()..].to_string(), v);
                    true
                }
                Err(_) => false,
            },
            k => {
                let Some(action) = Action::from_config_key(k) else {
                    return true;
                };
                let parsed: Vec<KeyBind> = value
                    .split(',')
                    .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                    .collect();
                if parsed.is_empty() {
                    return false;
                }
                self.bindings.insert(action, parsed);
                true
            }
        }
    }

    pub fn serialise(&self) -> String {
        let s = &self.sheet;
        let mut lines = vec![
            "# snap-sheet configuration".to_string(),
            String::new(),
            "# Snap positions (fraction of screen height, top = 0)".to_string(),
            format!("open_fraction = {}", s.fractions.open),
            format!("half_fraction = {}", s.fractions.half),
            format!("closed_fraction = {}", s.fractions.closed),
            format!("initial_state = {}", s.initial.key()),
            String::new(),
            "# Drag distances (layout units) needed to change state".to_string(),
            format!("closed_to_half = {}", s.thresholds.closed_to_half),
            format!("closed_to_open = {}", s.thresholds.closed_to_open),
            format!("half_to_open = {}", s.thresholds.half_to_open),
            format!("half_to_closed = {}", s.thresholds.half_to_closed),
            format!("open_to_half = {}", s.thresholds.open_to_half),
            format!("grab_offset = {}", s.grab_offset),
            format!("units_per_row = {}", self.units_per_row),
            format!("mid_drag_policy = {}", s.mid_drag.key()),
            String::new(),
            "# Animation".to_string(),
            format!("transition_ms = {}", self.transition_ms),
            format!("frame_ms = {}", self.frame_ms),
            String::new(),
            "# Host bridge: canned | process".to_string(),
            format!("bridge = {}", self.bridge.key()),
            format!(
                "host_command = \"{}\"",
                self.host_command.as_deref().unwrap_or_default()
            ),
            format!("bridge_timeout_ms = {}", self.bridge_timeout_ms),
        ];
        for (action, value) in &self.canned {
            lines.push(format!("canned.{action} = {value}"));
        }
        lines.extend([
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ]);

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the default config path (`$XDG_CONFIG_HOME/snap-sheet/config.toml`).
pub fn default_config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("snap-sheet").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use serde_json::json;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        let mut ev = KeyEvent::new(code, modifiers);
        ev.kind = KeyEventKind::Press;
        ev
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn parse_reads_sheet_tuning() {
        let cfg = AppConfig::parse(
            "open_fraction = 0.05\n\
             half_fraction = 0.5\n\
             closed_to_open = 400\n\
             initial_state = half\n\
             mid_drag_policy = ignore\n\
             transition_ms = 150\n",
        );
        assert_eq!(cfg.sheet.fractions.open, 0.05);
        assert_eq!(cfg.sheet.fractions.half, 0.5);
        assert_eq!(cfg.sheet.thresholds.closed_to_open, 400.0);
        assert_eq!(cfg.sheet.initial, SnapState::Half);
        assert_eq!(cfg.sheet.mid_drag, MidDragPolicy::Ignore);
        assert_eq!(cfg.transition_ms, 150);
    }

    #[test]
    fn unordered_fractions_fall_back_to_defaults() {
        let cfg = AppConfig::parse("open_fraction = 0.9\n");
        assert_eq!(cfg.sheet.fractions, AppConfig::default().sheet.fractions);
    }

    #[test]
    fn garbage_values_keep_defaults() {
        let cfg = AppConfig::parse("grab_offset = tall\nframe_ms = -3\nunknown_key = 1\n");
        assert_eq!(cfg.sheet.grab_offset, 16.0);
        assert_eq!(cfg.frame_ms, 16);
    }

    #[test]
    fn process_bridge_without_command_degrades_to_canned() {
        let cfg = AppConfig::parse("bridge = process\n");
        assert_eq!(cfg.bridge, BridgeMode::Canned);

        let cfg = AppConfig::parse("bridge = process\nhost_command = \"./host.sh\"\n");
        assert_eq!(cfg.bridge, BridgeMode::Process);
        assert_eq!(cfg.host_command.as_deref(), Some("./host.sh"));
    }

    #[test]
    fn canned_values_are_json() {
        let cfg = AppConfig::parse("canned.getUserName = \"ada\"\ncanned.getStatusBarHeight = 2\n");
        assert_eq!(cfg.canned["getUserName"], json!("ada"));
        assert_eq!(cfg.canned["getStatusBarHeight"], json!(2));
    }

    #[test]
    fn bindings_round_trip_through_the_file() {
        let mut cfg = AppConfig::default();
        cfg.bindings.insert(
            Action::OpenSheet,
            vec![KeyBind::new(KeyCode::Char('u'), KeyModifiers::CONTROL)],
        );
        cfg.sheet.initial = SnapState::Open;
        let reparsed = AppConfig::parse(&cfg.serialise());
        assert_eq!(reparsed.bindings, cfg.bindings);
        assert_eq!(reparsed.sheet, cfg.sheet);
        assert_eq!(reparsed.canned, cfg.canned);
    }

    #[test]
    fn match_key_prefers_more_modifiers() {
        let mut cfg = AppConfig::default();
        cfg.bindings.insert(
            Action::CloseSheet,
            vec![KeyBind::new(KeyCode::Char('o'), KeyModifiers::CONTROL)],
        );
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('o'), KeyModifiers::NONE)),
            Some(Action::OpenSheet)
        );
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('o'), KeyModifiers::CONTROL)),
            Some(Action::CloseSheet)
        );
        assert_eq!(cfg.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn key_parsing() {
        assert_eq!(
            KeyBind::parse("Ctrl+Shift+Up"),
            Some(KeyBind::new(
                KeyCode::Up,
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            ))
        );
        assert_eq!(KeyBind::parse("Q"), Some(KeyBind::new(KeyCode::Char('Q'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("+"), Some(KeyBind::new(KeyCode::Char('+'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
    }

    #[test]
    fn host_command_keeps_its_own_quotes() {
        let mut cfg = AppConfig::default();
        cfg.bridge = BridgeMode::Process;
        cfg.host_command = Some(r#"printf "%s""#.into());
        let reparsed = AppConfig::parse(&cfg.serialise());
        assert_eq!(reparsed.host_command.as_deref(), Some(r#"printf "%s""#));
        assert_eq!(reparsed.bridge, BridgeMode::Process);

        let bare = AppConfig::parse("host_command = printf \"%s\"\n");
        assert_eq!(bare.host_command.as_deref(), Some(r#"printf "%s""#));
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.units_per_row = 20.0;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.units_per_row, 20.0);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(cfg.frame_ms, AppConfig::default().frame_ms);
    }
}
