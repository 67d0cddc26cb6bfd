//! Navigation for Drive OS
//!
//! A single stack navigator over four screens. Start is the initial route.
//! Navigating to a screen already on the stack pops back to it instead of
//! pushing a duplicate.

use serde::{Deserialize, Serialize};

// =============================================================================
// Screens
// =============================================================================

/// All screens in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Screen {
    /// Landing screen
    #[default]
    Start,
    /// Email/password sign-in and sign-up
    Auth,
    /// Live map with search and routing
    Map,
    /// Theme toggles
    Settings,
}

impl Screen {
    /// All screens, in registration order
    pub fn all() -> [Screen; 4] {
        [Screen::Start, Screen::Auth, Screen::Map, Screen::Settings]
    }

    /// Route name
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Start => "Start",
            Screen::Auth => "Auth",
            Screen::Map => "Map",
            Screen::Settings => "Settings",
        }
    }

    /// Deep link path
    pub fn to_path(&self) -> &'static str {
        match self {
            Screen::Start => "/",
            Screen::Auth => "/auth",
            Screen::Map => "/map",
            Screen::Settings => "/settings",
        }
    }

    /// Match a deep link path, ignoring any query string and trailing slash
    pub fn from_path(path: &str) -> Option<Screen> {
        let pathname = path.split('?').next().unwrap_or_default();
        let pathname = pathname.trim_end_matches('/');
        Screen::all()
            .into_iter()
            .find(|screen| screen.to_path().trim_end_matches('/') == pathname)
    }

    /// Presentation options for this screen
    pub fn options(&self) -> ScreenOptions {
        match self {
            Screen::Settings => ScreenOptions {
                header_shown: true,
                title: Some("Settings"),
            },
            _ => ScreenOptions::default(),
        }
    }
}

/// Per-screen presentation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenOptions {
    /// Whether the navigator draws a header bar
    pub header_shown: bool,
    /// Header title
    pub title: Option<&'static str>,
}

// =============================================================================
// Start screen
// =============================================================================

/// Buttons on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartAction {
    /// "Get Started"
    GetStarted,
    /// "Explore Map"
    ExploreMap,
}

impl StartAction {
    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            StartAction::GetStarted => "Get Started",
            StartAction::ExploreMap => "Explore Map",
        }
    }

    /// Screen the button leads to
    pub fn target(&self) -> Screen {
        match self {
            StartAction::GetStarted => Screen::Auth,
            StartAction::ExploreMap => Screen::Map,
        }
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The screen
    pub screen: Screen,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Stack navigator
///
/// The stack always holds at least its root entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigator {
    /// Root entry
    root: StackEntry,
    /// Entries above the root (bottom to top)
    above: Vec<StackEntry>,
    /// Session restore in progress
    #[serde(skip)]
    loading: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Create a navigator at the start screen
    pub fn new() -> Self {
        Self::with_root(Screen::default())
    }

    /// Create a navigator rooted at `screen`
    pub fn with_root(screen: Screen) -> Self {
        Self {
            root: StackEntry::new(screen),
            above: Vec::new(),
            loading: false,
        }
    }

    /// Navigate to `screen`
    ///
    /// Pops back to an existing entry for the screen, or pushes a new one.
    pub fn navigate(&mut self, screen: Screen) {
        if self.root.screen == screen {
            self.above.clear();
        } else if let Some(index) = self.above.iter().position(|e| e.screen == screen) {
            self.above.truncate(index + 1);
        } else {
            self.above.push(StackEntry::new(screen));
        }
    }

    /// Push `screen` even if it is already on the stack
    pub fn push(&mut self, screen: Screen) {
        self.above.push(StackEntry::new(screen));
    }

    /// Pop the top screen (returns true if popped, false if at root)
    pub fn go_back(&mut self) -> bool {
        self.above.pop().is_some()
    }

    /// Replace the whole stack with `screen`
    pub fn reset(&mut self, screen: Screen) {
        self.root = StackEntry::new(screen);
        self.above.clear();
    }

    /// Top entry
    pub fn current_entry(&self) -> &StackEntry {
        self.above.last().unwrap_or(&self.root)
    }

    /// Top screen
    pub fn current(&self) -> Screen {
        self.current_entry().screen
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        !self.above.is_empty()
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }

    /// Screens on the stack, bottom to top
    pub fn screens(&self) -> Vec<Screen> {
        std::iter::once(&self.root)
            .chain(self.above.iter())
            .map(|e| e.screen)
            .collect()
    }

    /// Mark session restore as started or finished
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether the session is still being restored
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Screen to render, or `None` while loading
    pub fn visible(&self) -> Option<Screen> {
        if self.loading {
            None
        } else {
            Some(self.current())
        }
    }
}
