//! Configuration
//!
//! Every section falls back to its defaults when omitted, so an empty
//! JSON object yields the stock portfolio behavior.

use folio_dom::{IntersectionOptions, ScrollBehavior};
use serde::{Deserialize, Serialize};

use crate::error::{EnhanceError, Result};

/// Longest delay a host timer can hold (ms)
pub const MAX_DELAY_MS: u64 = i32::MAX as u64;

/// Top-level configuration structure for the enhancement layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub selectors: SelectorConfig,
    pub classes: ClassConfig,
    pub scroll_spy: ScrollSpyConfig,
    pub navbar: NavbarConfig,
    pub smooth_scroll: SmoothScrollConfig,
    pub fade_in: FadeInConfig,
    pub loader: LoaderConfig,
    pub timing: TimingConfig,
    pub scroll: ScrollConfig,
    pub diagnostics: DiagnosticsConfig,
    /// Typing effect on the hero subtitle; off unless configured
    pub typewriter: Option<TypewriterConfig>,
}

impl EnhanceConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fade_in.intersection_options()?;

        if self.scroll.throttle_ms == Some(0) {
            return Err(EnhanceError::invalid_option("scroll.throttle_ms", "must be positive"));
        }
        if let Some(typewriter) = &self.typewriter {
            if typewriter.speed_ms == 0 {
                return Err(EnhanceError::invalid_option("typewriter.speed_ms", "must be positive"));
            }
        }
        let delays = [
            ("loader.fade_delay_ms", Some(self.loader.fade_delay_ms)),
            ("loader.hide_delay_ms", Some(self.loader.hide_delay_ms)),
            ("timing.debounce_ms", Some(self.timing.debounce_ms)),
            ("timing.throttle_ms", Some(self.timing.throttle_ms)),
            ("scroll.throttle_ms", self.scroll.throttle_ms),
            ("typewriter.speed_ms", self.typewriter.as_ref().map(|t| t.speed_ms)),
        ];
        for (name, delay) in delays {
            if delay.is_some_and(|ms| ms > MAX_DELAY_MS) {
                return Err(EnhanceError::invalid_option(
                    name,
                    format!("must be at most {MAX_DELAY_MS} ms"),
                ));
            }
        }

        for (name, value) in [
            ("scroll_spy.lead_px", self.scroll_spy.lead_px),
            ("navbar.threshold_px", self.navbar.threshold_px),
            ("smooth_scroll.offset_px", self.smooth_scroll.offset_px),
        ] {
            if !value.is_finite() {
                return Err(EnhanceError::invalid_option(name, "must be a finite number"));
            }
        }

        Ok(())
    }
}

/// Selectors for the elements each behavior binds to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub hamburger: String,
    pub nav_menu: String,
    pub nav_link: String,
    pub sections: String,
    pub navbar: String,
    pub loader: String,
    pub anchors: String,
    pub fade_targets: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            hamburger: ".hamburger".to_string(),
            nav_menu: ".nav-menu".to_string(),
            nav_link: ".nav-link".to_string(),
            sections: "section[id]".to_string(),
            navbar: ".navbar".to_string(),
            loader: ".loader".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
            fade_targets: ".skill-card, .project-card, .contact-item, .about-text".to_string(),
        }
    }
}

/// Presentation classes toggled on elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    /// Set on the nav menu while the mobile menu is open
    pub menu_open: String,
    /// Set on the nav link of the current section
    pub active: String,
    pub revealed: String,
    pub scrolled: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            menu_open: "active".to_string(),
            active: "active".to_string(),
            revealed: "fade-in".to_string(),
            scrolled: "scrolled".to_string(),
        }
    }
}

/// Which section wins when several contain the scroll offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Later sections in document order overwrite earlier ones
    #[default]
    LastMatch,
    FirstMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSpyConfig {
    /// How far above its top a section already counts as current
    pub lead_px: f64,
    pub tie_break: TieBreak,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            lead_px: 100.0,
            tie_break: TieBreak::LastMatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub threshold_px: f64,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self { threshold_px: 100.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Fixed navbar height subtracted from the target's offset
    pub offset_px: f64,
    pub behavior: ScrollBehavior,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            offset_px: 70.0,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeInConfig {
    pub threshold: f64,
    pub root_margin: String,
    /// Stop observing an element once it has been revealed
    pub unobserve_revealed: bool,
}

impl Default for FadeInConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            unobserve_revealed: false,
        }
    }
}

impl FadeInConfig {
    pub fn intersection_options(&self) -> Result<IntersectionOptions> {
        Ok(IntersectionOptions::new(&[self.threshold], &self.root_margin)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delay after load before the overlay fades
    pub fade_delay_ms: u64,
    /// Delay after the fade starts before the overlay leaves layout
    pub hide_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fade_delay_ms: 500,
            hide_delay_ms: 500,
        }
    }
}

/// Default delays for `Enhancer::debounce` / `Enhancer::throttle`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub debounce_ms: u64,
    pub throttle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::timing::DEFAULT_DEBOUNCE_MS,
            throttle_ms: crate::timing::DEFAULT_THROTTLE_MS,
        }
    }
}

/// Scroll handler rate limiting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Wrap the scroll spy and navbar handlers in a leading-edge throttle
    pub throttle_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Host names on which the critical element check runs
    pub local_hosts: Vec<String>,
    pub critical_selectors: Vec<String>,
    /// Lines logged once at startup
    pub banners: Vec<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            local_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            critical_selectors: [".navbar", ".hero", ".projects", ".contact"]
                .into_iter()
                .map(String::from)
                .collect(),
            banners: vec![
                "Portfolio designed for Bernard Martin Lawan".to_string(),
                "Architect specialised in sustainable urban design".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub selector: String,
    /// Delay between typed characters
    pub speed_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            selector: ".hero-subtitle".to_string(),
            speed_ms: 80,
        }
    }
}
