//! Application option set and session configuration.

use excel_ole_core::TaggedValue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Recalculation mode (`Application.Calculation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Calculation {
    #[default]
    Automatic,
    Manual,
    SemiAutomatic,
}

impl Calculation {
    /// The `XlCalculation` constant.
    pub fn code(self) -> i32 {
        match self {
            Calculation::Automatic => -4105,
            Calculation::Manual => -4135,
            Calculation::SemiAutomatic => 2,
        }
    }
}

/// Application-level toggles applied when a session starts.
///
/// The set is closed: each field maps to one application property. Changes are
/// pushed field by field, and only for fields whose value differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppOptions {
    /// Show the application window
    pub visible: bool,
    /// Show modal prompts (overwrite confirmations, save-changes dialogs)
    pub display_alerts: bool,
    /// Repaint the window while macros or automation run
    pub screen_updating: bool,
    pub calculation: Calculation,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            visible: true,
            display_alerts: true,
            screen_updating: true,
            calculation: Calculation::Automatic,
        }
    }
}

impl AppOptions {
    /// Options for unattended automation: no window, no prompts, no repainting.
    pub fn headless() -> Self {
        Self {
            visible: false,
            display_alerts: false,
            screen_updating: false,
            calculation: Calculation::Automatic,
        }
    }

    /// Every setting, in the order they are applied.
    pub fn settings(&self) -> Vec<AppSetting> {
        vec![
            AppSetting::Visible(self.visible),
            AppSetting::DisplayAlerts(self.display_alerts),
            AppSetting::ScreenUpdating(self.screen_updating),
            AppSetting::Calculation(self.calculation),
        ]
    }

    /// The settings of `next` that differ from `self`.
    pub fn changes(&self, next: &AppOptions) -> Vec<AppSetting> {
        let mut changed = Vec::new();
        if self.visible != next.visible {
            changed.push(AppSetting::Visible(next.visible));
        }
        if self.display_alerts != next.display_alerts {
            changed.push(AppSetting::DisplayAlerts(next.display_alerts));
        }
        if self.screen_updating != next.screen_updating {
            changed.push(AppSetting::ScreenUpdating(next.screen_updating));
        }
        if self.calculation != next.calculation {
            changed.push(AppSetting::Calculation(next.calculation));
        }
        changed
    }

    /// Record a setting that has been pushed.
    pub fn apply(&mut self, setting: AppSetting) {
        match setting {
            AppSetting::Visible(on) => self.visible = on,
            AppSetting::DisplayAlerts(on) => self.display_alerts = on,
            AppSetting::ScreenUpdating(on) => self.screen_updating = on,
            AppSetting::Calculation(mode) => self.calculation = mode,
        }
    }
}

/// A single application property assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppSetting {
    Visible(bool),
    DisplayAlerts(bool),
    ScreenUpdating(bool),
    Calculation(Calculation),
}

impl AppSetting {
    /// Name of the application property.
    pub fn property(&self) -> &'static str {
        match self {
            AppSetting::Visible(_) => "Visible",
            AppSetting::DisplayAlerts(_) => "DisplayAlerts",
            AppSetting::ScreenUpdating(_) => "ScreenUpdating",
            AppSetting::Calculation(_) => "Calculation",
        }
    }

    /// Value to assign.
    pub fn value(&self) -> TaggedValue {
        match *self {
            AppSetting::Visible(on)
            | AppSetting::DisplayAlerts(on)
            | AppSetting::ScreenUpdating(on) => TaggedValue::bool(on),
            AppSetting::Calculation(mode) => TaggedValue::i4(mode.code()),
        }
    }
}

/// How to start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// ProgID of the application class to instantiate
    pub prog_id: String,
    pub options: AppOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prog_id: "Excel.Application".to_string(),
            options: AppOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Default ProgID with [`AppOptions::headless`].
    pub fn headless() -> Self {
        Self {
            options: AppOptions::headless(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = AppOptions::default();
        assert!(options.visible && options.display_alerts && options.screen_updating);
        assert_eq!(options.calculation, Calculation::Automatic);
        assert_eq!(SessionConfig::default().prog_id, "Excel.Application");
        assert!(!SessionConfig::headless().options.visible);
    }

    #[test]
    fn test_changes_only_lists_differences() {
        let current = AppOptions::default();
        assert!(current.changes(&current).is_empty());

        let next = AppOptions {
            display_alerts: false,
            calculation: Calculation::Manual,
            ..current
        };
        assert_eq!(
            current.changes(&next),
            vec![
                AppSetting::DisplayAlerts(false),
                AppSetting::Calculation(Calculation::Manual),
            ]
        );
    }

    #[test]
    fn test_headless_changes_three_toggles() {
        let changes = AppOptions::default().changes(&AppOptions::headless());
        let names: Vec<_> = changes.iter().map(AppSetting::property).collect();
        assert_eq!(names, vec!["Visible", "DisplayAlerts", "ScreenUpdating"]);
    }

    #[test]
    fn test_apply_settles_changes() {
        let mut current = AppOptions::default();
        let next = AppOptions::headless();
        for setting in current.changes(&next) {
            current.apply(setting);
        }
        assert_eq!(current, next);
    }

    #[test]
    fn test_setting_values() {
        assert_eq!(AppSetting::Visible(true).value(), TaggedValue::bool(true));
        assert_eq!(
            AppSetting::Calculation(Calculation::Manual).value(),
            TaggedValue::i4(-4135)
        );
        assert_eq!(AppOptions::headless().settings().len(), 4);
    }
}
