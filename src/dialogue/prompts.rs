use crate::turn::PromptItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt set a session plays from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    Original,
    Instrumented,
}

impl PromptVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::Original => "original",
            PromptVariant::Instrumented => "instrumented",
        }
    }

    /// Instrumented prompts for callers whose identity starts with one of `prefixes`
    pub fn for_caller(caller: Option<&str>, prefixes: &[String]) -> Self {
        match caller.map(str::trim) {
            Some(caller)
                if !caller.is_empty()
                    && prefixes
                        .iter()
                        .any(|p| !p.is_empty() && caller.starts_with(p.as_str())) =>
            {
                PromptVariant::Instrumented
            }
            _ => PromptVariant::Original,
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How prompt names become prompt items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// `AudioSegment` pointing at the resolved resource path
    Audio,
    /// `SynthesizedText` carrying the prompt name
    Synthesis,
}

/// Per-session prompt resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCatalog {
    base_path: String,
    variant: PromptVariant,
    audio_ext: String,
    mode: PromptMode,
}

impl PromptCatalog {
    pub fn new(
        base_path: impl Into<String>,
        variant: PromptVariant,
        audio_ext: impl Into<String>,
        mode: PromptMode,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            variant,
            audio_ext: audio_ext.into(),
            mode,
        }
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    /// `{base_path}/{variant}/{name}.{audio_ext}`
    pub fn resource_path(&self, name: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        let ext = self.audio_ext.trim_start_matches('.');
        if base.is_empty() {
            format!("{}/{}.{}", self.variant, name, ext)
        } else {
            format!("{}/{}/{}.{}", base, self.variant, name, ext)
        }
    }

    pub fn item(&self, name: &str) -> PromptItem {
        match self.mode {
            PromptMode::Audio => PromptItem::AudioSegment(self.resource_path(name)),
            PromptMode::Synthesis => PromptItem::SynthesizedText(name.to_string()),
        }
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::new("", PromptVariant::Original, "wav", PromptMode::Synthesis)
    }
}

/// Prompt settings shared by all sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSettings {
    pub mode: PromptMode,
    pub audio_ext: String,
    /// Session-start attribute carrying the caller identity
    pub caller_attribute: String,
    /// Caller identity prefixes that get the instrumented prompt set
    pub instrumented_callers: Vec<String>,
}

impl PromptSettings {
    pub fn catalog(&self, base_path: &str, caller: Option<&str>) -> PromptCatalog {
        let variant = PromptVariant::for_caller(caller, &self.instrumented_callers);
        PromptCatalog::new(base_path, variant, self.audio_ext.clone(), self.mode)
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            mode: PromptMode::Synthesis,
            audio_ext: "wav".to_string(),
            caller_attribute: "callerId".to_string(),
            instrumented_callers: Vec::new(),
        }
    }
}
