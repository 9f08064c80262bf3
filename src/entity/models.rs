//! Model settings and stop conditions shared by projects, graphs and agents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the three named model slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Base,
    StructuredOutput,
    Summarizer,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Base,
        ModelKind::StructuredOutput,
        ModelKind::Summarizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Base => "base",
            ModelKind::StructuredOutput => "structuredOutput",
            ModelKind::Summarizer => "summarizer",
        }
    }
}

/// A model identifier plus its provider option bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<Map<String, Value>>,
}

impl ModelSlot {
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            provider_options: None,
        }
    }

    pub fn with_provider_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.provider_options
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}

/// Model configuration with three independently inherited slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<ModelSlot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<ModelSlot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarizer: Option<ModelSlot>,
}

impl ModelSettings {
    pub fn with_base(mut self, slot: ModelSlot) -> Self {
        self.base = Some(slot);
        self
    }

    pub fn with_structured_output(mut self, slot: ModelSlot) -> Self {
        self.structured_output = Some(slot);
        self
    }

    pub fn with_summarizer(mut self, slot: ModelSlot) -> Self {
        self.summarizer = Some(slot);
        self
    }

    pub fn slot(&self, kind: ModelKind) -> Option<&ModelSlot> {
        match kind {
            ModelKind::Base => self.base.as_ref(),
            ModelKind::StructuredOutput => self.structured_output.as_ref(),
            ModelKind::Summarizer => self.summarizer.as_ref(),
        }
    }

    fn slot_entry(&mut self, kind: ModelKind) -> &mut Option<ModelSlot> {
        match kind {
            ModelKind::Base => &mut self.base,
            ModelKind::StructuredOutput => &mut self.structured_output,
            ModelKind::Summarizer => &mut self.summarizer,
        }
    }

    /// Copy every slot `parent` provides and `self` lacks.
    ///
    /// Slots already present are never overwritten. Returns the slots filled.
    pub fn inherit_from(&mut self, parent: &ModelSettings) -> Vec<ModelKind> {
        let mut filled = Vec::new();
        for kind in ModelKind::ALL {
            let entry = self.slot_entry(kind);
            if entry.is_none() {
                if let Some(slot) = parent.slot(kind) {
                    *entry = Some(slot.clone());
                    filled.push(kind);
                }
            }
        }
        filled
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.structured_output.is_none() && self.summarizer.is_none()
    }
}

/// Stop conditions. `transfer_count_is` applies at project and graph scope,
/// `step_count_is` at project and agent scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopWhen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_count_is: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count_is: Option<u32>,
}

impl StopWhen {
    pub fn transfers(count: u32) -> Self {
        Self {
            transfer_count_is: Some(count),
            step_count_is: None,
        }
    }

    pub fn steps(count: u32) -> Self {
        Self {
            transfer_count_is: None,
            step_count_is: Some(count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transfer_count_is.is_none() && self.step_count_is.is_none()
    }
}
