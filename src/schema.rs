//! Declarative node metadata: inputs, outputs, hidden fields and pricing.
//!
//! Schemas serialize to JSON so a host UI can render widgets without
//! knowing anything about Meshy.

use std::collections::HashMap;

use serde::Serialize;

pub const CATEGORY: &str = "api node/3d/Meshy";

/// Custom socket type carrying a Meshy model task id between nodes.
pub const MESHY_TASK_ID: &str = "MESHY_TASK_ID";
/// Custom socket type carrying a rigging task id between nodes.
pub const MESHY_RIGGED_TASK_ID: &str = "MESHY_RIGGED_TASK_ID";
/// Socket type emitted by the texture node.
pub const MODEL_TASK_ID: &str = "MODEL_TASK_ID";

/// The widget or socket type of an input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    Combo {
        options: Vec<String>,
    },
    String {
        multiline: bool,
        default: String,
    },
    Int {
        min: i64,
        max: i64,
        default: i64,
        control_after_generate: bool,
    },
    Float {
        min: f64,
        max: f64,
        default: f64,
    },
    Boolean {
        default: bool,
    },
    Image,
    Custom {
        type_name: String,
    },
    /// A combo whose selected option materializes extra inputs.
    DynamicCombo {
        options: Vec<DynamicOption>,
    },
    /// A growable list of inputs named `<prefix><n>`.
    Autogrow {
        template: Box<InputSpec>,
        prefix: String,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicOption {
    pub key: String,
    pub inputs: Vec<InputSpec>,
}

impl DynamicOption {
    pub fn new(key: impl Into<String>, inputs: Vec<InputSpec>) -> Self {
        Self {
            key: key.into(),
            inputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub optional: bool,
}

impl InputSpec {
    fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tooltip: None,
            optional: false,
        }
    }

    pub fn combo<I, S>(name: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            InputKind::Combo {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn string(name: &str, multiline: bool) -> Self {
        Self::new(
            name,
            InputKind::String {
                multiline,
                default: String::new(),
            },
        )
    }

    pub fn int(name: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(
            name,
            InputKind::Int {
                min,
                max,
                default,
                control_after_generate: false,
            },
        )
    }

    pub fn float(name: &str, min: f64, max: f64, default: f64) -> Self {
        Self::new(name, InputKind::Float { min, max, default })
    }

    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(name, InputKind::Boolean { default })
    }

    pub fn image(name: &str) -> Self {
        Self::new(name, InputKind::Image)
    }

    pub fn custom(name: &str, type_name: &str) -> Self {
        Self::new(
            name,
            InputKind::Custom {
                type_name: type_name.to_string(),
            },
        )
    }

    pub fn dynamic_combo(name: &str, options: Vec<DynamicOption>) -> Self {
        Self::new(name, InputKind::DynamicCombo { options })
    }

    pub fn autogrow(name: &str, template: InputSpec, prefix: &str, min: usize, max: usize) -> Self {
        Self::new(
            name,
            InputKind::Autogrow {
                template: Box::new(template),
                prefix: prefix.to_string(),
                min,
                max,
            },
        )
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Let the host re-roll this integer after every run.
    pub fn control_after_generate(mut self) -> Self {
        if let InputKind::Int {
            control_after_generate,
            ..
        } = &mut self.kind
        {
            *control_after_generate = true;
        }
        self
    }

    /// Find `name` here or inside a dynamic combo's options.
    fn find(&self, name: &str) -> Option<&InputSpec> {
        if self.name == name {
            return Some(self);
        }
        match &self.kind {
            InputKind::DynamicCombo { options } => options
                .iter()
                .flat_map(|o| o.inputs.iter())
                .find_map(|i| i.find(name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    pub type_name: String,
    pub display_name: String,
}

impl OutputSpec {
    pub fn string(display_name: &str) -> Self {
        Self {
            type_name: "STRING".to_string(),
            display_name: display_name.to_string(),
        }
    }

    pub fn custom(type_name: &str, display_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Values the host injects without showing a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenInput {
    AuthTokenComfyOrg,
    ApiKeyComfyOrg,
    UniqueId,
}

impl HiddenInput {
    pub const API_NODE: [HiddenInput; 3] = [
        HiddenInput::AuthTokenComfyOrg,
        HiddenInput::ApiKeyComfyOrg,
        HiddenInput::UniqueId,
    ];
}

/// Cost shown on the node before it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceBadge {
    Fixed { usd: f64 },
    /// Price depends on the current value of one widget.
    ByWidget {
        widget: String,
        prices: Vec<(String, f64)>,
    },
}

impl PriceBadge {
    pub fn fixed(usd: f64) -> Self {
        PriceBadge::Fixed { usd }
    }

    pub fn by_widget(widget: &str, prices: &[(&str, f64)]) -> Self {
        PriceBadge::ByWidget {
            widget: widget.to_string(),
            prices: prices.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Widgets whose value changes the price.
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            PriceBadge::Fixed { .. } => None,
            PriceBadge::ByWidget { widget, .. } => Some(widget),
        }
    }

    /// Resolve the USD price for the given widget values.
    pub fn evaluate(&self, widgets: &HashMap<String, String>) -> Option<f64> {
        match self {
            PriceBadge::Fixed { usd } => Some(*usd),
            PriceBadge::ByWidget { widget, prices } => {
                let value = widgets.get(widget)?;
                prices.iter().find(|(k, _)| k == value).map(|(_, usd)| *usd)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSchema {
    pub node_id: String,
    pub display_name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub hidden: Vec<HiddenInput>,
    pub is_api_node: bool,
    pub is_output_node: bool,
    pub price_badge: PriceBadge,
}

impl NodeSchema {
    /// An API output node in the Meshy category.
    pub fn api_node(node_id: &str, display_name: &str, price_badge: PriceBadge) -> Self {
        Self {
            node_id: node_id.to_string(),
            display_name: display_name.to_string(),
            category: CATEGORY.to_string(),
            description: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            hidden: HiddenInput::API_NODE.to_vec(),
            is_api_node: true,
            is_output_node: true,
            price_badge,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn inputs(mut self, inputs: Vec<InputSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn outputs(mut self, outputs: Vec<OutputSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Look up an input by name, including inputs nested in dynamic combos.
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find_map(|i| i.find(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widgets(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fixed_price() {
        let badge = PriceBadge::fixed(0.8);
        assert_eq!(badge.evaluate(&HashMap::new()), Some(0.8));
        assert!(badge.depends_on().is_none());
    }

    #[test]
    fn test_price_by_widget() {
        let badge = PriceBadge::by_widget("should_texture", &[("true", 1.2), ("false", 0.8)]);
        assert_eq!(badge.depends_on(), Some("should_texture"));
        assert_eq!(badge.evaluate(&widgets(&[("should_texture", "true")])), Some(1.2));
        assert_eq!(badge.evaluate(&widgets(&[("should_texture", "false")])), Some(0.8));
        assert_eq!(badge.evaluate(&widgets(&[("should_texture", "maybe")])), None);
        assert_eq!(badge.evaluate(&HashMap::new()), None);
    }

    #[test]
    fn test_input_serialization() {
        let input = InputSpec::int("seed", 0, 2_147_483_647, 0)
            .control_after_generate()
            .tooltip("re-run control");
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "name": "seed",
                "type": "int",
                "min": 0,
                "max": 2_147_483_647,
                "default": 0,
                "control_after_generate": true,
                "tooltip": "re-run control",
                "optional": false
            })
        );
    }

    #[test]
    fn test_lookup_nested_input() {
        let schema = NodeSchema::api_node("Test", "Test", PriceBadge::fixed(0.1)).inputs(vec![
            InputSpec::dynamic_combo(
                "should_remesh",
                vec![
                    DynamicOption::new("true", vec![InputSpec::combo("topology", ["triangle", "quad"])]),
                    DynamicOption::new("false", vec![]),
                ],
            ),
        ]);
        assert!(schema.input("should_remesh").is_some());
        assert!(matches!(
            schema.input("topology").map(|i| &i.kind),
            Some(InputKind::Combo { .. })
        ));
        assert!(schema.input("missing").is_none());
    }

    #[test]
    fn test_api_node_defaults() {
        let schema = NodeSchema::api_node("Id", "Name", PriceBadge::fixed(1.0));
        assert_eq!(schema.category, "api node/3d/Meshy");
        assert!(schema.is_api_node);
        assert!(schema.is_output_node);
        assert_eq!(schema.hidden.len(), 3);
    }
}
