//! Tool registry: the immutable table of tools declared to the model.

use super::{Builtin, ParamDecl, Tool};
use crate::model::ToolSpec;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

/// Primitive parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A parsed parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// `None` for a type the schema export does not understand; such
    /// parameters still count toward `required` but get no property.
    pub ty: Option<ParamType>,
    pub required: bool,
}

impl ParamSpec {
    /// Parse a `(name, type)` declaration; a trailing `?` marks it optional.
    pub fn parse((name, decl): ParamDecl) -> Self {
        let (ty, required) = match decl.strip_suffix('?') {
            Some(ty) => (ty, false),
            None => (decl, true),
        };
        Self {
            name,
            ty: ParamType::parse(ty),
            required,
        }
    }
}

/// A tool with its parsed parameters and exported declaration.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub tool: Builtin,
    pub params: Vec<ParamSpec>,
}

impl RegisteredTool {
    fn new(tool: Builtin) -> Self {
        let params = tool.params().iter().copied().map(ParamSpec::parse).collect();
        Self { tool, params }
    }

    fn spec(&self) -> ToolSpec {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
            if let Some(ty) = param.ty {
                properties.insert(param.name.to_string(), json!({ "type": ty.as_str() }));
            }
        }

        ToolSpec {
            name: self.tool.name().to_string(),
            description: self.tool.description().to_string(),
            schema: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// Immutable name → tool table, populated once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    specs: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Build a registry from a set of tools. Later duplicates of a name are
    /// ignored.
    pub fn new(tools: impl IntoIterator<Item = Builtin>) -> Self {
        let mut registered = Vec::new();
        let mut index = HashMap::new();
        for tool in tools {
            if index.contains_key(tool.name()) {
                continue;
            }
            index.insert(tool.name(), registered.len());
            registered.push(RegisteredTool::new(tool));
        }
        let specs = registered.iter().map(RegisteredTool::spec).collect();

        Self {
            tools: registered,
            specs,
            index,
        }
    }

    /// The full built-in tool set.
    pub fn builtin() -> Self {
        Self::new(Builtin::ALL)
    }

    /// Tool declarations for the model, in registration order.
    pub fn describe(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn parses_optional_marker() {
        assert_eq!(
            ParamSpec::parse(("offset", "number?")),
            ParamSpec {
                name: "offset",
                ty: Some(ParamType::Number),
                required: false,
            }
        );
        assert!(ParamSpec::parse(("path", "string")).required);
    }

    #[test]
    fn describe_lists_every_builtin_in_order() {
        let registry = ToolRegistry::builtin();
        let names: Vec<_> = registry.describe().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["read", "write", "edit", "glob", "grep", "bash"]);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn required_and_optional_params() {
        let registry = ToolRegistry::builtin();
        for (spec, registered) in registry.describe().iter().zip(registry.iter()) {
            let required = strings(&spec.schema["required"]);
            let properties = spec.schema["properties"].as_object().unwrap();
            assert_eq!(spec.schema["type"], "object");

            for param in &registered.params {
                assert!(properties.contains_key(param.name), "{}", param.name);
                assert_eq!(required.contains(&param.name), param.required);
            }
            assert_eq!(properties.len(), registered.params.len());
        }

        let read = &registry.describe()[0];
        assert_eq!(strings(&read.schema["required"]), ["path"]);
        assert_eq!(read.schema["properties"]["offset"]["type"], "number");
        let edit = &registry.describe()[2];
        assert_eq!(strings(&edit.schema["required"]), ["path", "old", "new"]);
        assert_eq!(edit.schema["properties"]["all"]["type"], "boolean");
    }

    #[test]
    fn lookup_by_name() {
        let registry = ToolRegistry::new([Builtin::Read, Builtin::Bash, Builtin::Read]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("bash"));
        assert_eq!(registry.get("read").map(|r| r.tool), Some(Builtin::Read));
        assert!(registry.get("write").is_none());
    }
}
