use crate::error::ToolError;
use serde_json::{json, Map, Value};

/// JSON type a parameter must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
        }
    }
}

/// One declared tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
    /// Allowed values for string parameters. Empty means unrestricted.
    pub allowed: &'static [&'static str],
}

impl ParamSpec {
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: ParamType::String,
            description,
            required: true,
            allowed: &[],
        }
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: ParamType::Number,
            description,
            required: true,
            allowed: &[],
        }
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn check(&self, value: Option<&Value>) -> Result<(), ToolError> {
        let value = match value {
            Some(Value::Null) | None if self.required => {
                return Err(ToolError::InvalidArgument(format!(
                    "missing required parameter `{}`",
                    self.name
                )));
            }
            Some(Value::Null) | None => return Ok(()),
            Some(value) => value,
        };

        if !self.param_type.matches(value) {
            return Err(ToolError::InvalidArgument(format!(
                "parameter `{}` must be a {}",
                self.name,
                self.param_type.as_str()
            )));
        }

        if !self.allowed.is_empty() {
            let ok = value.as_str().is_some_and(|v| self.allowed.contains(&v));
            if !ok {
                return Err(ToolError::InvalidArgument(format!(
                    "parameter `{}` must be one of: {}",
                    self.name,
                    self.allowed.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// A registered tool: stable name, description and parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Check every declared parameter against the supplied arguments.
    /// Undeclared extra arguments are ignored.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), ToolError> {
        for param in &self.params {
            param.check(args.get(param.name))?;
        }
        Ok(())
    }

    /// JSON Schema object advertised to protocol clients.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut property = json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            });
            if !param.allowed.is_empty() {
                property["enum"] = json!(param.allowed);
            }
            properties.insert(param.name.to_string(), property);
            if param.required {
                required.push(param.name);
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
