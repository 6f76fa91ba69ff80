//! Interface definitions: named, ordered sets of method signatures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata describing one interface method.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Parameter names, in call order.
    #[serde(default)]
    pub params: Vec<String>,
    /// Free-form description from the definition document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MethodSignature {
    /// Create a signature with the given parameter names.
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            description: None,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A parsed service contract. Immutable once loaded.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDef {
    /// Globally unique dotted name, e.g. `Calc.IAdd`.
    pub name: String,
    /// Methods in document order.
    pub methods: Vec<MethodSignature>,
}

impl InterfaceDef {
    /// Create an interface definition from its signatures.
    pub fn new(name: impl Into<String>, methods: Vec<MethodSignature>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }

    /// Parse a definition document.
    ///
    /// The document is a JSON object mapping method name to signature
    /// metadata. Metadata may be an object with optional `params` and
    /// `description` fields, an array of parameter names, a number giving the
    /// arity, or `null`.
    pub fn parse(name: impl Into<String>, document: &str) -> Result<Self, String> {
        let name = name.into();
        let value: Value = serde_json::from_str(document).map_err(|e| e.to_string())?;
        let Value::Object(entries) = value else {
            return Err(format!("interface {name} must be a JSON object"));
        };

        let mut methods = Vec::with_capacity(entries.len());
        for (method, meta) in entries {
            methods.push(parse_signature(method, meta)?);
        }
        Ok(Self { name, methods })
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Method names in document order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

fn parse_signature(method: String, meta: Value) -> Result<MethodSignature, String> {
    let mut signature = MethodSignature {
        name: method,
        params: Vec::new(),
        description: None,
    };
    match meta {
        Value::Null => {}
        Value::Number(n) => {
            let arity = n
                .as_u64()
                .ok_or_else(|| format!("arity of {} must be a non-negative integer", signature.name))?;
            signature.params = (0..arity).map(|i| format!("arg{i}")).collect();
        }
        Value::Array(params) => {
            signature.params = params_from(&signature.name, params)?;
        }
        Value::Object(mut fields) => {
            if let Some(params) = fields.remove("params") {
                let Value::Array(params) = params else {
                    return Err(format!("params of {} must be an array", signature.name));
                };
                signature.params = params_from(&signature.name, params)?;
            }
            if let Some(Value::String(desc)) = fields.remove("description") {
                signature.description = Some(desc);
            }
        }
        other => {
            return Err(format!(
                "unsupported signature metadata for {}: {other}",
                signature.name
            ));
        }
    }
    Ok(signature)
}

fn params_from(method: &str, params: Vec<Value>) -> Result<Vec<String>, String> {
    params
        .into_iter()
        .map(|p| match p {
            Value::String(s) => Ok(s),
            other => Err(format!("parameter of {method} must be a string, got {other}")),
        })
        .collect()
}
