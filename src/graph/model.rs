use super::VariableSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A literal argument value. The dialect is loosely typed, so values stay free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display already drops a zero fraction.
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(value as f64)
    }
}

/// Parameter name to value mapping of a function node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Canvas coordinates. Carried through for the editor, ignored by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A named connection point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Input,
    Output,
    True,
    False,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Handle::Input => "input",
            Handle::Output => "output",
            Handle::True => "true",
            Handle::False => "false",
        };
        f.write_str(name)
    }
}

impl FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Handle::Input),
            "output" => Ok(Handle::Output),
            "true" => Ok(Handle::True),
            "false" => Ok(Handle::False),
            other => Err(format!("unknown handle '{}'", other)),
        }
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeVariant {
    Timing,
    ValueAcquisition,
    Consequence,
    Conditional,
    ContinueIf,
    Assignment,
}

impl NodeVariant {
    pub fn input_handles(self) -> &'static [Handle] {
        match self {
            NodeVariant::Timing => &[],
            _ => &[Handle::Input],
        }
    }

    pub fn output_handles(self) -> &'static [Handle] {
        match self {
            NodeVariant::Conditional => &[Handle::True, Handle::False],
            _ => &[Handle::Output],
        }
    }

    pub fn accepts_input(self, handle: Handle) -> bool {
        self.input_handles().contains(&handle)
    }

    pub fn has_output(self, handle: Handle) -> bool {
        self.output_handles().contains(&handle)
    }
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeVariant::Timing => "Timing",
            NodeVariant::ValueAcquisition => "ValueAcquisition",
            NodeVariant::Consequence => "Consequence",
            NodeVariant::Conditional => "Conditional",
            NodeVariant::ContinueIf => "ContinueIf",
            NodeVariant::Assignment => "Assignment",
        };
        f.write_str(name)
    }
}

/// A registry-backed function together with the user's argument values.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function_name: String,
    pub parameters: Parameters,
}

impl FunctionCall {
    pub fn new(function_name: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name, value);
        self
    }
}

/// The value-producing node owned by an Assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAcquisitionNode {
    pub id: String,
    pub call: FunctionCall,
}

/// Binds the result of an embedded value acquisition to a variable slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Slot chosen by the user. `None` lets the allocator pick one.
    pub bound_variable: Option<VariableSlot>,
    pub embedded: Option<ValueAcquisitionNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Greater => ">",
            ComparisonOperator::Less => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
    Xor,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Xor => "XOR",
        };
        f.write_str(keyword)
    }
}

/// One `left operator right` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionTerm {
    pub left: String,
    pub operator: ComparisonOperator,
    pub right: String,
}

impl ConditionTerm {
    pub fn new(left: impl Into<String>, operator: ComparisonOperator, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            operator,
            right: right.into(),
        }
    }
}

impl fmt::Display for ConditionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.left, self.operator, self.right)
    }
}

/// The guard of a Conditional or ContinueIf node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub terms: Vec<ConditionTerm>,
    #[serde(default)]
    pub logic: LogicalOperator,
}

impl Condition {
    pub fn new(logic: LogicalOperator, terms: Vec<ConditionTerm>) -> Self {
        Self { terms, logic }
    }

    pub fn single(left: impl Into<String>, operator: ComparisonOperator, right: impl Into<String>) -> Self {
        Self::new(
            LogicalOperator::default(),
            vec![ConditionTerm::new(left, operator, right)],
        )
    }
}

impl fmt::Display for Condition {
    /// A lone term renders bare; several are prefixed by the logical operator,
    /// all comma separated. No terms render as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.terms.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{}", only),
            terms => {
                write!(f, "{}", self.logic)?;
                for term in terms {
                    write!(f, ",{}", term)?;
                }
                Ok(())
            }
        }
    }
}

/// Variant-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Timing(FunctionCall),
    ValueAcquisition(FunctionCall),
    Consequence(FunctionCall),
    Conditional(Condition),
    ContinueIf(Condition),
    Assignment(Assignment),
}

impl NodeBody {
    pub fn variant(&self) -> NodeVariant {
        match self {
            NodeBody::Timing(_) => NodeVariant::Timing,
            NodeBody::ValueAcquisition(_) => NodeVariant::ValueAcquisition,
            NodeBody::Consequence(_) => NodeVariant::Consequence,
            NodeBody::Conditional(_) => NodeVariant::Conditional,
            NodeBody::ContinueIf(_) => NodeVariant::ContinueIf,
            NodeBody::Assignment(_) => NodeVariant::Assignment,
        }
    }

    /// The function this node calls. For an Assignment, that of its embedded node.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        match self {
            NodeBody::Timing(call) | NodeBody::ValueAcquisition(call) | NodeBody::Consequence(call) => {
                Some(call)
            }
            NodeBody::Assignment(assignment) => assignment.embedded.as_ref().map(|e| &e.call),
            NodeBody::Conditional(_) | NodeBody::ContinueIf(_) => None,
        }
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            NodeBody::Conditional(condition) | NodeBody::ContinueIf(condition) => Some(condition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub body: NodeBody,
}

impl Node {
    pub fn new(id: &str, body: NodeBody) -> Self {
        Self {
            id: id.to_string(),
            position: Position::default(),
            body,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn variant(&self) -> NodeVariant {
        self.body.variant()
    }

    pub fn function_name(&self) -> Option<&str> {
        self.body.function_call().map(|call| call.function_name.as_str())
    }
}

/// A directed edge between two node handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source_id: String,
    pub source_handle: Handle,
    pub target_id: String,
    pub target_handle: Handle,
}

impl Connection {
    pub fn new(source_id: &str, source_handle: Handle, target_id: &str, target_handle: Handle) -> Self {
        Self {
            source_id: source_id.to_string(),
            source_handle,
            target_id: target_id.to_string(),
            target_handle,
        }
    }
}
