use std::collections::BTreeMap;
use std::fmt;




// ============================================================================
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    B(bool),
    I(i64),
    F(f64),
    S(String),
    L(Vec<String>),
}

impl From<bool>        for Value { fn from(a: bool)        -> Self { Value::B(a) } }
impl From<i64>         for Value { fn from(a: i64)         -> Self { Value::I(a) } }
impl From<usize>       for Value { fn from(a: usize)       -> Self { Value::I(i64::try_from(a).unwrap_or(i64::MAX)) } }
impl From<f64>         for Value { fn from(a: f64)         -> Self { Value::F(a) } }
impl From<&str>        for Value { fn from(a: &str)        -> Self { Value::S(a.into()) } }
impl From<String>      for Value { fn from(a: String)      -> Self { Value::S(a) } }
impl From<Vec<String>> for Value { fn from(a: Vec<String>) -> Self { Value::L(a) } }

impl Value {
    pub fn same_kind_as(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::B(_) => "bool",
            Value::I(_) => "int",
            Value::F(_) => "float",
            Value::S(_) => "string",
            Value::L(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> { match self { Value::B(x) => Some(*x), _ => None } }
    pub fn as_int (&self) -> Option<i64>  { match self { Value::I(x) => Some(*x), _ => None } }
    pub fn as_str (&self) -> Option<&str> { match self { Value::S(x) => Some(x),  _ => None } }
    pub fn as_list(&self) -> Option<&[String]> { match self { Value::L(x) => Some(x), _ => None } }

    /// Ints are accepted where a float is wanted, so `alt=10000` reads as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::F(x) => Some(*x),
            Value::I(x) => Some(*x as f64),
            _ => None,
        }
    }

    fn parse_like(&self, key: &str, text: &str) -> Result<Value, ConfigError> {
        use Value::*;
        match self {
            B(_) => text.parse().map(B).map_err(|_| ConfigError::new(key, "is a badly formed bool")),
            I(_) => text.parse().map(I).map_err(|_| ConfigError::new(key, "is a badly formed int")),
            F(_) => text.parse().map(F).map_err(|_| ConfigError::new(key, "is a badly formed float")),
            S(_) => Ok(S(text.to_string())),
            L(_) => Ok(L(text.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::B(x) => x.fmt(f),
            Value::I(x) => x.fmt(f),
            Value::F(x) => x.fmt(f),
            Value::S(x) => x.fmt(f),
            Value::L(x) => x.join(",").fmt(f),
        }
    }
}




// ============================================================================
#[derive(Clone, Debug)]
pub struct Parameter {
    pub value: Value,
    pub about: String,
}




// ============================================================================
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("config key '{key}' {why}")]
pub struct ConfigError {
    key: String,
    why: String,
}

impl ConfigError {
    pub fn new(key: &str, why: &str) -> ConfigError {
        ConfigError{key: key.into(), why: why.into()}
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}




/**
 * @brief      A set of named, typed model parameters. Every item is declared
 *             up front with a default value and an about message; string maps
 *             merged in afterwards may only overwrite declared keys, and only
 *             with values of the same kind.
 */
#[derive(Clone, Debug, Default)]
pub struct Form {
    parameter_map: BTreeMap<String, Parameter>
}




// ============================================================================
impl Form {
    pub fn new() -> Form {
        Form{parameter_map: BTreeMap::new()}
    }

    pub fn item<T: Into<Value>>(mut self, key: &str, default: T, about: &str) -> Self {
        self.parameter_map.insert(key.into(), Parameter{value: default.into(), about: about.into()});
        self
    }

    pub fn merge_value_map(mut self, items: &BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        for (key, new_value) in items {
            let parameter = self.parameter_map
                .get_mut(key)
                .ok_or_else(|| ConfigError::new(key, "is not a valid key"))?;

            if ! parameter.value.same_kind_as(new_value) {
                return Err(ConfigError::new(key, "has the wrong type"))
            }
            parameter.value = new_value.clone();
        }
        Ok(self)
    }

    pub fn merge_string_map(mut self, dict: BTreeMap<String, String>) -> Result<Self, ConfigError> {
        for (k, v) in &dict {
            let parameter = self.parameter_map
                .get_mut(k)
                .ok_or_else(|| ConfigError::new(k, "is not a valid key"))?;
            parameter.value = parameter.value.parse_like(k, v)?;
        }
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Result<&Value, ConfigError> {
        self.parameter_map
            .get(key)
            .map(|p| &p.value)
            .ok_or_else(|| ConfigError::new(key, "is not a valid key"))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.get(key)?.as_bool().ok_or_else(|| ConfigError::new(key, "is not a bool"))
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        self.get(key)?.as_int().ok_or_else(|| ConfigError::new(key, "is not an int"))
    }

    pub fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        self.get(key)?.as_float().ok_or_else(|| ConfigError::new(key, "is not a float"))
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)?.as_str().map(String::from).ok_or_else(|| ConfigError::new(key, "is not a string"))
    }

    pub fn len(&self) -> usize {
        self.parameter_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_map.is_empty()
    }
}




// ============================================================================
impl<'a> IntoIterator for &'a Form {
    type Item     = <&'a BTreeMap<String, Parameter> as IntoIterator>::Item;
    type IntoIter = <&'a BTreeMap<String, Parameter> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.parameter_map.iter()
    }
}




// ============================================================================
pub fn to_string_map_from_key_val_pairs<T: Iterator<Item=String>>(args: T) -> Result<BTreeMap<String, String>, ConfigError> {

    fn left_and_right_hand_side(a: &str) -> Result<(&str, &str), ConfigError> {
        let lr: Vec<&str> = a.split('=').collect();
        if lr.len() != 2 || lr[0].is_empty() {
            Err(ConfigError::new(a, "is a badly formed argument"))
        } else {
            Ok((lr[0], lr[1]))
        }
    }

    let mut result = BTreeMap::new();
    for arg in args {
        let (key, value) = left_and_right_hand_side(&arg)?;
        if result.contains_key(key) {
            return Err(ConfigError::new(key, "duplicate parameter"));
        }
        result.insert(key.to_string(), value.to_string());
    }
    Ok(result)
}
