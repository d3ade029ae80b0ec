use std::{collections::HashMap, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ProcedureFault, RpcError};
use crate::protocol::Params;

pub type Procedure = Arc<dyn Fn(Params) -> Result<Value, ProcedureFault> + Send + Sync>;

/// Name to procedure mapping. Built before dispatch starts and read-only
/// afterwards.
#[derive(Clone, Default)]
pub struct ProcedureTable {
    entries: HashMap<String, Procedure>,
}

impl ProcedureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, procedure: F) -> Result<(), RpcError>
    where
        F: Fn(Params) -> Result<Value, ProcedureFault> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RpcError::InvalidProcedureName);
        }
        if self.entries.contains_key(&name) {
            return Err(RpcError::DuplicateProcedure(name));
        }
        self.entries.insert(name, Arc::new(procedure));
        Ok(())
    }

    pub fn with<F>(mut self, name: impl Into<String>, procedure: F) -> Result<Self, RpcError>
    where
        F: Fn(Params) -> Result<Value, ProcedureFault> + Send + Sync + 'static,
    {
        self.register(name, procedure)?;
        Ok(self)
    }

    pub fn resolve(&self, name: &str) -> Option<&Procedure> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ProcedureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureTable")
            .field("procedures", &self.names())
            .finish()
    }
}

/// Deserializes either parameter shape into `T`; a mismatch is a parameter
/// fault. Positional params map onto tuples, named params onto structs.
pub fn parse_params<T: DeserializeOwned>(params: &Params) -> Result<T, ProcedureFault> {
    serde_json::from_value(params.to_value())
        .map_err(|err| ProcedureFault::invalid_params(err.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::errors::FaultKind;

    fn add(params: Params) -> Result<Value, ProcedureFault> {
        let (a, b): (i64, i64) = parse_params(&params)?;
        Ok(json!(a + b))
    }

    #[test]
    fn resolves_registered_procedures() {
        let table = ProcedureTable::new().with("add", add).expect("register add");

        let procedure = table.resolve("add").expect("add is registered");
        let result = procedure(Params::Positional(vec![json!(2), json!(3)])).expect("sum");
        assert_eq!(result, json!(5));
        assert!(table.resolve("sub").is_none());
        assert_eq!(table.names(), vec!["add"]);
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        let mut table = ProcedureTable::new();
        table.register("add", add).expect("first registration");

        let error = table.register("add", add).expect_err("duplicate");
        assert!(matches!(error, RpcError::DuplicateProcedure(ref name) if name == "add"));

        let error = table.register(" ", add).expect_err("empty name");
        assert!(matches!(error, RpcError::InvalidProcedureName));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn parse_params_maps_named_params_onto_structs() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Greeting {
            name: String,
        }

        let params = Params::from_value(&json!({"name": "ada"})).expect("named");
        let greeting: Greeting = parse_params(&params).expect("struct");
        assert_eq!(greeting.name, "ada");
    }

    #[test]
    fn parse_params_mismatch_is_a_parameter_fault() {
        let fault = add(Params::Positional(vec![json!("two")])).expect_err("bad params");
        assert_eq!(fault.kind, FaultKind::InvalidParams);
    }
}
