//! The set of naming strategies injected into every generator.

use serde::{Deserialize, Serialize};

use super::filter::{Filter, FilterSpec, FilterStep};
use crate::diagnostic::CodegenError;

/// Every identifier derivation used by the generators.
///
/// There is deliberately no `Default`: a caller either builds every strategy
/// or asks for [`NamingStrategies::conventional`] by name.
#[derive(Debug, Clone)]
pub struct NamingStrategies {
    pub class_name: Filter,
    pub state_class_name: Filter,
    pub constant_name: Filter,
    pub constant_value: Filter,
    pub command_method: Filter,
    pub event_method: Filter,
    pub with_method: Filter,
    pub parameter_name: Filter,
    pub property_name: Filter,
    pub finder_method: Filter,
    pub query_name: Filter,
    pub identifier: Filter,
    pub directory_to_namespace: Filter,
    pub namespace_to_directory: Filter,
    /// Name of the state store; `storeStateIn(...)` is only emitted when set.
    pub store_state: Option<Filter>,
}

fn steps(steps: &[FilterStep]) -> Filter {
    Filter::from_steps(steps.to_vec())
}

impl NamingStrategies {
    /// The event-engine conventions: `AddBuilding` / `ADD_BUILDING` /
    /// `addBuilding` / `whenBuildingAdded` / `withBuildingAdded`.
    pub fn conventional() -> Self {
        use FilterStep::*;
        Self {
            class_name: steps(&[Pascal]),
            state_class_name: steps(&[Pascal, Suffix("State".into())]),
            constant_name: steps(&[UpperSnake]),
            constant_value: steps(&[Pascal]),
            command_method: steps(&[Camel]),
            event_method: steps(&[Pascal, Prefix("when".into())]),
            with_method: steps(&[Pascal, Prefix("with".into())]),
            parameter_name: steps(&[Camel]),
            property_name: steps(&[Camel]),
            finder_method: steps(&[Pascal, Prefix("find".into())]),
            query_name: steps(&[Pascal, Prefix("Get".into())]),
            identifier: steps(&[Camel, Suffix("Id".into())]),
            directory_to_namespace: steps(&[Replace {
                from: "/".into(),
                to: "\\".into(),
            }]),
            namespace_to_directory: steps(&[Replace {
                from: "\\".into(),
                to: "/".into(),
            }]),
            store_state: None,
        }
    }

    pub fn with_store_state(mut self, filter: Filter) -> Self {
        self.store_state = Some(filter);
        self
    }
}

/// Naming strategies as written in the `[naming]` table of the config file.
///
/// Either `preset = "conventional"` is given (and any field overrides it), or
/// every field except `store_state` must be spelled out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub preset: Option<String>,
    pub class_name: Option<FilterSpec>,
    pub state_class_name: Option<FilterSpec>,
    pub constant_name: Option<FilterSpec>,
    pub constant_value: Option<FilterSpec>,
    pub command_method: Option<FilterSpec>,
    pub event_method: Option<FilterSpec>,
    pub with_method: Option<FilterSpec>,
    pub parameter_name: Option<FilterSpec>,
    pub property_name: Option<FilterSpec>,
    pub finder_method: Option<FilterSpec>,
    pub query_name: Option<FilterSpec>,
    pub identifier: Option<FilterSpec>,
    pub directory_to_namespace: Option<FilterSpec>,
    pub namespace_to_directory: Option<FilterSpec>,
    pub store_state: Option<FilterSpec>,
}

impl NamingConfig {
    pub fn conventional() -> Self {
        Self {
            preset: Some("conventional".to_string()),
            ..Self::default()
        }
    }

    /// Builds the strategies, failing when a field has neither a value nor a preset.
    pub fn build(&self) -> Result<NamingStrategies, CodegenError> {
        let base = match self.preset.as_deref() {
            Some("conventional") => Some(NamingStrategies::conventional()),
            Some(other) => {
                return Err(CodegenError::config(format!(
                    "unknown naming preset '{}' (available: conventional)",
                    other
                )))
            }
            None => None,
        };

        let mut missing = Vec::new();
        let mut pick = |name: &'static str, spec: &Option<FilterSpec>, preset: Option<&Filter>| -> Filter {
            match (spec, preset) {
                (Some(spec), _) => spec.build(),
                (None, Some(filter)) => filter.clone(),
                (None, None) => {
                    missing.push(name);
                    Filter::identity()
                }
            }
        };
        let b = base.as_ref();

        let strategies = NamingStrategies {
            class_name: pick("class_name", &self.class_name, b.map(|b| &b.class_name)),
            state_class_name: pick("state_class_name", &self.state_class_name, b.map(|b| &b.state_class_name)),
            constant_name: pick("constant_name", &self.constant_name, b.map(|b| &b.constant_name)),
            constant_value: pick("constant_value", &self.constant_value, b.map(|b| &b.constant_value)),
            command_method: pick("command_method", &self.command_method, b.map(|b| &b.command_method)),
            event_method: pick("event_method", &self.event_method, b.map(|b| &b.event_method)),
            with_method: pick("with_method", &self.with_method, b.map(|b| &b.with_method)),
            parameter_name: pick("parameter_name", &self.parameter_name, b.map(|b| &b.parameter_name)),
            property_name: pick("property_name", &self.property_name, b.map(|b| &b.property_name)),
            finder_method: pick("finder_method", &self.finder_method, b.map(|b| &b.finder_method)),
            query_name: pick("query_name", &self.query_name, b.map(|b| &b.query_name)),
            identifier: pick("identifier", &self.identifier, b.map(|b| &b.identifier)),
            directory_to_namespace: pick(
                "directory_to_namespace",
                &self.directory_to_namespace,
                b.map(|b| &b.directory_to_namespace),
            ),
            namespace_to_directory: pick(
                "namespace_to_directory",
                &self.namespace_to_directory,
                b.map(|b| &b.namespace_to_directory),
            ),
            store_state: self.store_state.as_ref().map(FilterSpec::build),
        };

        if !missing.is_empty() {
            return Err(CodegenError::config(format!(
                "naming strategies without a value: {} (set them or use preset = \"conventional\")",
                missing.join(", ")
            )));
        }
        Ok(strategies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_names() {
        let n = NamingStrategies::conventional();
        assert_eq!(n.class_name.apply("Add Building"), "AddBuilding");
        assert_eq!(n.state_class_name.apply("Building"), "BuildingState");
        assert_eq!(n.constant_name.apply("Add Building"), "ADD_BUILDING");
        assert_eq!(n.command_method.apply("Add Building"), "addBuilding");
        assert_eq!(n.event_method.apply("Building Added"), "whenBuildingAdded");
        assert_eq!(n.with_method.apply("Building Added"), "withBuildingAdded");
        assert_eq!(n.identifier.apply("Building"), "buildingId");
        assert_eq!(n.directory_to_namespace.apply("Domain/Model"), "Domain\\Model");
        assert!(n.store_state.is_none());
    }

    #[test]
    fn preset_with_overrides_from_toml() {
        let config: NamingConfig = toml::from_str(
            r#"
            preset = "conventional"
            store_state = ["snake", "plural"]
            event_method = ["pascal", { prefix = "apply" }]
            "#,
        )
        .unwrap();
        let n = config.build().unwrap();
        assert_eq!(n.event_method.apply("Building Added"), "applyBuildingAdded");
        assert_eq!(n.store_state.unwrap().apply("Building"), "buildings");
        assert_eq!(n.class_name.apply("building"), "Building");
    }

    #[test]
    fn missing_strategies_without_preset_are_rejected() {
        let config: NamingConfig = toml::from_str(r#"class_name = "pascal""#).unwrap();
        let err = config.build().unwrap_err();
        match err {
            CodegenError::Configuration { message } => {
                assert!(message.contains("constant_name"));
                assert!(!message.contains(": class_name"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let config = NamingConfig {
            preset: Some("fancy".into()),
            ..NamingConfig::default()
        };
        assert!(config.build().is_err());
    }
}
