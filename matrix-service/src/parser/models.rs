// Pipeline Data Models
// Declared pipeline tasks, their params and matrices

use serde::{Deserialize, Serialize};

/// A param value that is either a single string or an ordered array of strings.
/// Matrix params must use the array form; static params may use either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
}

impl ParamValue {
    /// Returns the array values, or `None` for a plain string
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ParamValue::Array(values) => Some(values),
            ParamValue::String(_) => None,
        }
    }

    /// Returns the string value, or `None` for an array
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            ParamValue::Array(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Array(values)
    }
}

/// A named param, used both for static params and matrix params
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a single-valued string param
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParamValue::String(value.into()),
        }
    }

    /// Create an array param from any list of string-like values
    pub fn array<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            value: ParamValue::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Values this param contributes to a matrix.
    ///
    /// A plain string is not an array and contributes nothing; such matrices
    /// are rejected by [`crate::validate::MatrixValidator`] before fan-out.
    pub fn matrix_values(&self) -> &[String] {
        self.value.as_array().unwrap_or(&[])
    }
}

/// Ordered matrix declaration. Order of params is significant for fan-out.
pub type Matrix = Vec<Param>;

/// Root pipeline document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pipeline {
    /// Pipeline name
    #[serde(default)]
    pub name: String,

    /// Pipeline tasks in declaration order
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,

    /// Tasks run after all other tasks, in declaration order
    #[serde(default)]
    pub finally: Vec<PipelineTask>,
}

impl Pipeline {
    /// Regular tasks followed by finally tasks
    pub fn all_tasks(&self) -> impl Iterator<Item = &PipelineTask> {
        self.tasks.iter().chain(self.finally.iter())
    }

    /// Look up a declared task by name, including finally tasks
    pub fn task(&self, name: &str) -> Option<&PipelineTask> {
        self.all_tasks().find(|t| t.name == name)
    }
}

/// A task declared in a pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineTask {
    /// Task name (unique within a pipeline)
    pub name: String,

    /// Reference to the task definition
    pub task_ref: Option<TaskRef>,

    /// Static params
    #[serde(default)]
    pub params: Vec<Param>,

    /// Matrix params; empty when the task is not matrixed
    #[serde(default)]
    pub matrix: Matrix,

    /// Tasks that must finish before this one starts
    #[serde(default)]
    pub run_after: Vec<String>,

    /// Legacy input/output resource bindings
    pub resources: Option<PipelineTaskResources>,

    /// Legacy condition checks
    #[serde(default)]
    pub conditions: Vec<PipelineTaskCondition>,
}

impl PipelineTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_matrixed(&self) -> bool {
        !self.matrix.is_empty()
    }

    /// Whether this task is delegated to an external controller
    pub fn is_custom_task(&self) -> bool {
        self.task_ref.as_ref().is_some_and(TaskRef::is_custom)
    }

    /// Whether the task binds any legacy input/output resources
    pub fn has_resource_bindings(&self) -> bool {
        self.resources
            .as_ref()
            .is_some_and(|r| !r.inputs.is_empty() || !r.outputs.is_empty())
    }
}

/// Reference to a task definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskRef {
    pub name: String,

    /// Set for custom tasks handled by an external controller
    pub api_version: Option<String>,

    pub kind: Option<String>,
}

impl TaskRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reference to a custom task kind served by an external controller
    pub fn custom(
        name: impl Into<String>,
        api_version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_version: Some(api_version.into()),
            kind: Some(kind.into()),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.api_version.is_some()
    }
}

/// Legacy resource bindings on a pipeline task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineTaskResources {
    #[serde(default)]
    pub inputs: Vec<ResourceBinding>,
    #[serde(default)]
    pub outputs: Vec<ResourceBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBinding {
    pub name: String,
    pub resource: String,
}

/// Legacy condition check declared on a pipeline task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineTaskCondition {
    pub condition_ref: String,
    #[serde(default)]
    pub params: Vec<Param>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_untagged() {
        let yaml = r#"
- name: foo
  value: bar
- name: platform
  value: [linux, mac]
"#;
        let params: Vec<Param> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params[0], Param::string("foo", "bar"));
        assert_eq!(params[1], Param::array("platform", ["linux", "mac"]));
    }

    #[test]
    fn test_matrix_values_of_string_is_empty() {
        assert!(Param::string("platform", "linux").matrix_values().is_empty());
        assert_eq!(
            Param::array("platform", ["linux"]).matrix_values(),
            &["linux".to_string()]
        );
    }

    #[test]
    fn test_custom_task_detection() {
        let mut task = PipelineTask::new("notify");
        assert!(!task.is_custom_task());

        task.task_ref = Some(TaskRef::new("slack"));
        assert!(!task.is_custom_task());

        task.task_ref = Some(TaskRef::custom("slack", "example.dev/v1", "Notifier"));
        assert!(task.is_custom_task());
    }

    #[test]
    fn test_has_resource_bindings() {
        let mut task = PipelineTask::new("build");
        assert!(!task.has_resource_bindings());

        task.resources = Some(PipelineTaskResources::default());
        assert!(!task.has_resource_bindings());

        task.resources = Some(PipelineTaskResources {
            inputs: vec![ResourceBinding {
                name: "source".to_string(),
                resource: "git-repo".to_string(),
            }],
            outputs: vec![],
        });
        assert!(task.has_resource_bindings());
    }
}
