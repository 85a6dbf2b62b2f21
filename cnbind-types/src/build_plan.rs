use crate::Metadata;
use serde::{Deserialize, Serialize};

/// Detect output written to `CNB_BUILD_PLAN_PATH`.
///
/// The first alternative lives at the top level; the rest go under `[[or]]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provide>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Require>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<BuildPlanAlternative>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlanAlternative {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provide>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Require>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provide {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Require {
    pub name: String,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Provide {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Require {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
        }
    }
}

impl BuildPlanAlternative {
    pub fn is_empty(&self) -> bool {
        self.provides.is_empty() && self.requires.is_empty()
    }
}

impl BuildPlan {
    /// Assemble a plan from an ordered list of alternatives.
    ///
    /// Empty alternatives are dropped; an all-empty input yields `None` so the
    /// caller can skip writing the file entirely.
    pub fn from_alternatives(alternatives: Vec<BuildPlanAlternative>) -> Option<Self> {
        let mut rest = alternatives.into_iter().filter(|a| !a.is_empty());
        let primary = rest.next()?;
        Some(Self {
            provides: primary.provides,
            requires: primary.requires,
            or: rest.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_alternatives_splits_primary_and_or() {
        let plan = BuildPlan::from_alternatives(vec![
            BuildPlanAlternative {
                provides: vec![Provide::new("node")],
                requires: vec![Require::new("node")],
            },
            BuildPlanAlternative {
                provides: vec![],
                requires: vec![Require::new("yarn")],
            },
        ])
        .expect("non-empty plan");

        assert_eq!(plan.provides, vec![Provide::new("node")]);
        assert_eq!(plan.or.len(), 1);
        assert_eq!(plan.or[0].requires[0].name, "yarn");

        let rendered = toml::to_string(&plan).expect("encode");
        assert!(rendered.contains("[[provides]]"));
        assert!(rendered.contains("[[or.requires]]"));
    }

    #[test]
    fn from_alternatives_is_none_when_everything_is_empty() {
        assert!(BuildPlan::from_alternatives(vec![]).is_none());
        assert!(BuildPlan::from_alternatives(vec![BuildPlanAlternative::default()]).is_none());
    }
}
