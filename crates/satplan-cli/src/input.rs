//! Grounded domain and problem files.
//!
//! Both are YAML (JSON parses too). Facts are referenced by name and get dense
//! ids in declaration order.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use satplan_core::{FactId, GroundAction, GroundProblem, GroundProblemBuilder};

/// Fact universe and ground actions (`-o`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainFile {
    pub facts: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub pre_neg: Vec<String>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub del: Vec<String>,
}

/// Initial state and goal (`-f`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFile {
    /// Facts true initially; everything else is false
    #[serde(default)]
    pub init: Vec<String>,
    #[serde(default)]
    pub goal: GoalSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoalSpec {
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub neg: Vec<String>,
}

fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} from {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {what} from {}", path.display()))
}

pub fn load(domain: &Path, problem: &Path) -> Result<GroundProblem> {
    let domain_file: DomainFile = read_yaml(domain, "domain")?;
    let problem_file: ProblemFile = read_yaml(problem, "problem")?;
    build(domain_file, problem_file)
}

fn resolve(builder: &GroundProblemBuilder, names: &[String], owner: &str) -> Result<Vec<FactId>> {
    names
        .iter()
        .map(|name| match builder.lookup(name) {
            Some(id) => Ok(id),
            None => bail!("unknown fact `{name}` in {owner}"),
        })
        .collect()
}

pub fn build(domain: DomainFile, problem: ProblemFile) -> Result<GroundProblem> {
    let mut builder = GroundProblemBuilder::new();
    for name in domain.facts {
        builder.fact(name)?;
    }

    for spec in &domain.actions {
        let owner = format!("action `{}`", spec.name);
        let action = GroundAction::new(spec.name.clone())
            .with_pre(resolve(&builder, &spec.pre, &owner)?)
            .with_pre_neg(resolve(&builder, &spec.pre_neg, &owner)?)
            .with_add(resolve(&builder, &spec.add, &owner)?)
            .with_del(resolve(&builder, &spec.del, &owner)?);
        builder.action(action);
    }

    for fact in resolve(&builder, &problem.init, "the initial state")? {
        builder.init_true(fact);
    }
    for fact in resolve(&builder, &problem.goal.pos, "the goal")? {
        builder.goal_true(fact);
    }
    for fact in resolve(&builder, &problem.goal.neg, "the goal")? {
        builder.goal_false(fact);
    }

    let problem = builder.build()?;
    tracing::info!(
        facts = problem.fact_count(),
        actions = problem.action_count(),
        goal = problem.goal().len(),
        "loaded grounded problem"
    );
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOMAIN: &str = r#"
facts: [at-a, at-b, lit]
actions:
  - name: move-a-b
    pre: [at-a]
    add: [at-b]
    del: [at-a]
  - name: switch
    pre: [at-b]
    pre_neg: [lit]
    add: [lit]
"#;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_pair() {
        let domain = write(DOMAIN);
        let problem = write("init: [at-a]\ngoal:\n  pos: [lit]\n  neg: [at-a]\n");
        let problem = load(domain.path(), problem.path()).unwrap();

        assert_eq!(problem.fact_count(), 3);
        assert_eq!(problem.action_count(), 2);
        assert_eq!(problem.fact_name(FactId(2)), Some("lit"));
        assert!(problem.init().holds(FactId(0)));
        assert_eq!(problem.goal().pos, vec![FactId(2)]);
        assert_eq!(problem.goal().neg, vec![FactId(0)]);
        let (_, switch) = problem.actions().nth(1).unwrap();
        assert_eq!(switch.pre_neg, vec![FactId(2)]);
    }

    #[test]
    fn json_is_accepted() {
        let domain: DomainFile = serde_yaml::from_str(
            r#"{"facts": ["p"], "actions": [{"name": "make", "add": ["p"]}]}"#,
        )
        .unwrap();
        let problem: ProblemFile = serde_yaml::from_str(r#"{"goal": {"pos": ["p"]}}"#).unwrap();
        let problem = build(domain, problem).unwrap();
        assert_eq!(problem.action_count(), 1);
    }

    #[test]
    fn unknown_fact_names_the_action() {
        let domain: DomainFile = serde_yaml::from_str(
            "facts: [p]\nactions:\n  - name: broken\n    pre: [q]\n",
        )
        .unwrap();
        let err = build(domain, ProblemFile::default()).unwrap_err();
        assert_eq!(err.to_string(), "unknown fact `q` in action `broken`");
    }

    #[test]
    fn duplicate_facts_are_rejected() {
        let domain: DomainFile = serde_yaml::from_str("facts: [p, p]\n").unwrap();
        assert!(build(domain, ProblemFile::default()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let domain = write("facts: [p]\nfluents: [q]\n");
        let problem = write("init: []\n");
        let err = load(domain.path(), problem.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse domain"));
    }
}
