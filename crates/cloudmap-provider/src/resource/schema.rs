//! Attribute schema and change planning for HTTP namespaces
//!
//! | Attribute | Required | Changes force replacement | Computed |
//! |-----------|----------|---------------------------|----------|
//! | `name` | yes | yes | no |
//! | `description` | no | yes | no |
//! | `tags` | no | no | no |
//! | `arn` | no | no | yes |
//!
//! Import is passthrough: the namespace ID is the only input.

use crate::resource::lifecycle::{NamespaceConfig, NamespaceRecord};
use cloudmap_common::{IgnoreTagsConfig, TagDiff, validate_namespace_name};

/// Cloud Map's limit on namespace descriptions
pub const MAX_DESCRIPTION_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Name,
    Description,
    Tags,
    Arn,
}

/// How an attribute behaves across the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSchema {
    pub attribute: Attribute,
    pub required: bool,
    pub force_new: bool,
    pub computed: bool,
}

pub const SCHEMA: &[AttributeSchema] = &[
    AttributeSchema {
        attribute: Attribute::Name,
        required: true,
        force_new: true,
        computed: false,
    },
    AttributeSchema {
        attribute: Attribute::Description,
        required: false,
        force_new: true,
        computed: false,
    },
    AttributeSchema {
        attribute: Attribute::Tags,
        required: false,
        force_new: false,
        computed: false,
    },
    AttributeSchema {
        attribute: Attribute::Arn,
        required: false,
        force_new: false,
        computed: true,
    },
];

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Description => "description",
            Attribute::Tags => "tags",
            Attribute::Arn => "arn",
        }
    }

    pub fn schema(self) -> &'static AttributeSchema {
        match self {
            Attribute::Name => &SCHEMA[0],
            Attribute::Description => &SCHEMA[1],
            Attribute::Tags => &SCHEMA[2],
            Attribute::Arn => &SCHEMA[3],
        }
    }

    pub fn forces_replacement(self) -> bool {
        self.schema().force_new
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration value that fails its attribute's validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub attribute: Attribute,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attribute, self.message)
    }
}

/// Run every attribute validator, collecting all violations.
pub fn validate(config: &NamespaceConfig) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if let Err(e) = validate_namespace_name(&config.name) {
        violations.push(Violation {
            attribute: Attribute::Name,
            message: e.to_string(),
        });
    }

    if let Some(description) = &config.description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            violations.push(Violation {
                attribute: Attribute::Description,
                message: format!("must be at most {MAX_DESCRIPTION_LEN} characters, got {len}"),
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// What it takes to move a namespace from its prior record to the desired configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing exists yet
    Create,
    /// A creation-time-only attribute changed: delete, then create
    Replace { attributes: Vec<Attribute> },
    /// Only tags changed
    Update { tags: TagDiff },
    NoOp,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Create => f.write_str("create"),
            Plan::Replace { attributes } => {
                let names: Vec<&str> = attributes.iter().map(|a| a.as_str()).collect();
                write!(f, "replace (forced by {})", names.join(", "))
            }
            Plan::Update { tags } => {
                write!(f, "update tags")?;
                if !tags.upsert.is_empty() {
                    write!(f, " set [{}]", tags.upsert)?;
                }
                if !tags.remove.is_empty() {
                    write!(f, " remove [{}]", tags.remove.join(", "))?;
                }
                Ok(())
            }
            Plan::NoOp => f.write_str("no changes"),
        }
    }
}

/// Decide how to reach `desired` from `prior`.
///
/// Desired tags are filtered the same way Read filters remote tags, so
/// `aws:` keys and ignored keys never show up as drift.
pub fn plan(
    prior: Option<&NamespaceRecord>,
    desired: &NamespaceConfig,
    ignore_tags: &IgnoreTagsConfig,
) -> Plan {
    let Some(prior) = prior else {
        return Plan::Create;
    };

    let mut forced = Vec::new();
    if prior.name != desired.name {
        forced.push(Attribute::Name);
    }
    let prior_description = prior.description.as_deref().filter(|d| !d.is_empty());
    if prior_description != desired.normalized_description() {
        forced.push(Attribute::Description);
    }
    if !forced.is_empty() {
        return Plan::Replace { attributes: forced };
    }

    let desired_tags = desired
        .tags
        .clone()
        .ignore_aws()
        .ignore_config(ignore_tags);
    let diff = prior.tags.diff(&desired_tags);
    if diff.is_empty() {
        Plan::NoOp
    } else {
        Plan::Update { tags: diff }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_tags;
    use cloudmap_common::KeyValueTags;

    fn prior() -> NamespaceRecord {
        NamespaceRecord {
            id: "ns-1".to_string(),
            name: "my-ns".to_string(),
            description: Some("d".to_string()),
            arn: "arn:aws:servicediscovery:us-east-1:123456789012:namespace/ns-1".to_string(),
            tags: test_tags(&[("env", "prod")]),
        }
    }

    fn desired() -> NamespaceConfig {
        NamespaceConfig::new("my-ns")
            .with_description("d")
            .with_tags(test_tags(&[("env", "prod")]))
    }

    #[test]
    fn schema_table_matches_attributes() {
        for attribute in [
            Attribute::Name,
            Attribute::Description,
            Attribute::Tags,
            Attribute::Arn,
        ] {
            assert_eq!(attribute.schema().attribute, attribute);
        }
        assert!(Attribute::Name.schema().required);
        assert!(Attribute::Name.forces_replacement());
        assert!(Attribute::Description.forces_replacement());
        assert!(!Attribute::Tags.forces_replacement());
        assert!(Attribute::Arn.schema().computed);
    }

    #[test]
    fn nothing_prior_plans_create() {
        assert_eq!(
            plan(None, &desired(), &IgnoreTagsConfig::default()),
            Plan::Create
        );
    }

    #[test]
    fn identical_config_is_noop() {
        assert_eq!(
            plan(Some(&prior()), &desired(), &IgnoreTagsConfig::default()),
            Plan::NoOp
        );
    }

    #[test]
    fn name_or_description_change_forces_replace() {
        let mut renamed = desired();
        renamed.name = "other-ns".to_string();
        assert_eq!(
            plan(Some(&prior()), &renamed, &IgnoreTagsConfig::default()),
            Plan::Replace {
                attributes: vec![Attribute::Name]
            }
        );

        let both = NamespaceConfig::new("other-ns").with_tags(test_tags(&[("env", "dev")]));
        assert_eq!(
            plan(Some(&prior()), &both, &IgnoreTagsConfig::default()),
            Plan::Replace {
                attributes: vec![Attribute::Name, Attribute::Description]
            }
        );
    }

    #[test]
    fn empty_description_matches_unset() {
        let mut record = prior();
        record.description = None;
        let config = NamespaceConfig::new("my-ns")
            .with_description("")
            .with_tags(test_tags(&[("env", "prod")]));

        assert_eq!(
            plan(Some(&record), &config, &IgnoreTagsConfig::default()),
            Plan::NoOp
        );
    }

    #[test]
    fn tag_only_change_is_update() {
        let config = desired().with_tags(test_tags(&[("env", "staging"), ("team", "core")]));

        match plan(Some(&prior()), &config, &IgnoreTagsConfig::default()) {
            Plan::Update { tags } => {
                assert_eq!(tags.upsert, test_tags(&[("env", "staging"), ("team", "core")]));
                assert!(tags.remove.is_empty());
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn ignored_tag_differences_are_noop() {
        let ignore = IgnoreTagsConfig {
            keys: ["owner".to_string()].into_iter().collect(),
            key_prefixes: vec!["kubernetes.io/".to_string()],
        };
        let config = desired().with_tags(test_tags(&[
            ("env", "prod"),
            ("owner", "someone"),
            ("kubernetes.io/cluster", "a"),
            ("aws:reserved", "x"),
        ]));

        assert_eq!(plan(Some(&prior()), &config, &ignore), Plan::NoOp);
    }

    #[test]
    fn validate_reports_every_violation() {
        let config = NamespaceConfig::new("bad name").with_description("x".repeat(1025));

        let violations = validate(&config).unwrap_err();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].attribute, Attribute::Name);
        assert_eq!(violations[1].attribute, Attribute::Description);
        assert!(validate(&desired()).is_ok());
    }

    #[test]
    fn plan_display() {
        assert_eq!(Plan::NoOp.to_string(), "no changes");
        assert_eq!(
            Plan::Replace {
                attributes: vec![Attribute::Name]
            }
            .to_string(),
            "replace (forced by name)"
        );
        let update = Plan::Update {
            tags: KeyValueTags::new().diff(&test_tags(&[("env", "prod")])),
        };
        assert_eq!(update.to_string(), "update tags set [env=prod]");
    }
}
