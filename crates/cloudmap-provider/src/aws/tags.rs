//! Tag synchronization for Cloud Map resources
//!
//! Lists and updates the tags on an ARN through [`ServiceDiscoveryOperations`],
//! and converts [`KeyValueTags`] into SDK tag structs.

use crate::aws::error::AwsError;
use crate::aws::servicediscovery::ServiceDiscoveryOperations;
use cloudmap_common::{KeyValueTags, TagDiff};
use tracing::debug;

/// Build SDK tags from a tag map.
pub fn to_sdk_tags(
    tags: &KeyValueTags,
) -> Result<Vec<aws_sdk_servicediscovery::types::Tag>, AwsError> {
    use aws_sdk_servicediscovery::types::Tag;

    tags.iter()
        .map(|(k, v)| {
            Tag::builder()
                .key(k)
                .value(v)
                .build()
                .map_err(|e| AwsError::InvalidInput {
                    message: format!("Failed to build tag {k}: {e}"),
                })
        })
        .collect()
}

/// List the tags on a resource.
pub async fn list_tags<C: ServiceDiscoveryOperations>(
    client: &C,
    arn: &str,
) -> Result<KeyValueTags, AwsError> {
    client.list_tags_for_resource(arn).await
}

/// Bring the tags on `arn` from `old` to `new`.
///
/// `aws:`-prefixed keys are never touched. Removed keys are untagged before
/// new and changed keys are tagged; empty halves issue no call. There is no
/// rollback if the second call fails. Returns the diff that was applied.
pub async fn update_tags<C: ServiceDiscoveryOperations>(
    client: &C,
    arn: &str,
    old: &KeyValueTags,
    new: &KeyValueTags,
) -> Result<TagDiff, AwsError> {
    let old = old.clone().ignore_aws();
    let new = new.clone().ignore_aws();
    let diff = old.diff(&new);

    if !diff.remove.is_empty() {
        debug!(arn = %arn, keys = ?diff.remove, "Removing tags");
        client.untag_resource(arn, diff.remove.clone()).await?;
    }

    if !diff.upsert.is_empty() {
        debug!(arn = %arn, tags = %diff.upsert, "Updating tags");
        client.tag_resource(arn, diff.upsert.clone()).await?;
    }

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeServiceDiscovery, test_tags};

    #[test]
    fn builds_sdk_tags() {
        let sdk_tags = to_sdk_tags(&test_tags(&[("env", "prod"), ("team", "core")])).unwrap();
        assert_eq!(sdk_tags.len(), 2);
        assert_eq!(sdk_tags[0].key(), "env");
        assert_eq!(sdk_tags[0].value(), "prod");
    }

    #[tokio::test]
    async fn update_tags_untags_then_tags() {
        let fake = FakeServiceDiscovery::new();
        let arn = fake.seed_namespace("ns-1", "seeded", test_tags(&[("env", "dev"), ("old", "x")]));

        let diff = update_tags(
            &fake,
            &arn,
            &test_tags(&[("env", "dev"), ("old", "x")]),
            &test_tags(&[("env", "prod")]),
        )
        .await
        .unwrap();

        assert_eq!(diff.remove, vec!["old".to_string()]);
        assert_eq!(fake.calls("untag_resource"), 1);
        assert_eq!(fake.calls("tag_resource"), 1);
        assert_eq!(
            list_tags(&fake, &arn).await.unwrap(),
            test_tags(&[("env", "prod")])
        );
    }

    #[tokio::test]
    async fn update_tags_skips_empty_halves() {
        let fake = FakeServiceDiscovery::new();
        let arn = fake.seed_namespace("ns-1", "seeded", test_tags(&[("env", "dev")]));

        update_tags(
            &fake,
            &arn,
            &test_tags(&[("env", "dev")]),
            &test_tags(&[("env", "dev"), ("team", "core")]),
        )
        .await
        .unwrap();

        assert_eq!(fake.calls("untag_resource"), 0);
        assert_eq!(fake.calls("tag_resource"), 1);
    }

    #[tokio::test]
    async fn update_tags_never_touches_aws_keys() {
        let fake = FakeServiceDiscovery::new();
        let arn = fake.seed_namespace(
            "ns-1",
            "seeded",
            test_tags(&[("aws:cloudformation:stack-id", "s")]),
        );

        let diff = update_tags(
            &fake,
            &arn,
            &test_tags(&[("aws:cloudformation:stack-id", "s")]),
            &KeyValueTags::new(),
        )
        .await
        .unwrap();

        assert!(diff.is_empty());
        assert_eq!(fake.calls("untag_resource"), 0);
        assert_eq!(fake.calls("tag_resource"), 0);
    }
}
