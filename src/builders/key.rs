use tracing::debug;

use crate::error::TrailError;
use crate::types::{
    Condition, ConditionOperator, PolicyDocument, PolicyStatement, Principal, TRAIL_SERVICE,
};

pub const SID_ROOT_PERMISSIONS: &str = "EnableRootAccountPermissions";
pub const SID_TRAIL_ENCRYPT: &str = "AllowCloudTrailEncrypt";
pub const SID_TRAIL_DESCRIBE_KEY: &str = "AllowCloudTrailDescribeKey";
pub const SID_ACCOUNT_DECRYPT: &str = "AllowAccountDecrypt";

/// Encryption-context key carrying the ARN of the trail requesting a data key.
pub const TRAIL_ENCRYPTION_CONTEXT_KEY: &str = "kms:EncryptionContext:aws:cloudtrail:arn";

/// Build the key policy for the trail encryption key.
///
/// The document always has four statements, in order:
/// 1. root of the primary account gets `kms:*` (administrative escape hatch)
/// 2. the trail service may generate data keys for trails matching `trail_resource_pattern`
/// 3. the trail service may describe the key
/// 4. any principal may decrypt, but only from the primary account *and* for
///    trails matching the pattern; both conditions are required
pub fn build_key_policy(
    primary_account_id: &str,
    trail_resource_pattern: &str,
) -> Result<PolicyDocument, TrailError> {
    if primary_account_id.is_empty() {
        return Err(TrailError::missing("primary_account_id"));
    }
    if trail_resource_pattern.is_empty() {
        return Err(TrailError::missing("trail_resource_pattern"));
    }

    let encryption_context = || {
        Condition::new(
            ConditionOperator::StringLike,
            TRAIL_ENCRYPTION_CONTEXT_KEY,
            [trail_resource_pattern],
        )
    };

    let doc = PolicyDocument::from_statements([
        PolicyStatement::allow(SID_ROOT_PERMISSIONS, Principal::account_root(primary_account_id))
            .with_action("kms:*")
            .with_resource("*"),
        PolicyStatement::allow(SID_TRAIL_ENCRYPT, Principal::service(TRAIL_SERVICE))
            .with_action("kms:GenerateDataKey*")
            .with_resource("*")
            .with_condition(encryption_context()?)?,
        PolicyStatement::allow(SID_TRAIL_DESCRIBE_KEY, Principal::service(TRAIL_SERVICE))
            .with_action("kms:DescribeKey")
            .with_resource("*"),
        PolicyStatement::allow(SID_ACCOUNT_DECRYPT, Principal::any())
            .with_actions(["kms:Decrypt", "kms:ReEncryptFrom"])
            .with_resource("*")
            .with_condition(Condition::new(
                ConditionOperator::StringEquals,
                "kms:CallerAccount",
                [primary_account_id],
            )?)?
            .with_condition(encryption_context()?)?,
    ])?;

    debug!(
        event = "Policy",
        phase = "Key",
        account = primary_account_id,
        statements = doc.len()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arn::trail_pattern;
    use crate::types::{Effect, PrincipalKind};
    use serde_json::json;

    const ACCOUNT: &str = "111111111111";

    fn key_policy() -> PolicyDocument {
        build_key_policy(ACCOUNT, &trail_pattern(ACCOUNT)).unwrap()
    }

    #[test]
    fn test_key_policy_has_four_statements_in_order() {
        let doc = key_policy();
        assert_eq!(
            doc.sids(),
            vec![
                SID_ROOT_PERMISSIONS,
                SID_TRAIL_ENCRYPT,
                SID_TRAIL_DESCRIBE_KEY,
                SID_ACCOUNT_DECRYPT
            ]
        );
        assert!(doc.statements().iter().all(|s| s.effect() == Effect::Allow));
    }

    #[test]
    fn test_root_statement_is_unconditional() {
        let doc = key_policy();
        let root = doc.statement(SID_ROOT_PERMISSIONS).unwrap();
        assert!(!root.is_conditional());
        assert_eq!(root.principal(), &Principal::account_root(ACCOUNT));
        assert_eq!(root.actions(), &["kms:*".to_string()]);
    }

    #[test]
    fn test_describe_key_is_unconditional_for_service() {
        let doc = key_policy();
        let describe = doc.statement(SID_TRAIL_DESCRIBE_KEY).unwrap();
        assert!(!describe.is_conditional());
        assert_eq!(describe.principal().kind(), PrincipalKind::Service);
    }

    #[test]
    fn test_decrypt_statement_keeps_both_conditions() {
        let doc = key_policy();
        let decrypt = doc.statement(SID_ACCOUNT_DECRYPT).unwrap();
        assert!(decrypt.principal().is_any());
        assert_eq!(decrypt.conditions().len(), 2);

        let caller = &decrypt.conditions()[0];
        assert_eq!(caller.operator(), ConditionOperator::StringEquals);
        assert_eq!(caller.key(), "kms:CallerAccount");
        assert_eq!(caller.values(), &[ACCOUNT.to_string()]);

        let context = &decrypt.conditions()[1];
        assert_eq!(context.operator(), ConditionOperator::StringLike);
        assert_eq!(context.key(), TRAIL_ENCRYPTION_CONTEXT_KEY);
        assert_eq!(context.values(), &[trail_pattern(ACCOUNT)]);
    }

    #[test]
    fn test_encrypt_and_decrypt_share_the_trail_pattern() {
        let doc = key_policy();
        let encrypt = doc.statement(SID_TRAIL_ENCRYPT).unwrap();
        let decrypt = doc.statement(SID_ACCOUNT_DECRYPT).unwrap();
        assert_eq!(encrypt.conditions()[0], decrypt.conditions()[1]);
    }

    #[test]
    fn test_key_policy_json() {
        let value = serde_json::to_value(key_policy()).unwrap();
        assert_eq!(
            value,
            json!({
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Sid": "EnableRootAccountPermissions",
                        "Effect": "Allow",
                        "Principal": {"AWS": ["arn:aws:iam::111111111111:root"]},
                        "Action": ["kms:*"],
                        "Resource": ["*"],
                    },
                    {
                        "Sid": "AllowCloudTrailEncrypt",
                        "Effect": "Allow",
                        "Principal": {"Service": ["cloudtrail.amazonaws.com"]},
                        "Action": ["kms:GenerateDataKey*"],
                        "Resource": ["*"],
                        "Condition": {
                            "StringLike": {
                                "kms:EncryptionContext:aws:cloudtrail:arn":
                                    ["arn:aws:cloudtrail:*:111111111111:trail/*"]
                            }
                        },
                    },
                    {
                        "Sid": "AllowCloudTrailDescribeKey",
                        "Effect": "Allow",
                        "Principal": {"Service": ["cloudtrail.amazonaws.com"]},
                        "Action": ["kms:DescribeKey"],
                        "Resource": ["*"],
                    },
                    {
                        "Sid": "AllowAccountDecrypt",
                        "Effect": "Allow",
                        "Principal": {"AWS": ["*"]},
                        "Action": ["kms:Decrypt", "kms:ReEncryptFrom"],
                        "Resource": ["*"],
                        "Condition": {
                            "StringEquals": {"kms:CallerAccount": ["111111111111"]},
                            "StringLike": {
                                "kms:EncryptionContext:aws:cloudtrail:arn":
                                    ["arn:aws:cloudtrail:*:111111111111:trail/*"]
                            }
                        },
                    },
                ]
            })
        );
    }

    #[test]
    fn test_missing_account_is_reported() {
        assert_eq!(
            build_key_policy("", "arn:aws:cloudtrail:*:1:trail/*"),
            Err(TrailError::missing("primary_account_id"))
        );
    }
}
