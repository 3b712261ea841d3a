use std::collections::BTreeSet;

use yare::parameterized;

use crate::builders::{
    SID_ACCOUNT_DECRYPT, SID_DENY_INSECURE_TRANSPORT, SID_TRAIL_PUBLISH, SID_TRAIL_WRITE,
    SOURCE_ACCOUNT_KEY,
};
use crate::{
    AttrValue, CaptureMode, Configuration, Effect, IdentityFacts, PipelineAssembler,
    PolicyDocument, ResourceGraph, build_notification_policy, build_storage_policy,
};

const ACCOUNT: &str = "111111111111";

fn assemble(config: &Configuration) -> ResourceGraph {
    PipelineAssembler::new()
        .assemble(config, &IdentityFacts::new(ACCOUNT, "eu-west-1"))
        .unwrap()
}

fn policy_of<'a>(graph: &'a ResourceGraph, address: &str) -> &'a PolicyDocument {
    graph
        .get(address)
        .and_then(|n| n.attr("policy"))
        .and_then(AttrValue::as_policy)
        .unwrap_or_else(|| panic!("{address} carries no policy"))
}

fn config(notify: bool, cross: bool, trusted: &[&str]) -> Configuration {
    let mut config = Configuration::new("prod", "my-trail", "my-logs");
    config.send_to_notification_topic = notify;
    config.allow_cross_account_notification = cross;
    config.cross_account_ids = trusted.iter().map(|s| s.to_string()).collect();
    config
}

#[test]
fn test_write_patterns_for_known_accounts() {
    let doc = build_storage_policy("my-trail", &["111111111111", "222222222222"]).unwrap();
    let expected: BTreeSet<String> = [
        "arn:aws:s3:::my-trail/AWSLogs/111111111111/*",
        "arn:aws:s3:::my-trail/AWSLogs/222222222222/*",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(doc.statement(SID_TRAIL_WRITE).unwrap().resources(), &expected);
}

#[parameterized(
    no_notifications = { false, false, &[] },
    no_notifications_with_trusted = { false, false, &["222222222222"] },
    notifications = { true, false, &[] },
    notifications_cross_account = { true, true, &["222222222222", "333333333333"] },
)]
fn test_storage_policy_always_denies_insecure_transport(
    notify: bool,
    cross: bool,
    trusted: &[&str],
) {
    let graph = assemble(&config(notify, cross, trusted));
    let policy = policy_of(&graph, "aws_s3_bucket.audit");
    let denies: Vec<_> = policy.with_effect(Effect::Deny).collect();
    assert_eq!(denies.len(), 1);
    assert_eq!(denies[0].sid(), SID_DENY_INSECURE_TRANSPORT);
    assert_eq!(denies[0].conditions()[0].key(), "aws:SecureTransport");
}

#[parameterized(
    no_trusted = { &[] },
    one_trusted = { &["222222222222"] },
    two_trusted = { &["222222222222", "333333333333"] },
)]
fn test_same_account_publish_has_no_condition(trusted: &[&str]) {
    let graph = assemble(&config(true, false, trusted));
    let policy = policy_of(&graph, "aws_sns_topic_policy.audit");
    let publish = policy.statement(SID_TRAIL_PUBLISH).unwrap();
    assert!(publish.conditions().is_empty());
}

#[parameterized(
    one_trusted = { &["222222222222"] },
    two_trusted = { &["333333333333", "222222222222"] },
)]
fn test_cross_account_publish_has_one_condition(trusted: &[&str]) {
    let graph = assemble(&config(true, true, trusted));
    let policy = policy_of(&graph, "aws_sns_topic_policy.audit");
    let publish = policy.statement(SID_TRAIL_PUBLISH).unwrap();
    assert_eq!(publish.conditions().len(), 1);

    // The primary account keeps publishing alongside the trusted ones.
    let values: BTreeSet<&str> = publish.conditions()[0]
        .values()
        .iter()
        .map(String::as_str)
        .collect();
    let expected: BTreeSet<&str> = std::iter::once(ACCOUNT)
        .chain(trusted.iter().copied())
        .collect();
    assert_eq!(values, expected);
}

#[test]
fn test_builder_condition_equals_given_accounts() {
    let accounts = ["222222222222", "111111111111"];
    let topic = "arn:aws:sns:eu-west-1:111111111111:t";
    let doc = build_notification_policy(Some(topic), true, &accounts)
        .unwrap()
        .unwrap();
    let cond = &doc.statement(SID_TRAIL_PUBLISH).unwrap().conditions()[0];
    assert_eq!(cond.key(), SOURCE_ACCOUNT_KEY);
    let values: BTreeSet<&str> = cond.values().iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = accounts.into_iter().collect();
    assert_eq!(values, expected);
}

#[parameterized(
    none = { CaptureMode::None },
    read_only = { CaptureMode::ReadOnly },
    read_write = { CaptureMode::ReadWrite },
)]
fn test_key_decrypt_keeps_both_conditions(mode: CaptureMode) {
    let mut config = config(true, true, &["222222222222"]);
    config.capture_mode = mode;
    let graph = assemble(&config);
    let policy = policy_of(&graph, "aws_kms_key.audit");
    assert_eq!(policy.len(), 4);
    let decrypt = policy.statement(SID_ACCOUNT_DECRYPT).unwrap();
    let keys: Vec<&str> = decrypt.conditions().iter().map(|c| c.key()).collect();
    assert_eq!(
        keys,
        vec!["kms:CallerAccount", "kms:EncryptionContext:aws:cloudtrail:arn"]
    );
    assert_eq!(decrypt.conditions()[0].values(), &[ACCOUNT.to_string()]);
}

#[test]
fn test_statement_ids_unique_in_every_document() {
    let graph = assemble(&config(true, true, &["222222222222"]));
    for address in [
        "aws_kms_key.audit",
        "aws_s3_bucket.audit",
        "aws_sns_topic_policy.audit",
    ] {
        let policy = policy_of(&graph, address);
        let sids: BTreeSet<&str> = policy.sids().into_iter().collect();
        assert_eq!(sids.len(), policy.len(), "{address} repeats a statement id");
    }
}
