//! End-to-end tests for the explode + cleanup pipeline.

use cfn_resolve::{
    resolve, resolved, CloudError, CloudProvider, OfflineCloud, ResolveError, ResolveOptions,
    StaticCloud,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::cell::Cell;

fn cloud() -> StaticCloud {
    StaticCloud::new()
        .with_zones("us-east-1", ["us-east-1a", "us-east-1b"])
        .with_export("SharedVpc", "vpc-123")
}

fn check(template: Value, expected: Value) {
    let options = ResolveOptions::new("us-east-1");
    let result = resolved(template.clone(), &options, &cloud())
        .unwrap_or_else(|e| panic!("resolve({}) failed: {}", template, e));
    assert_eq!(result, expected, "template: {}", template);
}

fn check_err(template: Value) -> ResolveError {
    let options = ResolveOptions::new("us-east-1");
    resolved(template.clone(), &options, &cloud())
        .err()
        .unwrap_or_else(|| panic!("expected error for {}", template))
}

#[derive(Default)]
struct CountingCloud {
    zones: Cell<usize>,
    exports: Cell<usize>,
}

impl CloudProvider for CountingCloud {
    fn list_availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        self.zones.set(self.zones.get() + 1);
        Ok(vec![format!("{}a", region)])
    }

    fn list_exports(&self) -> Result<IndexMap<String, String>, CloudError> {
        self.exports.set(self.exports.get() + 1);
        Ok(IndexMap::from([("Vpc".to_string(), "vpc-9".to_string())]))
    }
}

// ----------------------------------------------------------------- Conditions

#[test]
fn test_false_condition_removes_resource() {
    check(
        json!({
            "Conditions": {"ConditionName": {"Fn::Equals": [1, 2]}},
            "Resources": {"SomeResource": {"Condition": "ConditionName", "Type": "AWS::Lambda::Function"}}
        }),
        json!({"Conditions": {"ConditionName": false}, "Resources": {}}),
    );
}

#[test]
fn test_true_condition_keeps_resource() {
    check(
        json!({
            "Conditions": {"ConditionName": {"Fn::Equals": [1, 1]}},
            "Resources": {"SomeResource": {"Condition": "ConditionName", "Type": "AWS::Lambda::Function"}}
        }),
        json!({
            "Conditions": {"ConditionName": true},
            "Resources": {"SomeResource": {"Condition": "ConditionName", "Type": "AWS::Lambda::Function"}}
        }),
    );
}

#[test]
fn test_resource_before_conditions_section() {
    check(
        json!({
            "Resources": {"SomeResource": {"Condition": "Off", "Type": "AWS::SNS::Topic"}},
            "Conditions": {"Off": {"Fn::Not": [{"Fn::Equals": ["a", "a"]}]}}
        }),
        json!({"Resources": {}, "Conditions": {"Off": false}}),
    );
}

#[test]
fn test_condition_key_with_object_value_is_data() {
    let policy = json!({
        "Resources": {
            "SomeResource": {
                "Condition": {"DateGreaterThan": {"aws:CurrentTime": "2013-12-15T12:00:00Z"}},
                "Type": "AWS::IAM::Role"
            }
        }
    });
    check(policy.clone(), policy);
}

#[test]
fn test_if_with_no_value_removes_property() {
    check(
        json!({
            "Conditions": {"ConditionName": {"Fn::Equals": [1, 2]}},
            "Resources": {"SomeResource": {
                "Attribute": {"Fn::If": ["ConditionName", "1", {"Ref": "AWS::NoValue"}]},
                "Type": "AWS::Lambda::Function"
            }}
        }),
        json!({
            "Conditions": {"ConditionName": false},
            "Resources": {"SomeResource": {"Type": "AWS::Lambda::Function"}}
        }),
    );
}

#[test]
fn test_condition_on_resource_name_reference() {
    check(
        json!({
            "Conditions": {"ConditionName": {"Fn::Equals": [{"Ref": "SomeBucket"}, "SomeBucketName"]}},
            "Resources": {
                "SomeBucket": {"Properties": {"BucketName": "SomeBucketName"}, "Type": "AWS::S3::Bucket"},
                "SomeResource": {"Attribute": {"Fn::If": ["ConditionName", "1", "2"]}, "Type": "AWS::Lambda::Function"}
            }
        }),
        json!({
            "Conditions": {"ConditionName": true},
            "Resources": {
                "SomeBucket": {"Properties": {"BucketName": "SomeBucketName"}, "Type": "AWS::S3::Bucket"},
                "SomeResource": {"Attribute": "1", "Type": "AWS::Lambda::Function"}
            }
        }),
    );
}

#[test]
fn test_conditional_property_block() {
    check(
        json!({
            "Conditions": {"Never": {"Fn::Equals": ["x", "y"]}},
            "Resources": {"Fn": {"Type": "AWS::Lambda::Function", "Properties": {
                "Tracing": {"Condition": "Never", "Mode": "Active"},
                "Memory": 128
            }}}
        }),
        json!({
            "Conditions": {"Never": false},
            "Resources": {"Fn": {"Type": "AWS::Lambda::Function", "Properties": {"Memory": 128}}}
        }),
    );
}

#[test]
fn test_cyclic_condition_is_an_error() {
    let err = check_err(json!({
        "Conditions": {
            "A": {"Fn::Not": [{"Condition": "B"}]},
            "B": {"Fn::Not": [{"Condition": "A"}]}
        }
    }));
    assert!(matches!(err, ResolveError::CyclicCondition(_)), "got: {}", err);
}

#[test]
fn test_undeclared_condition_is_an_error() {
    let err = check_err(json!({
        "Conditions": {},
        "Resources": {"R": {"Type": "AWS::SNS::Topic", "Condition": "Missing"}}
    }));
    assert!(matches!(err, ResolveError::UnknownCondition(ref name) if name == "Missing"));

    let err = check_err(json!({"Resources": {"R": {"Type": "AWS::SNS::Topic", "Condition": "Missing"}}}));
    assert!(matches!(err, ResolveError::UnknownCondition(_)));
}

// ------------------------------------------------------------------ Deletion

#[test]
fn test_no_value_removes_property() {
    check(
        json!({"Resources": {"Q": {"Type": "AWS::SQS::Queue", "Properties": {
            "QueueName": {"Ref": "AWS::NoValue"},
            "DelaySeconds": 5
        }}}}),
        json!({"Resources": {"Q": {"Type": "AWS::SQS::Queue", "Properties": {"DelaySeconds": 5}}}}),
    );
}

#[test]
fn test_no_value_in_array_shifts_elements() {
    check(
        json!({"List": [{"Ref": "AWS::NoValue"}, "a", {"Ref": "AWS::NoValue"}, {"Ref": "AWS::NoValue"}, "b", "c"]}),
        json!({"List": ["a", "b", "c"]}),
    );
}

#[test]
fn test_null_passes_through() {
    let template = json!({"Resources": {"R": {"Type": "AWS::SNS::Topic", "Properties": {"P": null, "L": [null]}}}});
    check(template.clone(), template);
}

#[test]
fn test_unknown_single_key_objects_are_data() {
    let template = json!({"Outputs": {
        "A": {"Fn::Cidr": ["10.0.0.0/16", 2, 8]},
        "B": {"Value": "plain"},
        "C": {"Condition": 42}
    }});
    check(template.clone(), template);
}

#[test]
fn test_root_outcomes() {
    check(json!({"Fn::Join": ["-", ["a", "b"]]}), json!("a-b"));
    check(
        json!({"Conditions": {"No": {"Fn::Equals": [0, 1]}}, "Condition": "No"}),
        Value::Null,
    );
}

// -------------------------------------------------------------- Evaluation order

#[test]
fn test_both_if_branches_are_evaluated() {
    let provider = CountingCloud::default();
    let options = ResolveOptions::new("us-east-1");
    let result = resolved(
        json!({
            "Conditions": {"On": {"Fn::Equals": [1, 1]}},
            "Out": {"Fn::If": ["On", "taken", {"Fn::ImportValue": "Vpc"}]}
        }),
        &options,
        &provider,
    )
    .unwrap();
    assert_eq!(result["Out"], json!("taken"));
    assert_eq!(provider.exports.get(), 1);
}

#[test]
fn test_export_table_fetched_once_per_resolution() {
    let provider = CountingCloud::default();
    let options = ResolveOptions::new("us-east-1");
    let template = json!({"Outputs": [
        {"Fn::ImportValue": "Vpc"},
        {"Fn::ImportValue": "Vpc"},
        {"Fn::ImportValue": "Other"}
    ]});
    let result = resolved(template.clone(), &options, &provider).unwrap();
    assert_eq!(
        result,
        json!({"Outputs": ["vpc-9", "vpc-9", "UNKNOWN IMPORT VALUE: Other"]})
    );
    assert_eq!(provider.exports.get(), 1);

    resolved(template, &options, &provider).unwrap();
    assert_eq!(provider.exports.get(), 2);
}

#[test]
fn test_resource_referenced_early_is_exploded_once() {
    let provider = CountingCloud::default();
    let options = ResolveOptions::new("us-east-1");
    let result = resolved(
        json!({
            "Outputs": {
                "First": {"Fn::GetAtt": ["Subnet", "Zones"]},
                "Text": {"Fn::Sub": "${Subnet.Zones}"}
            },
            "Resources": {
                "Subnet": {"Type": "AWS::EC2::Subnet", "Properties": {"Zones": {"Fn::GetAZs": ""}}}
            }
        }),
        &options,
        &provider,
    )
    .unwrap();
    assert_eq!(
        result,
        json!({
            "Outputs": {"First": ["us-east-1a"], "Text": "[\"us-east-1a\"]"},
            "Resources": {
                "Subnet": {"Type": "AWS::EC2::Subnet", "Properties": {"Zones": ["us-east-1a"]}}
            }
        })
    );
    assert_eq!(provider.zones.get(), 1);
}

#[test]
fn test_references_to_removed_resources_are_sentinels() {
    check(
        json!({
            "Conditions": {"Off": {"Fn::Equals": [1, 0]}},
            "Resources": {
                "Gone": {"Type": "AWS::S3::Bucket", "Condition": "Off", "Properties": {"BucketName": "b"}},
                "User": {"Type": "AWS::SNS::Topic", "Properties": {
                    "TopicName": {"Ref": "Gone"},
                    "DisplayName": {"Fn::GetAtt": ["Gone", "BucketName"]}
                }}
            }
        }),
        json!({
            "Conditions": {"Off": false},
            "Resources": {"User": {"Type": "AWS::SNS::Topic", "Properties": {
                "TopicName": "UNKNOWN REF: Gone",
                "DisplayName": "UNKNOWN ATT: Gone.BucketName"
            }}}
        }),
    );
}

#[test]
fn test_get_att_to_own_ancestor_is_a_cycle() {
    let err = check_err(json!({"Resources": {"A": {"Type": "AWS::SNS::Topic", "Properties": {
        "Copy": {"Fn::GetAtt": ["A", "Properties"]}
    }}}}));
    assert!(matches!(err, ResolveError::Cycle), "got: {}", err);
}

#[test]
fn test_equals_on_self_containing_resources_is_a_cycle() {
    let err = check_err(json!({
        "Conditions": {"Same": {"Fn::Equals": [
            {"Fn::GetAtt": ["A", "Properties"]},
            {"Fn::GetAtt": ["B", "Properties"]}
        ]}},
        "Resources": {
            "A": {"Type": "AWS::SNS::Topic", "Properties": {"Copy": {"Fn::GetAtt": ["A", "Properties"]}}},
            "B": {"Type": "AWS::SNS::Topic", "Properties": {"Copy": {"Fn::GetAtt": ["B", "Properties"]}}}
        }
    }));
    assert!(matches!(err, ResolveError::Cycle), "got: {}", err);
}

#[test]
fn test_get_att_to_removed_property_removes_the_reference() {
    check(
        json!({
            "Resources": {"R": {"Properties": {
                "Gone": {"Ref": "AWS::NoValue"},
                "Inner": {"Gone": "deeper"}
            }}},
            "Out": {"Value": {"Fn::GetAtt": ["R", "Gone"]}, "Kept": 1}
        }),
        json!({
            "Resources": {"R": {"Properties": {"Inner": {"Gone": "deeper"}}}},
            "Out": {"Kept": 1}
        }),
    );
}

// -------------------------------------------------------------- Idempotence

#[test]
fn test_second_run_is_a_no_op() {
    let template = json!({
        "Conditions": {"On": {"Fn::Or": [{"Fn::Equals": ["a", "b"]}, {"Fn::Equals": ["c", "c"]}]}},
        "Mappings": {"M": {"us-east-1": {"Ami": "ami-1"}}},
        "Resources": {
            "I": {"Type": "AWS::EC2::Instance", "Condition": "On", "Properties": {
                "ImageId": {"Fn::FindInMap": ["M", {"Ref": "AWS::Region"}, "Ami"]},
                "AvailabilityZone": {"Fn::Select": [0, {"Fn::GetAZs": ""}]},
                "UserData": {"Fn::Base64": {"Fn::Sub": "echo ${AWS::Region}"}},
                "Tags": [{"Key": "a", "Value": {"Ref": "AWS::NoValue"}}, {"Ref": "AWS::NoValue"}]
            }}
        }
    });
    let options = ResolveOptions::new("us-east-1");
    let once = resolved(template, &options, &cloud()).unwrap();
    let twice = resolved(once.clone(), &options, &cloud()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        once["Resources"]["I"]["Properties"],
        json!({
            "ImageId": "ami-1",
            "AvailabilityZone": "us-east-1a",
            "UserData": "ZWNobyB1cy1lYXN0LTE=",
            "Tags": [{"Key": "a"}]
        })
    );
}

// ------------------------------------------------------------------- Errors

#[test]
fn test_missing_region_fails_before_traversal() {
    let mut template = json!({"Out": {"Fn::GetAZs": ""}});
    let before = template.clone();
    let err = resolve(&mut template, &ResolveOptions::new(""), &OfflineCloud).unwrap_err();
    assert!(matches!(err, ResolveError::MissingDefaultRegion));
    assert_eq!(template, before);
}

#[test]
fn test_failed_resolution_leaves_template_untouched() {
    let mut template = json!({"A": {"Ref": "AWS::Region"}, "B": {"Fn::Join": "not-a-list"}});
    let before = template.clone();
    let err = resolve(&mut template, &ResolveOptions::new("us-east-1"), &cloud()).unwrap_err();
    assert!(matches!(err, ResolveError::NotArray("Fn::Join")), "got: {}", err);
    assert_eq!(template, before);
}

#[test]
fn test_collaborator_failure_propagates() {
    let options = ResolveOptions::new("us-east-1");
    let err = resolved(json!({"Out": {"Fn::GetAZs": ""}}), &options, &OfflineCloud).unwrap_err();
    assert!(matches!(err, ResolveError::Cloud(CloudError::Unavailable(_))), "got: {}", err);
}

#[test]
fn test_depth_limit() {
    let mut template = json!("leaf");
    for _ in 0..40 {
        template = json!([template]);
    }
    let options = ResolveOptions::new("us-east-1").with_max_depth(16);
    let err = resolved(template.clone(), &options, &cloud()).unwrap_err();
    assert!(matches!(err, ResolveError::DepthLimitExceeded(16)), "got: {}", err);

    let options = ResolveOptions::new("us-east-1").with_max_depth(64);
    assert_eq!(resolved(template.clone(), &options, &cloud()).unwrap(), template);
}

#[test]
fn test_resolve_in_place() {
    let mut template = json!({"Region": {"Ref": "AWS::Region"}});
    resolve(&mut template, &ResolveOptions::new("ap-south-1"), &OfflineCloud).unwrap();
    assert_eq!(template, json!({"Region": "ap-south-1"}));
}
