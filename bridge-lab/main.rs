//! flagbridge lab
//!
//! Drives a bridge end to end against the in-memory SDK.
//! Run with: cargo run --example bridge-lab

use flagbridge::{
    BridgeOptions, FlagBridge, InMemorySdk, MethodCall, MethodResult, PrivacyConfig,
    QueuedMessenger,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const PASS: &str = "\x1b[32m[PASS]\x1b[0m";
const FAIL: &str = "\x1b[31m[FAIL]\x1b[0m";

#[tokio::main]
async fn main() {
    println!("=== flagbridge lab ===\n");

    let mut passed = 0;
    let mut failed = 0;

    macro_rules! pass {
        ($test:expr) => {{
            println!("{} {}", PASS, $test);
            passed += 1;
        }};
    }

    macro_rules! fail {
        ($test:expr) => {{
            println!("{} {}", FAIL, $test);
            failed += 1;
        }};
    }

    let mut flags = HashMap::new();
    flags.insert("lab-bool".to_string(), json!(true));
    flags.insert("lab-string".to_string(), json!("Hello Lab"));

    let sdk = Arc::new(InMemorySdk::with_flags(flags));
    let (messenger, mut outbound) = QueuedMessenger::new();
    let options = BridgeOptions::builder(String::new())
        .start_wait(Duration::from_secs(1))
        .privacy(PrivacyConfig::builder().warn_on_unmasked_pii(true).build())
        .build();
    let bridge = FlagBridge::new(sdk.clone(), Arc::new(messenger)).with_options(options);
    println!("Channel: {}\n", bridge.channel_name());

    // Test 1: init without a mobile key is rejected
    println!("Testing initialization...");
    match bridge.handle(&MethodCall::new("init", json!({ "userKey": "lab-user" }))) {
        MethodResult::Error { code, .. } if code == "CONFIG_MISSING_REQUIRED" => {
            pass!("init() without mobileKey")
        }
        other => fail!(format!("init() without mobileKey - got {:?}", other)),
    }

    // Test 2: init with a user payload
    let result = bridge.handle(&MethodCall::new(
        "init",
        json!({
            "mobileKey": "mob-lab-key-00000000",
            "userKey": "lab-user-123",
            "user": { "email": "lab@example.com", "country": "NZ" },
            "custom": { "plan": "premium", "seats": 5 },
            "privateAttributes": ["email"]
        }),
    ));
    if result == MethodResult::success(true) {
        pass!("init()");
    } else {
        fail!(format!("init() - got {:?}", result));
    }

    match sdk.current_user() {
        Some(user) if user.key() == "lab-user-123" && user.is_private("email") => {
            pass!(format!("user identity {}", user.redacted()))
        }
        other => fail!(format!("user identity - got {:?}", other)),
    }

    // Test 3: flag evaluation
    println!("\nTesting flag evaluation...");
    let bool_value = bridge.handle(&MethodCall::new("boolVariation", json!({ "flagKey": "lab-bool" })));
    if bool_value == MethodResult::success(true) {
        pass!("boolVariation");
    } else {
        fail!(format!("boolVariation - got {:?}", bool_value));
    }

    let string_value = bridge.handle(&MethodCall::new(
        "stringVariationFallback",
        json!({ "flagKey": "missing", "fallback": "fallback" }),
    ));
    if string_value == MethodResult::success("fallback") {
        pass!("stringVariationFallback");
    } else {
        fail!(format!("stringVariationFallback - got {:?}", string_value));
    }

    let all_flags = bridge.handle(&MethodCall::without_arguments("allFlags"));
    match all_flags.value().and_then(|v| v.as_object()) {
        Some(map) if map.len() == 2 => pass!("allFlags"),
        _ => fail!(format!("allFlags - got {:?}", all_flags)),
    }

    // Test 4: anonymous identify
    println!("\nTesting identify...");
    bridge.handle(&MethodCall::new("identify", json!({ "user": { "country": "DE" } })));
    match sdk.current_user() {
        Some(user) if user.is_anonymous() => pass!("identify() anonymous"),
        other => fail!(format!("identify() anonymous - got {:?}", other)),
    }

    // Test 5: flag listeners
    println!("\nTesting flag listeners...");
    bridge.handle(&MethodCall::new(
        "registerFeatureFlagListener",
        json!({ "flagKey": "lab-bool" }),
    ));
    sdk.set_flag("lab-bool", json!(false));

    match tokio::time::timeout(Duration::from_secs(1), outbound.recv()).await {
        Ok(Some(call)) if call.string_argument("flagKey") == Some("lab-bool") => {
            pass!(format!("{} received", call.method))
        }
        other => fail!(format!("flag change callback - got {:?}", other)),
    }

    let removed = bridge.handle(&MethodCall::new(
        "unregisterFeatureFlagListener",
        json!({ "flagKey": "lab-bool" }),
    ));
    if removed == MethodResult::success(true) {
        pass!("unregisterFeatureFlagListener");
    } else {
        fail!(format!("unregisterFeatureFlagListener - got {:?}", removed));
    }

    // Test 6: unknown methods
    if bridge.handle(&MethodCall::without_arguments("track")) == MethodResult::NotImplemented {
        pass!("unknown method not implemented");
    } else {
        fail!("unknown method - expected NotImplemented");
    }

    // Test 7: Cleanup
    println!("\nTesting cleanup...");
    bridge.detach();
    if sdk.is_closed() {
        pass!("detach()");
    } else {
        fail!("detach() - SDK still open");
    }

    print_summary(passed, failed);

    if failed > 0 {
        println!("\n\x1b[31mSome verifications failed!\x1b[0m");
        std::process::exit(1);
    } else {
        println!("\n\x1b[32mAll verifications passed!\x1b[0m");
        std::process::exit(0);
    }
}

fn print_summary(passed: i32, failed: i32) {
    println!("\n{}", "=".repeat(40));
    println!("Results: {} passed, {} failed", passed, failed);
    println!("{}", "=".repeat(40));
}
