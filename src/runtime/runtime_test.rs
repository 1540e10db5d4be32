use std::rc::Rc;

use super::*;
use crate::test_utils::*;
use crate::CodeAddress;
use crate::Error;
use crate::LinkError;
use crate::LinkingConfig;

fn runtime_with(config: WatchpointConfig) -> (Rc<RecordingPatcher>, WatchpointRuntime) {
    let patcher = RecordingPatcher::new();
    let runtime = WatchpointRuntime::new(patcher.clone(), config).expect("valid config");
    (patcher, runtime)
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = WatchpointConfig::default();
    config.linking.max_jump_distance = 0;

    let result = WatchpointRuntime::new(RecordingPatcher::new(), config);

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_stats_count_lifecycle() {
    enable_logger();
    let (patcher, runtime) = runtime_with(WatchpointConfig::default());
    let set = runtime.new_set(InitialMode::Blind);

    let a = runtime.create_watchpoint(LabelOffset(1), LabelOffset(2));
    let b = runtime.create_watchpoint(LabelOffset(3), LabelOffset(4));
    let _unused = runtime.create_watchpoint(LabelOffset(5), LabelOffset(6));
    a.resolve_locations(&code_buffer()).unwrap();
    b.resolve_locations(&code_buffer()).unwrap();
    set.add(&a);
    set.add(&b);
    set.notify_write();

    assert_eq!(
        runtime.stats(),
        FireStats {
            watchpoints_created: 3,
            resolutions: 2,
            redirects: 2,
        }
    );
    assert_eq!(patcher.redirect_count(), 2);
}

#[test]
fn test_jump_distance_limit_comes_from_config() {
    let config = WatchpointConfig {
        linking: LinkingConfig {
            max_jump_distance: 0x100,
            ..Default::default()
        },
        ..Default::default()
    };
    let (_, runtime) = runtime_with(config);
    let link_buffer = TableLinkBuffer::default()
        .with(1, 0x1000)
        .with(2, 0x1100)
        .with(3, 0x1101);

    let near = runtime.create_watchpoint(LabelOffset(1), LabelOffset(2));
    assert!(near.resolve_locations(&link_buffer).is_ok());

    let far = runtime.create_watchpoint(LabelOffset(1), LabelOffset(3));
    let result = far.resolve_locations(&link_buffer);
    assert!(matches!(
        result,
        Err(Error::Link(LinkError::JumpOutOfRange {
            from: CodeAddress(0x1000),
            to: CodeAddress(0x1101),
            limit: 0x100,
        }))
    ));
    assert!(!far.is_resolved());
    assert_eq!(runtime.stats().resolutions, 1);
}

#[test]
fn test_self_loops_allowed_when_disabled() {
    let config = WatchpointConfig {
        linking: LinkingConfig {
            reject_self_loops: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let (_, runtime) = runtime_with(config);
    let link_buffer = TableLinkBuffer::default().with(1, 0x2000).with(2, 0x2000);

    let watchpoint = runtime.create_watchpoint(LabelOffset(1), LabelOffset(2));

    assert!(watchpoint.resolve_locations(&link_buffer).is_ok());
}

#[test]
fn test_trace_redirects_still_patches() {
    enable_logger();
    let mut config = WatchpointConfig::default();
    config.firing.trace_redirects = true;
    let (patcher, runtime) = runtime_with(config);
    let mut slot = runtime.new_inline_set(InitialMode::Blind);
    let watchpoint = runtime.create_watchpoint(LabelOffset(8), LabelOffset(9));
    watchpoint.resolve_locations(&code_buffer()).unwrap();

    slot.add(&watchpoint);
    slot.notify_write();

    assert_eq!(patcher.redirects(), vec![(address(8), address(9))]);
    assert!(runtime.config().firing.trace_redirects);
}
