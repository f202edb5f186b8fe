use crate::test_utils::RecordingEventSink;
use crate::test_utils::StubEventSource;
use crate::MemNamespaceRegistry;
use crate::MockNamespaceRegistry;
use crate::TypeConfig;

/// In-memory registry, recording sink and stub source.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct StubTypeConfig;

impl TypeConfig for StubTypeConfig {
    type R = MemNamespaceRegistry;

    type K = RecordingEventSink;

    type S = StubEventSource;
}

/// Like [`StubTypeConfig`] but with a mocked namespace registry, for
/// injecting persistence failures.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct MockRegistryTypeConfig;

impl TypeConfig for MockRegistryTypeConfig {
    type R = MockNamespaceRegistry;

    type K = RecordingEventSink;

    type S = StubEventSource;
}
