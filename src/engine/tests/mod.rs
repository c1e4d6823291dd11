//! Cross-module unit tests for the engine core.
