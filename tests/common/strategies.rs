use proptest::prelude::*;
use resilience_core::CallOutcome;

/// Strategy for generating a single call outcome
pub fn outcome_strategy() -> impl Strategy<Value = CallOutcome> {
    prop_oneof![
        Just(CallOutcome::Success),
        Just(CallOutcome::Failure),
        Just(CallOutcome::Timeout),
    ]
}

/// Strategy for generating sequences of call outcomes
pub fn outcome_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<CallOutcome>> {
    prop::collection::vec(outcome_strategy(), 1..max_len)
}

/// Strategy for generating valid dependency names
pub fn dependency_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,30}"
}

/// Strategy for generating failure thresholds in the useful range
pub fn threshold_strategy() -> impl Strategy<Value = u32> {
    1u32..6
}
