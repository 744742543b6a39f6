//! Property-based tests for candidate list accumulation
//!
//! These tests verify the discovery invariant: however discovery batches
//! arrive within one cycle, the candidate list holds exactly one entry per
//! distinct address, in first-seen order.

use bluelink_core::{CandidateList, DeviceAddress, DiscoveredDevice};
use proptest::prelude::*;
use std::collections::HashSet;

/// Generate arbitrary device addresses from a small pool so duplicates
/// actually occur
fn arb_address() -> impl Strategy<Value = DeviceAddress> {
    (0u8..8, 0u8..8).prop_map(|(a, b)| DeviceAddress::new([a, b, 0x31, 0x80, 0x89, 0xAF]))
}

fn arb_device() -> impl Strategy<Value = DiscoveredDevice> {
    (arb_address(), "[a-zA-Z0-9 -]{0,16}", any::<bool>())
        .prop_map(|(address, name, paired)| DiscoveredDevice::new(address, name, paired))
}

/// Arbitrary discovery cycle: several batches of several devices
fn arb_batches() -> impl Strategy<Value = Vec<Vec<DiscoveredDevice>>> {
    prop::collection::vec(prop::collection::vec(arb_device(), 0..10), 0..6)
}

proptest! {
    /// Property: one entry per distinct address seen
    #[test]
    fn one_entry_per_distinct_address(batches in arb_batches()) {
        let mut list = CandidateList::new();
        list.begin_cycle();
        for batch in &batches {
            for device in batch {
                list.add_if_absent(device.clone());
            }
        }

        let distinct: HashSet<DeviceAddress> = batches
            .iter()
            .flatten()
            .map(|d| d.address)
            .collect();
        prop_assert_eq!(list.len(), distinct.len());
    }

    /// Property: entries appear in first-seen order with first-seen metadata
    #[test]
    fn first_seen_order_and_metadata(batches in arb_batches()) {
        let mut list = CandidateList::new();
        list.begin_cycle();
        for batch in &batches {
            for device in batch {
                list.add_if_absent(device.clone());
            }
        }

        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        for device in batches.iter().flatten() {
            if seen.insert(device.address) {
                expected.push(device.clone());
            }
        }

        prop_assert_eq!(list.snapshot(), expected);
    }

    /// Property: a new cycle forgets everything from the previous one
    #[test]
    fn new_cycle_starts_empty(batches in arb_batches()) {
        let mut list = CandidateList::new();
        for batch in &batches {
            for device in batch {
                list.add_if_absent(device.clone());
            }
        }

        list.begin_cycle();
        prop_assert!(list.is_empty());
        prop_assert_eq!(list.snapshot(), Vec::new());
    }
}
