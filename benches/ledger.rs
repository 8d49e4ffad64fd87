#![feature(test)]
extern crate cannyvg;
extern crate test;
#[macro_use]
extern crate trackable;

use cannyvg::ledger::AllocationLedger;
use test::Bencher;

#[bench]
fn create_extent(b: &mut Bencher) {
    let mut ledger = track_try_unwrap!(AllocationLedger::create("VG1", u64::max_value()));
    let mut i = 0;
    b.iter(|| {
        track_try_unwrap!(ledger.create_extent(format!("LV{}", i), 1));
        i += 1;
    });
}

#[bench]
fn create_and_delete_extent(b: &mut Bencher) {
    let mut ledger = track_try_unwrap!(AllocationLedger::create("VG1", 1024));
    b.iter(|| {
        track_try_unwrap!(ledger.create_extent("LV1", 512));
        track_try_unwrap!(ledger.delete_extent("LV1"));
    });
}

#[bench]
fn list_extents(b: &mut Bencher) {
    let mut ledger = track_try_unwrap!(AllocationLedger::create("VG1", 1024 * 1024));
    for i in 0..1000 {
        track_try_unwrap!(ledger.create_extent(format!("LV{}", i), 1024));
    }
    b.iter(|| ledger.list_extents());
}

#[bench]
fn rejected_create_extent(b: &mut Bencher) {
    let mut ledger = track_try_unwrap!(AllocationLedger::create("VG1", 1024));
    track_try_unwrap!(ledger.create_extent("LV1", 1024));
    b.iter(|| ledger.create_extent("LV2", 1).is_err());
}
