//! End-to-end splitting scenarios through the public API.

use divvy_core::receipt::{ReceiptLine, ReceiptPolicies, ReceiptScan};
use divvy_core::types::{SurchargeKind, SurchargePolicy};
use divvy_core::{
    Bill, CoreError, Currency, Group, GroupKind, Money, ParticipantId, PaymentProvider,
    SettlementStatus, Surcharge, TransferStatus,
};

fn usd() -> Currency {
    Currency::from_code("USD").unwrap()
}

fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

fn money(text: &str) -> Money {
    Money::parse(text, usd()).unwrap()
}

/// Pizza 18.50 → {A, B}, Salad 12.00 → {A}, tax 3.05 proportional.
fn pizza_night() -> Bill {
    let mut bill = Bill::new("Pizza night", usd()).unwrap();
    bill.add_participant(pid("a"), "Alex").unwrap();
    bill.add_participant(pid("b"), "Sarah").unwrap();

    let pizza = bill.add_item("Pizza Margherita", money("18.50"), 1).unwrap();
    let salad = bill.add_item("Caesar Salad", money("12.00"), 1).unwrap();
    bill.assign(&pizza, &pid("a")).unwrap();
    bill.assign(&pizza, &pid("b")).unwrap();
    bill.assign(&salad, &pid("a")).unwrap();
    bill.add_surcharge(Surcharge::fixed(
        SurchargeKind::Tax,
        money("3.05"),
        SurchargePolicy::Proportional,
    ))
    .unwrap();
    bill
}

#[test]
fn pizza_and_salad_with_proportional_tax() {
    let mut bill = pizza_night();
    bill.set_payer(&pid("a")).unwrap();
    let allocation = bill.finalize().unwrap().clone();

    assert_eq!(allocation.owed_by(&pid("a")), money("23.38"));
    assert_eq!(allocation.owed_by(&pid("b")), money("10.17"));
    assert_eq!(allocation.total().unwrap(), money("33.55"));

    let transfers = bill.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, pid("b"));
    assert_eq!(transfers[0].to, pid("a"));
    assert_eq!(transfers[0].amount, money("10.17"));
    assert_eq!(transfers[0].status, TransferStatus::Pending);
}

#[test]
fn unassigned_item_blocks_finalize() {
    let mut bill = pizza_night();
    let tax_line = bill.add_item("Service Tax", money("4.50"), 1).unwrap();
    bill.set_payer(&pid("a")).unwrap();

    match bill.finalize() {
        Err(CoreError::IncompleteAssignment { item_ids }) => {
            assert_eq!(item_ids, vec![tax_line.to_string()]);
        }
        other => panic!("expected IncompleteAssignment, got {:?}", other),
    }

    bill.assign_all(&tax_line).unwrap();
    assert!(bill.is_fully_assigned());
    assert!(bill.finalize().is_ok());
}

#[test]
fn group_netting_collapses_to_two_transfers() {
    let mut group = Group::new("Weekend Squad", GroupKind::Friends).unwrap();
    for (id, name) in [("x", "Sarah"), ("y", "Mike"), ("z", "Emma")] {
        group.add_member(pid(id), name).unwrap();
    }

    let mut dinner = Bill::new("Weekend Dinner", usd()).unwrap();
    for id in ["x", "y", "z"] {
        dinner.add_participant(pid(id), id).unwrap();
    }
    let steak = dinner.add_item("Steak", money("32.25"), 1).unwrap();
    let pasta = dinner.add_item("Pasta", money("13.25"), 1).unwrap();
    dinner.assign(&steak, &pid("y")).unwrap();
    dinner.assign(&pasta, &pid("z")).unwrap();
    dinner.set_payer(&pid("x")).unwrap();
    dinner.finalize().unwrap();
    group.add_bill(dinner).unwrap();

    let balances = group.net_balances().unwrap();
    assert_eq!(balances[&pid("x")], money("45.50"));
    assert_eq!(balances[&pid("y")], money("-32.25"));
    assert_eq!(balances[&pid("z")], money("-13.25"));

    let transfers = group.settle_up().unwrap();
    let summary: Vec<(&str, &str, Money)> = transfers
        .iter()
        .map(|t| (t.from.as_str(), t.to.as_str(), t.amount))
        .collect();
    assert_eq!(
        summary,
        vec![("y", "x", money("32.25")), ("z", "x", money("13.25"))]
    );
}

#[test]
fn terminal_transfers_and_reissue() {
    let mut bill = pizza_night();
    bill.set_payer(&pid("a")).unwrap();
    bill.finalize().unwrap();
    let first = bill.transfers()[0].id.clone();

    bill.attach_provider(&first, PaymentProvider::new("flouci"))
        .unwrap();
    bill.mark_transfer_failed(&first, "card declined").unwrap();
    assert!(matches!(
        bill.mark_transfer_completed(&first),
        Err(CoreError::TransferAlreadyTerminal { .. })
    ));

    let progress = bill.collection_progress().unwrap();
    assert_eq!(progress.failed, money("10.17"));
    assert_eq!(progress.progress_bps, 0);

    let second = bill.reissue_transfer(&first).unwrap();
    let replacement = bill.transfer(&second).unwrap();
    assert_eq!(replacement.status, TransferStatus::Pending);
    assert_eq!(replacement.amount, money("10.17"));
    assert!(replacement.provider.is_none());

    bill.mark_transfer_completed(&second).unwrap();
    let progress = bill.collection_progress().unwrap();
    assert_eq!(progress.collected, money("10.17"));
    assert_eq!(progress.progress_bps, 10_000);
    assert_eq!(bill.settlement_status(), SettlementStatus::Settled);
}

#[test]
fn scanned_receipt_in_millimes() {
    let tnd = Currency::from_code("TND").unwrap();
    let mut bill = Bill::new("Café", tnd).unwrap();
    for (id, name) in [("amira", "Amira"), ("karim", "Karim"), ("sami", "Sami")] {
        bill.add_participant(pid(id), name).unwrap();
    }

    let scan = ReceiptScan {
        merchant: None,
        lines: vec![
            ReceiptLine {
                description: "Café direct".to_string(),
                unit_price_minor: 1_500,
                quantity: 3,
            },
            ReceiptLine {
                description: "Bambalouni".to_string(),
                unit_price_minor: 1_000,
                quantity: 1,
            },
        ],
        tax_minor: None,
        tip_minor: Some(1_000),
        service_fee_minor: None,
        total_minor: Some(6_500),
    };
    let imported = bill.import_receipt(&scan, ReceiptPolicies {
        tip: SurchargePolicy::Equal,
        ..ReceiptPolicies::default()
    })
    .unwrap();

    bill.assign_all(&imported.item_ids[0]).unwrap();
    bill.assign(&imported.item_ids[1], &pid("sami")).unwrap();
    bill.set_payer(&pid("amira")).unwrap();
    let allocation = bill.finalize().unwrap().clone();

    // coffee 1.500 each, tip 1.000 / 3 → 0.334, 0.333, 0.333
    assert_eq!(allocation.owed_by(&pid("amira")).to_string(), "1.834 TND");
    assert_eq!(allocation.owed_by(&pid("karim")).to_string(), "1.833 TND");
    assert_eq!(allocation.owed_by(&pid("sami")).to_string(), "2.833 TND");
    assert_eq!(allocation.allocated_total().unwrap().minor(), 6_500);
}
