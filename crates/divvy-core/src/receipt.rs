//! # Receipt Intake
//!
//! A receipt scanner (camera + OCR, outside this crate) hands over a
//! `ReceiptScan`; `Bill::import_receipt` turns it into line items,
//! surcharges and a stated total.
//!
//! ```text
//! ReceiptScan                         Bill (draft)
//! ───────────                         ────────────
//! Pizza Margherita  18.50 ×1   ──►    LineItem  18.50
//! Coca Cola          2.50 ×2   ──►    LineItem   5.00
//! Tax                3.05      ──►    Surcharge(tax, policies.tax)
//! Tip                4.00      ──►    Surcharge(tip, policies.tip)
//! TOTAL             30.55      ──►    stated_total (checked at finalize)
//! ```
//!
//! Amounts are minor units of the bill's currency.

use serde::{Deserialize, Serialize};

use crate::bill::Bill;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{ItemId, Surcharge, SurchargeId, SurchargeKind, SurchargePolicy};
use crate::validation::{validate_amount_minor, validate_quantity};

/// One printed line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub description: String,
    pub unit_price_minor: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// What the scanner extracted from a receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptScan {
    #[serde(default)]
    pub merchant: Option<String>,
    pub lines: Vec<ReceiptLine>,
    #[serde(default)]
    pub tax_minor: Option<i64>,
    #[serde(default)]
    pub tip_minor: Option<i64>,
    #[serde(default)]
    pub service_fee_minor: Option<i64>,
    /// The printed total, if the scanner found one.
    #[serde(default)]
    pub total_minor: Option<i64>,
}

/// Distribution policies for the surcharges found on a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPolicies {
    pub tax: SurchargePolicy,
    pub tip: SurchargePolicy,
    pub service_fee: SurchargePolicy,
}

impl Default for ReceiptPolicies {
    fn default() -> Self {
        ReceiptPolicies {
            tax: SurchargePolicy::Proportional,
            tip: SurchargePolicy::Proportional,
            service_fee: SurchargePolicy::Equal,
        }
    }
}

/// Ids created by an import, in receipt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedReceipt {
    pub item_ids: Vec<ItemId>,
    pub surcharge_ids: Vec<SurchargeId>,
}

impl Bill {
    /// Adds every receipt line as an unassigned item, the tax, tip and
    /// service fee as surcharges, and the printed total as stated total.
    ///
    /// Zero surcharges are skipped. The import is all-or-nothing: on error
    /// the bill is left untouched.
    pub fn import_receipt(
        &mut self,
        scan: &ReceiptScan,
        policies: ReceiptPolicies,
    ) -> CoreResult<ImportedReceipt> {
        let currency = self.currency();
        let mut staged = self.clone();
        let mut imported = ImportedReceipt::default();

        for line in &scan.lines {
            validate_quantity(line.quantity)?;
            validate_amount_minor("unit price", line.unit_price_minor)?;
            let price = Money::from_minor(line.unit_price_minor, currency)
                .multiply_quantity(line.quantity)?;
            imported
                .item_ids
                .push(staged.add_item(&line.description, price, line.quantity)?);
        }

        let surcharges = [
            (SurchargeKind::Tax, scan.tax_minor, policies.tax),
            (SurchargeKind::Tip, scan.tip_minor, policies.tip),
            (SurchargeKind::ServiceFee, scan.service_fee_minor, policies.service_fee),
        ];
        for (kind, minor, policy) in surcharges {
            let Some(minor) = minor.filter(|m| *m != 0) else {
                continue;
            };
            let surcharge = Surcharge::fixed(kind, Money::from_minor(minor, currency), policy);
            imported.surcharge_ids.push(staged.add_surcharge(surcharge)?);
        }

        if let Some(total) = scan.total_minor {
            staged.set_stated_total(Money::from_minor(total, currency))?;
        }

        *self = staged;
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Currency;
    use crate::types::ParticipantId;

    fn tnd() -> Currency {
        Currency::from_code("TND").unwrap()
    }

    fn scan() -> ReceiptScan {
        ReceiptScan {
            merchant: Some("Café des Délices".to_string()),
            lines: vec![
                ReceiptLine {
                    description: "Couscous".to_string(),
                    unit_price_minor: 18_500,
                    quantity: 1,
                },
                ReceiptLine {
                    description: "Coca Cola".to_string(),
                    unit_price_minor: 2_500,
                    quantity: 2,
                },
            ],
            tax_minor: Some(4_500),
            tip_minor: Some(0),
            service_fee_minor: None,
            total_minor: Some(28_000),
        }
    }

    #[test]
    fn test_import_receipt() {
        let mut bill = Bill::new("Lunch", tnd()).unwrap();
        let imported = bill.import_receipt(&scan(), ReceiptPolicies::default()).unwrap();

        assert_eq!(imported.item_ids.len(), 2);
        assert_eq!(imported.surcharge_ids.len(), 1);
        assert_eq!(bill.items()[1].price.minor(), 5_000);
        assert_eq!(bill.items()[1].quantity, 2);
        assert_eq!(bill.surcharges()[0].kind, SurchargeKind::Tax);
        assert_eq!(bill.stated_total().map(|m| m.minor()), Some(28_000));
        assert_eq!(bill.total().unwrap().minor(), 28_000);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut bill = Bill::new("Lunch", tnd()).unwrap();
        let mut bad = scan();
        bad.lines.push(ReceiptLine {
            description: "Mystery".to_string(),
            unit_price_minor: -100,
            quantity: 1,
        });

        assert!(matches!(
            bill.import_receipt(&bad, ReceiptPolicies::default()),
            Err(CoreError::Validation(_))
        ));
        assert!(bill.items().is_empty());
        assert!(bill.stated_total().is_none());
    }

    #[test]
    fn test_import_into_finalized_bill_fails() {
        let mut bill = Bill::new("Lunch", tnd()).unwrap();
        let me = ParticipantId::new("me");
        bill.add_participant(me.clone(), "Me").unwrap();
        bill.set_payer(&me).unwrap();
        bill.finalize().unwrap();

        assert!(matches!(
            bill.import_receipt(&scan(), ReceiptPolicies::default()),
            Err(CoreError::BillFinalized(_))
        ));
    }

    #[test]
    fn test_scan_deserializes_with_defaults() {
        let json = r#"{"lines":[{"description":"Tea","unit_price_minor":1500}]}"#;
        let scan: ReceiptScan = serde_json::from_str(json).unwrap();
        assert_eq!(scan.lines[0].quantity, 1);
        assert!(scan.tax_minor.is_none());
    }
}
